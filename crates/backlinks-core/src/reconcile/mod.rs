//! Reconciliation of desired backlinks against remote attachments.
//!
//! [`plan`] is a pure two-way set difference. [`Reconciler::execute`] applies
//! a plan with every operation running concurrently and settling on its own:
//! one failure never cancels or blocks a sibling, and the run always yields a
//! [`SyncOutcome`] rather than an error.

use std::collections::{BTreeSet, HashSet};

use futures::future::join_all;

use crate::models::{
    CanonicalUrl, FailureReason, Operation, OperationKind, OperationResult, RemoteAttachment,
    SyncOutcome,
};
use crate::remote::{AttachmentClient, CreateAttachment, CreateAttachmentResult, RemoteError};
use crate::util::sanitize_error;

/// Subtitle shown beneath every backlink in the issue tracker.
pub const DEFAULT_SUBTITLE: &str = "Outline";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSettings {
    pub subtitle: String,
    pub icon_url: Option<String>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            subtitle: DEFAULT_SUBTITLE.to_string(),
            icon_url: None,
        }
    }
}

/// Operations needed to make the remote match the desired identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_create: BTreeSet<String>,
    pub to_delete: Vec<RemoteAttachment>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_delete.len()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.to_create
            .into_iter()
            .map(|identifier| Operation::Create { identifier })
            .chain(
                self.to_delete
                    .into_iter()
                    .map(|attachment| Operation::Delete { attachment }),
            )
            .collect()
    }
}

/// Diff desired identifiers against existing attachments.
///
/// Identifiers are trimmed and blanks dropped. When the remote holds several
/// attachments for one identifier, all of them are deleted if it is no longer
/// desired; if it is still desired none are touched and no create is issued.
pub fn plan<I, S>(desired: I, existing: &[RemoteAttachment]) -> ReconcilePlan
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let desired: HashSet<String> = desired
        .into_iter()
        .map(|identifier| identifier.as_ref().trim().to_string())
        .filter(|identifier| !identifier.is_empty())
        .collect();

    let existing_identifiers: HashSet<&str> = existing
        .iter()
        .map(|attachment| attachment.issue_identifier.as_str())
        .collect();

    let to_create = desired
        .iter()
        .filter(|identifier| !existing_identifiers.contains(identifier.as_str()))
        .cloned()
        .collect();

    let to_delete = existing
        .iter()
        .filter(|attachment| !desired.contains(&attachment.issue_identifier))
        .cloned()
        .collect();

    ReconcilePlan {
        to_create,
        to_delete,
    }
}

/// Where new attachments point and how they are labelled.
#[derive(Debug, Clone, Copy)]
pub struct LinkTarget<'a> {
    pub title: &'a str,
    pub url: &'a CanonicalUrl,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    settings: ReconcileSettings,
}

impl Reconciler {
    #[must_use]
    pub const fn new(settings: ReconcileSettings) -> Self {
        Self { settings }
    }

    /// Apply every planned operation and wait for all of them to settle.
    pub async fn execute(
        &self,
        client: &dyn AttachmentClient,
        plan: ReconcilePlan,
        target: LinkTarget<'_>,
    ) -> SyncOutcome {
        let operations = plan.into_operations();
        let results = join_all(
            operations
                .iter()
                .map(|operation| self.apply(client, operation, target)),
        )
        .await;
        SyncOutcome::from_results(results)
    }

    async fn apply(
        &self,
        client: &dyn AttachmentClient,
        operation: &Operation,
        target: LinkTarget<'_>,
    ) -> OperationResult {
        let settled = match operation {
            Operation::Create { identifier } => self.create(client, identifier, target).await,
            Operation::Delete { attachment } => delete(client, attachment).await,
        };
        match settled {
            Ok(()) => OperationResult::succeeded(operation),
            Err(reason) => OperationResult::failed(operation, reason),
        }
    }

    async fn create(
        &self,
        client: &dyn AttachmentClient,
        identifier: &str,
        target: LinkTarget<'_>,
    ) -> Result<(), FailureReason> {
        let issue_id = match client.resolve_issue(identifier).await {
            Ok(Some(issue_id)) => issue_id,
            Ok(None) => {
                tracing::debug!(identifier, "Issue does not exist; skipping backlink");
                return Ok(());
            }
            Err(error) => return classify(OperationKind::Create, identifier, error),
        };

        let input = CreateAttachment {
            issue_id,
            title: target.title.to_string(),
            subtitle: self.settings.subtitle.clone(),
            url: target.url.to_string(),
            icon_url: self.settings.icon_url.clone(),
        };

        match client.create_attachment(&input).await {
            Ok(CreateAttachmentResult {
                success: true,
                attachment_id,
            }) => {
                tracing::debug!(
                    identifier,
                    attachment_id = attachment_id.as_deref().unwrap_or("unknown"),
                    "Created backlink attachment"
                );
                Ok(())
            }
            Ok(_) => {
                tracing::warn!(identifier, "Issue tracker refused to create backlink");
                Err(FailureReason::Rejected)
            }
            Err(error) => classify(OperationKind::Create, identifier, error),
        }
    }
}

async fn delete(
    client: &dyn AttachmentClient,
    attachment: &RemoteAttachment,
) -> Result<(), FailureReason> {
    let identifier = attachment.issue_identifier.as_str();
    match client.delete_attachment(&attachment.id).await {
        Ok(true) => {
            tracing::debug!(
                identifier,
                attachment_id = %attachment.id,
                "Deleted backlink attachment"
            );
            Ok(())
        }
        Ok(false) => {
            tracing::warn!(
                identifier,
                attachment_id = %attachment.id,
                "Issue tracker refused to delete backlink"
            );
            Err(FailureReason::Rejected)
        }
        Err(error) => classify(OperationKind::Delete, identifier, error),
    }
}

fn classify(
    kind: OperationKind,
    identifier: &str,
    error: RemoteError,
) -> Result<(), FailureReason> {
    match error {
        RemoteError::Forbidden(message) => {
            tracing::warn!(
                operation = kind.label(),
                identifier,
                detail = %message,
                "Issue tracker denied permission; the integration needs to be re-authorized"
            );
            Err(FailureReason::PermissionDenied)
        }
        RemoteError::NotFound(_) => {
            match kind {
                OperationKind::Delete => {
                    tracing::debug!(identifier, "Backlink attachment already gone");
                }
                OperationKind::Create => {
                    tracing::debug!(identifier, "Issue no longer exists; skipping backlink");
                }
            }
            Ok(())
        }
        RemoteError::RateLimited {
            ref message,
            retry_after_secs,
        } => {
            tracing::warn!(
                operation = kind.label(),
                identifier,
                detail = %message,
                retry_after_secs,
                "Issue tracker rate limit hit"
            );
            Err(FailureReason::Error(sanitize_error(&error)))
        }
        other => {
            tracing::warn!(
                operation = kind.label(),
                identifier,
                error = %other,
                "Backlink operation failed"
            );
            Err(FailureReason::Error(sanitize_error(&other)))
        }
    }
}
