//! Reconciliation operations and their settled outcomes

use serde::Serialize;
use std::fmt;

use super::attachment::RemoteAttachment;

/// Which direction an operation moves the remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Delete,
}

impl OperationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single unit of remote work planned by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Attach the canonical URL to the issue with this identifier.
    Create { identifier: String },
    /// Remove an attachment whose issue is no longer mentioned.
    Delete { attachment: RemoteAttachment },
}

impl Operation {
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Self::Create { identifier } => identifier,
            Self::Delete { attachment } => &attachment.issue_identifier,
        }
    }
}

/// Why an operation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// The integration lacks permission; the workspace must re-authorize.
    PermissionDenied,
    /// The remote answered `success: false` without a more specific signal.
    Rejected,
    /// Any other error, including rate limiting and transport failures.
    Error(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::Rejected => f.write_str("remote reported success=false"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum OperationStatus {
    Succeeded,
    Failed(FailureReason),
}

/// Settled result of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationResult {
    pub kind: OperationKind,
    pub identifier: String,
    pub status: OperationStatus,
}

impl OperationResult {
    pub fn succeeded(operation: &Operation) -> Self {
        Self {
            kind: operation.kind(),
            identifier: operation.identifier().to_string(),
            status: OperationStatus::Succeeded,
        }
    }

    pub fn failed(operation: &Operation, reason: FailureReason) -> Self {
        Self {
            kind: operation.kind(),
            identifier: operation.identifier().to_string(),
            status: OperationStatus::Failed(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationFailure {
    pub kind: OperationKind,
    pub identifier: String,
    pub reason: FailureReason,
}

/// Aggregate result of one reconciliation run.
///
/// `created` and `deleted` count planned operations; `succeeded` and `failed`
/// partition how they settled. Only [`SyncOutcome::from_results`] builds one,
/// so the counts always agree with the results they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    created: usize,
    deleted: usize,
    succeeded: usize,
    failed: usize,
    failures: Vec<OperationFailure>,
}

impl SyncOutcome {
    pub fn from_results(results: impl IntoIterator<Item = OperationResult>) -> Self {
        let mut outcome = Self::default();
        for result in results {
            match result.kind {
                OperationKind::Create => outcome.created += 1,
                OperationKind::Delete => outcome.deleted += 1,
            }
            match result.status {
                OperationStatus::Succeeded => outcome.succeeded += 1,
                OperationStatus::Failed(reason) => {
                    outcome.failed += 1;
                    outcome.failures.push(OperationFailure {
                        kind: result.kind,
                        identifier: result.identifier,
                        reason,
                    });
                }
            }
        }
        outcome
    }

    pub const fn created(&self) -> usize {
        self.created
    }

    pub const fn deleted(&self) -> usize {
        self.deleted
    }

    pub const fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub const fn failed(&self) -> usize {
        self.failed
    }

    pub fn failures(&self) -> &[OperationFailure] {
        &self.failures
    }

    pub const fn attempted(&self) -> usize {
        self.created + self.deleted
    }

    pub const fn is_noop(&self) -> bool {
        self.attempted() == 0
    }
}
