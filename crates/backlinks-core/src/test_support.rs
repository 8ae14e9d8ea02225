//! Recording in-memory [`AttachmentClient`] for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::RemoteAttachment;
use crate::remote::{
    AttachmentClient, CreateAttachment, CreateAttachmentResult, RemoteError, RemoteResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    Forbidden,
    NotFound,
    RateLimited,
    Api,
    /// Answer `success: false`.
    Rejected,
}

impl FakeFailure {
    fn into_error(self) -> Option<RemoteError> {
        match self {
            Self::Forbidden => Some(RemoteError::Forbidden("HTTP 403".to_string())),
            Self::NotFound => Some(RemoteError::NotFound("Entity not found".to_string())),
            Self::RateLimited => Some(RemoteError::RateLimited {
                message: "HTTP 429".to_string(),
                retry_after_secs: Some(60),
            }),
            Self::Api => Some(RemoteError::Api("internal error (500)".to_string())),
            Self::Rejected => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Resolve(String),
    Create(CreateAttachment),
    Delete(String),
}

#[derive(Default)]
pub struct FakeClient {
    attachments: Mutex<Vec<RemoteAttachment>>,
    issues: HashMap<String, String>,
    list_failure: Option<FakeFailure>,
    resolve_failures: HashMap<String, FakeFailure>,
    create_failures: HashMap<String, FakeFailure>,
    delete_failures: HashMap<String, FakeFailure>,
    latency: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live issue; its internal id is derived from the identifier.
    pub fn with_issue(mut self, identifier: &str) -> Self {
        self.issues
            .insert(identifier.to_string(), format!("issue-{identifier}"));
        self
    }

    pub fn with_attachment(self, id: &str, url: &str, identifier: &str) -> Self {
        self.attachments
            .lock()
            .unwrap()
            .push(RemoteAttachment {
                id: id.to_string(),
                url: url.to_string(),
                issue_id: format!("issue-{identifier}"),
                issue_identifier: identifier.to_string(),
            });
        self.with_issue(identifier)
    }

    pub fn failing_list(mut self, failure: FakeFailure) -> Self {
        self.list_failure = Some(failure);
        self
    }

    pub fn failing_resolve(mut self, identifier: &str, failure: FakeFailure) -> Self {
        self.resolve_failures.insert(identifier.to_string(), failure);
        self
    }

    /// Fail attachment creation for the issue with this identifier.
    pub fn failing_create(mut self, identifier: &str, failure: FakeFailure) -> Self {
        self.create_failures
            .insert(format!("issue-{identifier}"), failure);
        self
    }

    pub fn failing_delete(mut self, attachment_id: &str, failure: FakeFailure) -> Self {
        self.delete_failures
            .insert(attachment_id.to_string(), failure);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attachments(&self) -> Vec<RemoteAttachment> {
        self.attachments.lock().unwrap().clone()
    }

    pub fn created_issue_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(input) => Some(input.issue_id),
                _ => None,
            })
            .collect();
        ids.sort();
        ids
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect();
        ids.sort();
        ids
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl AttachmentClient for FakeClient {
    async fn attachments_for_url(&self, url: &str) -> RemoteResult<Vec<RemoteAttachment>> {
        self.record(Call::List(url.to_string()));
        if let Some(error) = self.list_failure.and_then(FakeFailure::into_error) {
            return Err(error);
        }
        Ok(self
            .attachments()
            .into_iter()
            .filter(|attachment| attachment.url == url)
            .collect())
    }

    async fn resolve_issue(&self, identifier: &str) -> RemoteResult<Option<String>> {
        self.record(Call::Resolve(identifier.to_string()));
        self.pause().await;
        if let Some(error) = self
            .resolve_failures
            .get(identifier)
            .copied()
            .and_then(FakeFailure::into_error)
        {
            return Err(error);
        }
        Ok(self.issues.get(identifier).cloned())
    }

    async fn create_attachment(
        &self,
        input: &CreateAttachment,
    ) -> RemoteResult<CreateAttachmentResult> {
        self.record(Call::Create(input.clone()));
        self.pause().await;
        if let Some(failure) = self.create_failures.get(&input.issue_id).copied() {
            return match failure.into_error() {
                Some(error) => Err(error),
                None => Ok(CreateAttachmentResult {
                    success: false,
                    attachment_id: None,
                }),
            };
        }

        let id = format!("created-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let identifier = self
            .issues
            .iter()
            .find(|(_, issue_id)| **issue_id == input.issue_id)
            .map(|(identifier, _)| identifier.clone())
            .unwrap_or_default();
        self.attachments.lock().unwrap().push(RemoteAttachment {
            id: id.clone(),
            url: input.url.clone(),
            issue_id: input.issue_id.clone(),
            issue_identifier: identifier,
        });

        Ok(CreateAttachmentResult {
            success: true,
            attachment_id: Some(id),
        })
    }

    async fn delete_attachment(&self, attachment_id: &str) -> RemoteResult<bool> {
        self.record(Call::Delete(attachment_id.to_string()));
        self.pause().await;
        if let Some(failure) = self.delete_failures.get(attachment_id).copied() {
            return match failure.into_error() {
                Some(error) => Err(error),
                None => Ok(false),
            };
        }

        let mut attachments = self.attachments.lock().unwrap();
        let before = attachments.len();
        attachments.retain(|attachment| attachment.id != attachment_id);
        if attachments.len() == before {
            return Err(RemoteError::NotFound(format!(
                "Entity not found: Attachment {attachment_id}"
            )));
        }
        Ok(true)
    }
}
