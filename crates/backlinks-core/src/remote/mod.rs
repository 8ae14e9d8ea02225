//! Remote issue tracker attachment client.
//!
//! [`AttachmentClient`] is the seam between the reconciler and the issue
//! tracker. [`LinearClient`] implements it over GraphQL; tests substitute an
//! in-memory fake.

mod linear;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::RemoteAttachment;

pub use linear::{LinearClient, DEFAULT_API_URL};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote client configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote permission denied: {0}")]
    Forbidden(String),
    #[error("Remote entity not found: {0}")]
    NotFound(String),
    #[error("Remote rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },
    #[error("Remote HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {0}")]
    Api(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

impl RemoteError {
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Input for creating an attachment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachment {
    pub issue_id: String,
    pub title: String,
    pub subtitle: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAttachmentResult {
    pub success: bool,
    pub attachment_id: Option<String>,
}

/// Operations the reconciler needs from the issue tracker.
#[async_trait]
pub trait AttachmentClient: Send + Sync {
    /// List every attachment pointing at exactly this URL.
    async fn attachments_for_url(&self, url: &str) -> RemoteResult<Vec<RemoteAttachment>>;

    /// Resolve a human-readable identifier to the issue's internal id.
    ///
    /// Returns `Ok(None)` when no live issue has that identifier.
    async fn resolve_issue(&self, identifier: &str) -> RemoteResult<Option<String>>;

    async fn create_attachment(
        &self,
        input: &CreateAttachment,
    ) -> RemoteResult<CreateAttachmentResult>;

    /// Delete an attachment by id, returning the remote `success` flag.
    async fn delete_attachment(&self, attachment_id: &str) -> RemoteResult<bool>;
}
