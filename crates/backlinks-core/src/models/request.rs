//! Sync request model
//!
//! Events arrive with two optional entity ids. [`SyncRequest`] narrows them to
//! a single [`SyncTarget`] so the rest of the crate never sees both.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// The content entity whose backlinks are being synced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SyncTarget {
    Document(String),
    Collection(String),
}

impl SyncTarget {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Document(id) | Self::Collection(id) => id,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Collection(_) => "collection",
        }
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Raw event payload as emitted by the content pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEvent {
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    pub tenant_id: String,
    #[serde(default)]
    pub identifiers: Vec<String>,
}

/// A validated request to reconcile one entity's backlinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub target: SyncTarget,
    pub tenant_id: String,
    /// Desired issue identifiers. Order is irrelevant and duplicates are allowed.
    pub identifiers: Vec<String>,
}

impl SyncRequest {
    pub fn new(
        target: SyncTarget,
        tenant_id: impl Into<String>,
        identifiers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            target,
            tenant_id: tenant_id.into(),
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<SyncEvent> for SyncRequest {
    type Error = Error;

    fn try_from(event: SyncEvent) -> Result<Self> {
        let tenant_id = normalize_text_option(Some(event.tenant_id))
            .ok_or_else(|| Error::InvalidInput("Sync event tenant_id cannot be empty".to_string()))?;

        let document_id = normalize_text_option(event.document_id);
        let collection_id = normalize_text_option(event.collection_id);

        let target = match (document_id, collection_id) {
            (Some(document_id), Some(collection_id)) => {
                tracing::warn!(
                    document_id = %document_id,
                    collection_id = %collection_id,
                    "Sync event carries both document and collection ids; using document"
                );
                SyncTarget::Document(document_id)
            }
            (Some(document_id), None) => SyncTarget::Document(document_id),
            (None, Some(collection_id)) => SyncTarget::Collection(collection_id),
            (None, None) => {
                return Err(Error::InvalidInput(
                    "Sync event requires a document_id or collection_id".to_string(),
                ));
            }
        };

        Ok(Self {
            target,
            tenant_id,
            identifiers: event.identifiers,
        })
    }
}
