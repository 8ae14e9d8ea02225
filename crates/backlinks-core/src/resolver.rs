//! Target resolution: entity reference to title, path and tenant base URL.
//!
//! Absence is a normal outcome here. Entities are routinely deleted or
//! unpublished between the event firing and the task running, so every miss
//! returns `None` and the sync task stops quietly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{SyncRequest, SyncTarget};
use crate::util::normalize_text_option;

/// Title used when an entity has none.
pub const UNTITLED: &str = "Untitled";

/// Minimal view of a stored document or collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub title: String,
    /// Path relative to the tenant base URL; `None` while unpublished.
    pub path: Option<String>,
}

impl EntityRecord {
    pub fn new(title: impl Into<String>, path: Option<impl Into<String>>) -> Self {
        Self {
            title: title.into(),
            path: path.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub title: String,
    pub path: String,
    pub base_url: String,
}

/// Lookup of entities and tenant settings owned by the content store.
#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn tenant_base_url(&self, tenant_id: &str) -> crate::Result<Option<String>>;

    async fn find_document(&self, id: &str) -> crate::Result<Option<EntityRecord>>;

    async fn find_collection(&self, id: &str) -> crate::Result<Option<EntityRecord>>;
}

#[derive(Clone)]
pub struct TargetResolver {
    store: Arc<dyn TargetStore>,
}

impl TargetResolver {
    pub fn new(store: Arc<dyn TargetStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, request: &SyncRequest) -> Option<ResolvedTarget> {
        let tenant = request.tenant_id.as_str();
        let base_url = match self.store.tenant_base_url(tenant).await {
            Ok(base_url) => normalize_text_option(base_url),
            Err(error) => {
                tracing::warn!(tenant, error = %error, "Failed to load tenant base URL");
                None
            }
        };
        let Some(base_url) = base_url else {
            tracing::warn!(tenant, "Tenant has no base URL configured; skipping backlink sync");
            return None;
        };

        let lookup = match &request.target {
            SyncTarget::Document(id) => self.store.find_document(id).await,
            SyncTarget::Collection(id) => self.store.find_collection(id).await,
        };
        let record = match lookup {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(entity = %request.target, "Sync target not found");
                return None;
            }
            Err(error) => {
                tracing::warn!(
                    entity = %request.target,
                    error = %error,
                    "Failed to load sync target"
                );
                return None;
            }
        };

        let Some(path) = normalize_text_option(record.path) else {
            tracing::debug!(entity = %request.target, "Sync target has no path; skipping");
            return None;
        };
        let title =
            normalize_text_option(Some(record.title)).unwrap_or_else(|| UNTITLED.to_string());

        Some(ResolvedTarget {
            title,
            path,
            base_url,
        })
    }
}

/// In-memory [`TargetStore`], used by the CLI and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTargetStore {
    base_urls: HashMap<String, String>,
    documents: HashMap<String, EntityRecord>,
    collections: HashMap<String, EntityRecord>,
}

impl StaticTargetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(
        mut self,
        tenant_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.base_urls.insert(tenant_id.into(), base_url.into());
        self
    }

    #[must_use]
    pub fn with_document(mut self, id: impl Into<String>, record: EntityRecord) -> Self {
        self.documents.insert(id.into(), record);
        self
    }

    #[must_use]
    pub fn with_collection(mut self, id: impl Into<String>, record: EntityRecord) -> Self {
        self.collections.insert(id.into(), record);
        self
    }

    #[must_use]
    pub fn with_target(self, target: &SyncTarget, record: EntityRecord) -> Self {
        match target {
            SyncTarget::Document(id) => self.with_document(id.clone(), record),
            SyncTarget::Collection(id) => self.with_collection(id.clone(), record),
        }
    }
}

#[async_trait]
impl TargetStore for StaticTargetStore {
    async fn tenant_base_url(&self, tenant_id: &str) -> crate::Result<Option<String>> {
        Ok(self.base_urls.get(tenant_id).cloned())
    }

    async fn find_document(&self, id: &str) -> crate::Result<Option<EntityRecord>> {
        Ok(self.documents.get(id).cloned())
    }

    async fn find_collection(&self, id: &str) -> crate::Result<Option<EntityRecord>> {
        Ok(self.collections.get(id).cloned())
    }
}
