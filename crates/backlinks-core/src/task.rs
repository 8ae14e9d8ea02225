//! Sync task: the entry point invoked once per content change.
//!
//! The task resolves the target, canonicalizes its URL, reads the current
//! remote attachments and hands the diff to the [`Reconciler`]. Every run
//! starts from a fresh remote read, so a retried or overlapping run converges
//! on the same state instead of duplicating work.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::canonical::Canonicalizer;
use crate::error::Result;
use crate::models::{SyncOutcome, SyncRequest};
use crate::reconcile::{plan, LinkTarget, Reconciler};
use crate::remote::AttachmentClient;
use crate::resolver::{TargetResolver, TargetStore};

/// Retry schedule the task runner applies when [`SyncTask::perform`] errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub const DEFAULT: Self = Self {
        max_attempts: 3,
        initial_backoff: Duration::from_secs(30),
    };

    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        self.initial_backoff
            .saturating_mul(2_u32.saturating_pow(exponent))
    }

    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Hands out the issue tracker client configured for a tenant.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// `None` means the tenant has no integration installed.
    async fn client_for(&self, tenant_id: &str) -> Option<Arc<dyn AttachmentClient>>;
}

#[derive(Clone, Default)]
pub struct StaticClientProvider {
    clients: HashMap<String, Arc<dyn AttachmentClient>>,
}

impl StaticClientProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(
        mut self,
        tenant_id: impl Into<String>,
        client: Arc<dyn AttachmentClient>,
    ) -> Self {
        self.clients.insert(tenant_id.into(), client);
        self
    }
}

#[async_trait]
impl ClientProvider for StaticClientProvider {
    async fn client_for(&self, tenant_id: &str) -> Option<Arc<dyn AttachmentClient>> {
        self.clients.get(tenant_id).cloned()
    }
}

pub struct SyncTask {
    clients: Arc<dyn ClientProvider>,
    resolver: TargetResolver,
    canonicalizer: Canonicalizer,
    reconciler: Reconciler,
}

impl SyncTask {
    pub const RETRY_POLICY: RetryPolicy = RetryPolicy::DEFAULT;

    pub fn new(clients: Arc<dyn ClientProvider>, store: Arc<dyn TargetStore>) -> Self {
        Self {
            clients,
            resolver: TargetResolver::new(store),
            canonicalizer: Canonicalizer::default(),
            reconciler: Reconciler::default(),
        }
    }

    #[must_use]
    pub fn with_canonicalizer(mut self, canonicalizer: Canonicalizer) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    #[must_use]
    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub const fn retry_policy(&self) -> RetryPolicy {
        Self::RETRY_POLICY
    }

    /// Reconcile the request's target against the issue tracker.
    ///
    /// Returns `Ok(None)` when the run was skipped (no integration, target
    /// gone or unpublished, no base URL). Per-operation failures are reported
    /// in the outcome; the only error is a malformed configured base URL.
    pub async fn perform(&self, request: &SyncRequest) -> Result<Option<SyncOutcome>> {
        let tenant = request.tenant_id.as_str();

        let Some(client) = self.clients.client_for(tenant).await else {
            tracing::debug!(tenant, "No issue tracker integration for tenant; skipping");
            return Ok(None);
        };

        let Some(target) = self.resolver.resolve(request).await else {
            return Ok(None);
        };

        let url = self
            .canonicalizer
            .canonicalize(&target.base_url, &target.path)?;

        let existing = match client.attachments_for_url(url.as_str()).await {
            Ok(existing) => existing,
            Err(error) => {
                tracing::warn!(
                    tenant,
                    entity = %request.target,
                    error = %error,
                    "Failed to list existing backlinks; treating as none"
                );
                Vec::new()
            }
        };

        let plan = plan(&request.identifiers, &existing);
        if plan.is_empty() {
            tracing::debug!(tenant, entity = %request.target, "Backlinks already up to date");
            return Ok(Some(SyncOutcome::default()));
        }

        let outcome = self
            .reconciler
            .execute(
                client.as_ref(),
                plan,
                LinkTarget {
                    title: &target.title,
                    url: &url,
                },
            )
            .await;

        log_summary(request, &outcome);
        Ok(Some(outcome))
    }
}

fn log_summary(request: &SyncRequest, outcome: &SyncOutcome) {
    let tenant = request.tenant_id.as_str();
    if outcome.failed() == 0 {
        tracing::info!(
            tenant,
            entity = %request.target,
            created = outcome.created(),
            deleted = outcome.deleted(),
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            "Synced backlinks"
        );
        return;
    }

    let failures = outcome
        .failures()
        .iter()
        .map(|failure| format!("{} {}: {}", failure.kind, failure.identifier, failure.reason))
        .collect::<Vec<_>>()
        .join("; ");
    tracing::warn!(
        tenant,
        entity = %request.target,
        created = outcome.created(),
        deleted = outcome.deleted(),
        succeeded = outcome.succeeded(),
        failed = outcome.failed(),
        failures = %failures,
        "Synced backlinks with failures"
    );
}
