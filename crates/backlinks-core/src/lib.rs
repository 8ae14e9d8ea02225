//! backlinks-core - Core library for Backlinks
//!
//! Keeps the attachment records an issue tracker holds for a document or
//! collection in step with the issue identifiers mentioned inside it. The
//! crate owns the diff and its execution; event wiring, mention extraction and
//! credential storage live with the caller.

pub mod canonical;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod remote;
pub mod resolver;
pub mod task;
pub mod util;

#[cfg(test)]
mod test_support;

pub use canonical::{canonicalize, Canonicalizer, Marker};
pub use config::BacklinksConfig;
pub use error::{Error, Result};
pub use models::{
    CanonicalUrl, OperationKind, RemoteAttachment, SyncEvent, SyncOutcome, SyncRequest, SyncTarget,
};
pub use reconcile::{plan, ReconcilePlan, ReconcileSettings, Reconciler};
pub use remote::{AttachmentClient, LinearClient, RemoteError};
pub use resolver::{EntityRecord, ResolvedTarget, StaticTargetStore, TargetResolver, TargetStore};
pub use task::{ClientProvider, RetryPolicy, StaticClientProvider, SyncTask};
