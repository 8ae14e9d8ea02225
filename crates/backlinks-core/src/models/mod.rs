//! Data models for Backlinks

mod attachment;
mod outcome;
mod request;

pub use attachment::{CanonicalUrl, RemoteAttachment};
pub use outcome::{
    FailureReason, Operation, OperationFailure, OperationKind, OperationResult, OperationStatus,
    SyncOutcome,
};
pub use request::{SyncEvent, SyncRequest, SyncTarget};
