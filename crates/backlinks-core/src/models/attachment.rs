//! Remote attachment and canonical URL models

use serde::{Deserialize, Serialize};
use std::fmt;

/// An attachment record held by the issue tracker, linking one issue to a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteAttachment {
    /// Remote attachment identifier.
    pub id: String,
    /// URL the attachment points at.
    pub url: String,
    /// Internal id of the linked issue.
    pub issue_id: String,
    /// Human-readable issue key, e.g. `ENG-456`.
    pub issue_identifier: String,
}

/// A content entity URL carrying the provenance marker parameter.
///
/// Only [`crate::canonical`] constructs these, so holding one means the URL
/// was parsed as absolute and tagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub(crate) const fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
