//! Canonical, provenance-tagged URLs for content entities.
//!
//! Every attachment this crate creates points at a URL carrying a fixed marker
//! query parameter. Looking attachments up by that exact URL therefore only
//! ever returns records this crate created.

use url::Url;

use crate::error::{Error, Result};
use crate::models::CanonicalUrl;

/// Query parameter name appended to every canonical URL.
pub const MARKER_PARAM: &str = "source";
/// Value of the marker parameter.
pub const MARKER_VALUE: &str = "outline";

/// Marker parameter bound into a [`Canonicalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub param: String,
    pub value: String,
}

impl Marker {
    pub fn new(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            value: value.into(),
        }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new(MARKER_PARAM, MARKER_VALUE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canonicalizer {
    marker: Marker,
}

impl Canonicalizer {
    #[must_use]
    pub const fn new(marker: Marker) -> Self {
        Self { marker }
    }

    #[must_use]
    pub const fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Build the marker-bearing absolute URL for an entity path.
    ///
    /// `base_url` must be an absolute http(s) URL; any query or fragment on it
    /// is ignored. The path is appended below the base path rather than
    /// replacing it, so bases hosted under a prefix keep that prefix.
    pub fn canonicalize(&self, base_url: &str, path: &str) -> Result<CanonicalUrl> {
        let base = parse_base_url(base_url)?;
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim().trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|error| Error::InvalidUrl(format!("{joined}: {error}")))?;

        let retained: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| *key != self.marker.param)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        url.query_pairs_mut()
            .extend_pairs(retained)
            .append_pair(&self.marker.param, &self.marker.value);

        Ok(CanonicalUrl::new(url.into()))
    }
}

/// Canonicalize with the default marker.
pub fn canonicalize(base_url: &str, path: &str) -> Result<CanonicalUrl> {
    Canonicalizer::default().canonicalize(base_url, path)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let mut url =
        Url::parse(trimmed).map_err(|error| Error::InvalidUrl(format!("{trimmed}: {error}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "{trimmed}: base URL must use http:// or https://"
        )));
    }
    if !url.has_host() {
        return Err(Error::InvalidUrl(format!("{trimmed}: base URL has no host")));
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
