use backlinks_core::{canonicalize, BacklinksConfig, CanonicalUrl};

use crate::error::CliError;

pub fn run_url(
    path: &str,
    base_url: Option<String>,
    config: &BacklinksConfig,
) -> Result<(), CliError> {
    println!("{}", canonical_url(path, base_url, config)?);
    Ok(())
}

pub fn canonical_url(
    path: &str,
    base_url: Option<String>,
    config: &BacklinksConfig,
) -> Result<CanonicalUrl, CliError> {
    let base_url = resolve_base_url(base_url, config).ok_or(CliError::MissingBaseUrl)?;
    Ok(canonicalize(&base_url, path)?)
}

/// Explicit flag first, then configuration.
pub fn resolve_base_url(explicit: Option<String>, config: &BacklinksConfig) -> Option<String> {
    explicit
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| config.base_url.clone())
}
