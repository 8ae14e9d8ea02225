use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] backlinks_core::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No base URL configured. Pass --base-url or set BACKLINKS_BASE_URL.")]
    MissingBaseUrl,
}
