//! Error types for backlinks-core

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias using backlinks-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in backlinks-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A configured base URL is not an absolute http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote issue tracker error
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}
