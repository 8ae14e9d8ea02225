//! Runtime configuration for wiring a sync task from the environment.
//!
//! Values are read through a lookup closure so tests can feed a map instead
//! of touching the process environment.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::reconcile::{ReconcileSettings, DEFAULT_SUBTITLE};
use crate::remote::{LinearClient, RemoteError, DEFAULT_API_URL};
use crate::util::{is_http_url, normalize_text_option};

const ENV_BASE_URL: &str = "BACKLINKS_BASE_URL";
const ENV_ACCESS_TOKEN: &str = "LINEAR_ACCESS_TOKEN";
const ENV_API_URL: &str = "LINEAR_API_URL";
const ENV_ICON_URL: &str = "BACKLINKS_ICON_URL";
const ENV_SUBTITLE: &str = "BACKLINKS_SUBTITLE";
const ENV_HTTP_TIMEOUT_SECS: &str = "BACKLINKS_HTTP_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const ICON_PATH: &str = "images/icon-192.png";

#[derive(Clone, PartialEq, Eq)]
pub struct BacklinksConfig {
    /// Base URL of the content workspace, e.g. `https://docs.example.com`.
    pub base_url: Option<String>,
    /// Issue tracker OAuth token. `None` means the integration is not installed.
    pub access_token: Option<String>,
    pub api_url: String,
    pub icon_url: Option<String>,
    pub subtitle: String,
    pub http_timeout: Duration,
}

impl fmt::Debug for BacklinksConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("BacklinksConfig")
            .field("base_url", &self.base_url)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("icon_url", &self.icon_url)
            .field("subtitle", &self.subtitle)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl BacklinksConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = optional_http_url(&lookup, ENV_BASE_URL)?;
        let access_token = normalize_text_option(lookup(ENV_ACCESS_TOKEN));

        let api_url = optional_http_url(&lookup, ENV_API_URL)?
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let icon_url = match optional_http_url(&lookup, ENV_ICON_URL)? {
            Some(icon_url) => Some(icon_url),
            None => base_url
                .as_deref()
                .map(|base_url| format!("{base_url}/{ICON_PATH}")),
        };

        let subtitle = normalize_text_option(lookup(ENV_SUBTITLE))
            .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string());

        let http_timeout_secs = match normalize_text_option(lookup(ENV_HTTP_TIMEOUT_SECS)) {
            None => DEFAULT_HTTP_TIMEOUT_SECS,
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "{ENV_HTTP_TIMEOUT_SECS} must be an integer in [1, 120]"
                ))
            })?,
        };
        if !(1..=120).contains(&http_timeout_secs) {
            return Err(Error::Config(format!(
                "{ENV_HTTP_TIMEOUT_SECS} must be in [1, 120]"
            )));
        }

        Ok(Self {
            base_url,
            access_token,
            api_url,
            icon_url,
            subtitle,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings {
            subtitle: self.subtitle.clone(),
            icon_url: self.icon_url.clone(),
        }
    }

    /// Build the issue tracker client, or `None` when no token is configured.
    pub fn linear_client(&self) -> Result<Option<LinearClient>> {
        let Some(access_token) = self.access_token.as_deref() else {
            return Ok(None);
        };
        LinearClient::with_timeout(&self.api_url, access_token, self.http_timeout)
            .map(Some)
            .map_err(|error| match error {
                RemoteError::InvalidConfiguration(message) => Error::Config(message),
                other => Error::Remote(other),
            })
    }
}

fn optional_http_url(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<String>> {
    let Some(value) = normalize_text_option(lookup(name)) else {
        return Ok(None);
    };
    if !is_http_url(&value) {
        return Err(Error::Config(format!(
            "{name} must start with http:// or https://"
        )));
    }
    Ok(Some(value.trim_end_matches('/').to_string()))
}
