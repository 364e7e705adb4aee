//! # Probe Target Model
//!
//! A run checks exactly one host. The host name feeds DNS resolution, and the
//! resolved address is what gets pinged and traced. The HTTPS URL is checked
//! independently and may point at a different host.

use url::Url;

use crate::config::ConfigError;

/// Immutable input of a single run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    ping_host: String,
    https_url: String,
}

impl Target {
    /// Builds a target after checking both values.
    pub fn new(ping_host: impl Into<String>, https_url: impl Into<String>) -> Result<Self, ConfigError> {
        let target = Self {
            ping_host: ping_host.into().trim().to_string(),
            https_url: https_url.into().trim().to_string(),
        };
        target.validate()?;
        Ok(target)
    }

    pub fn ping_host(&self) -> &str {
        &self.ping_host
    }

    pub fn https_url(&self) -> &str {
        &self.https_url
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ping_host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        validate_https_url(&self.https_url)
    }
}

/// Only absolute `https://` URLs are accepted; plain HTTP would skip the TLS
/// handshake the check is meant to exercise.
fn validate_https_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "https" {
        return Err(ConfigError::NotHttps {
            url: raw.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
