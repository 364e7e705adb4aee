use std::time::Duration;

use thiserror::Error;

use crate::network::target::Target;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ping host must not be empty")]
    EmptyHost,
    #[error("invalid https url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("https url '{url}' must use the https scheme, found '{scheme}'")]
    NotHttps { url: String, scheme: String },
    #[error("stage timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Host to resolve, ping and trace, plus the URL for the HTTPS check.
    pub target: Target,
    /// Upper bound applied to every stage.
    ///
    /// `None` runs each stage until its facility answers, which means a
    /// server that accepts the connection but never sends data hangs the run.
    pub stage_timeout: Option<Duration>,
}

impl Config {
    pub fn new(target: Target, stage_timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let cfg = Self { target, stage_timeout };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        if self.stage_timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
