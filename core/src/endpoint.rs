//! HTTPS endpoint stage.
//!
//! The check is a liveness probe: the first body chunk counts as success no
//! matter what status code came with it. Redirects are not followed either: a
//! 3xx answer from the configured URL is that URL answering, so only its own
//! response is read.
//!
//! Without a stage timeout, a server that accepts the request and never sends
//! a byte keeps this stage waiting forever. A response that ends cleanly with
//! an empty body (a 204, say) is a different case: it has nothing left to
//! wait for, so it fails the stage instead of hanging like a silent server
//! would.

use async_trait::async_trait;
use netprobe_common::log::ProbeLogger;

use crate::error::{ProbeError, TransportError};

/// HTTPS GET facility.
#[async_trait]
pub trait HttpsClient: Send + Sync {
    /// Sends the request and waits for the first chunk of the body.
    ///
    /// Returns the chunk length, or `None` when the body ended empty.
    async fn first_chunk(&self, url: &str) -> Result<Option<usize>, TransportError>;
}

#[derive(Clone, Debug)]
pub struct ReqwestClient {
    https_only: bool,
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self { https_only: true }
    }
}

impl ReqwestClient {
    /// Client that also speaks plain HTTP, for local test servers.
    #[cfg(test)]
    fn plaintext() -> Self {
        Self { https_only: false }
    }

    fn client(&self) -> reqwest::Result<reqwest::Client> {
        let builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if self.https_only {
            builder.https_only(true).build()
        } else {
            builder.no_proxy().build()
        }
    }
}

#[async_trait]
impl HttpsClient for ReqwestClient {
    async fn first_chunk(&self, url: &str) -> Result<Option<usize>, TransportError> {
        let mut response = self.client()?.get(url).send().await?;
        let chunk = response.chunk().await?;
        Ok(chunk.map(|bytes| bytes.len()))
    }
}

/// Runs the endpoint stage against `url`.
pub async fn check(client: &dyn HttpsClient, url: &str, log: &dyn ProbeLogger) -> Result<(), ProbeError> {
    log.info(&format!("Sending https request to '{url}'"));

    let source: TransportError = match client.first_chunk(url).await {
        Ok(Some(_)) => {
            log.info("--> Successfully completed https request");
            return Ok(());
        }
        Ok(None) => "response closed before any data arrived".into(),
        Err(e) => e,
    };

    log.warning("--> Failed to make https request.");
    log.debug(&format!("{source:?}"));
    Err(ProbeError::Endpoint {
        url: url.to_string(),
        source,
    })
}
