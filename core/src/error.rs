use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

use crate::stage::Stage;

/// Error raised by the HTTP transport underneath the endpoint check.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal failure of a run. Nothing is retried; the first one wins.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to resolve host '{host}': {code} ({message})")]
    Resolution {
        host: String,
        code: String,
        message: String,
    },

    #[error("Failed to ping {address}")]
    Reachability { address: Ipv4Addr },

    #[error("failed to trace {address}: {reason}")]
    Trace {
        address: Ipv4Addr,
        /// Hops seen before the failure, `None` when the trace never started.
        hops: Option<usize>,
        reason: String,
    },

    #[error("https request to '{url}' failed: {source}")]
    Endpoint {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("{stage} stage timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    #[error("{stage} stage needs a resolved address but none was produced")]
    OutOfOrder { stage: Stage },
}

impl ProbeError {
    /// The stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            ProbeError::Resolution { .. } => Stage::Resolve,
            ProbeError::Reachability { .. } => Stage::Ping,
            ProbeError::Trace { .. } => Stage::Trace,
            ProbeError::Endpoint { .. } => Stage::Endpoint,
            ProbeError::Timeout { stage, .. } | ProbeError::OutOfOrder { stage } => *stage,
        }
    }
}
