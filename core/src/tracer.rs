//! # Path Tracing Stage
//!
//! A trace is a stream of [`TraceEvent`]s produced by a [`PathTracer`]: one
//! event per reported hop, then a single close event carrying the exit code of
//! the tracing tool. The stream is folded by a [`TraceSession`], which owns the
//! hop counter and only exposes it once a terminal transition has fired.

use std::io;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use netprobe_common::log::ProbeLogger;
use netprobe_common::network::hop::Hop;
use tokio::sync::mpsc::Receiver;

use crate::error::ProbeError;

mod session;
mod system;

pub use session::{TraceSession, TraceState, TraceVerdict};
pub use system::SystemTraceroute;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    Hop(Hop),
    Close { exit_code: i32 },
}

/// Path tracing facility.
#[async_trait]
pub trait PathTracer: Send + Sync {
    /// Starts tracing `address` and hands back the event stream.
    ///
    /// An error here means the trace never started (tool missing, not
    /// executable, ...). Failures after that point arrive as a non-zero
    /// close event.
    async fn start(&self, address: Ipv4Addr) -> io::Result<Receiver<TraceEvent>>;
}

/// Runs the tracing stage and returns the number of hops seen.
pub async fn trace(
    tracer: &dyn PathTracer,
    address: Ipv4Addr,
    log: &dyn ProbeLogger,
) -> Result<usize, ProbeError> {
    log.info(&format!("Traceroute on IPV4 address '{address}'..."));

    let mut events = match tracer.start(address).await {
        Ok(events) => events,
        Err(e) => {
            log.critical(&format!("--> Failed to traceroute: {e}"));
            return Err(ProbeError::Trace {
                address,
                hops: None,
                reason: e.to_string(),
            });
        }
    };

    let mut session = TraceSession::new();
    session.begin();
    while session.is_tracing() {
        match events.recv().await {
            Some(event) => session.apply(event, log),
            None => session.end_of_stream(),
        }
    }

    match session.verdict() {
        Some(TraceVerdict::Finished { hops }) => {
            log.info(&format!("--> Successfully ran traceroute on {address}: {hops} hops."));
            Ok(hops)
        }
        Some(TraceVerdict::Failed { hops, exit_code }) => {
            log.critical(&format!("--> Failed to trace {address}"));
            let reason = match exit_code {
                Some(code) => format!("failed after {hops} hops (exit code {code})"),
                None => format!("event stream ended after {hops} hops without an exit status"),
            };
            Err(ProbeError::Trace {
                address,
                hops: Some(hops),
                reason,
            })
        }
        None => Err(ProbeError::Trace {
            address,
            hops: None,
            reason: "trace never started".to_string(),
        }),
    }
}
