//! Reachability stage: one ICMP echo against the resolved address.

use std::net::Ipv4Addr;
use std::process::Stdio;

use async_trait::async_trait;
use netprobe_common::log::ProbeLogger;
use tokio::process::Command;
use tracing::debug;

use crate::error::ProbeError;

/// ICMP echo facility. Answers whether the host replied, nothing more.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn is_alive(&self, address: Ipv4Addr) -> bool;
}

/// Shells out to the platform `ping` binary, which already holds the
/// privileges needed for raw ICMP sockets.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemPing;

impl SystemPing {
    fn args(address: Ipv4Addr) -> Vec<String> {
        let address = address.to_string();
        let args: &[&str] = if cfg!(windows) {
            &["-n", "1", "-w", "2000"]
        } else if cfg!(target_os = "macos") {
            &["-n", "-c", "1", "-t", "2"]
        } else {
            &["-n", "-c", "1", "-W", "2"]
        };
        args.iter().map(|a| a.to_string()).chain([address]).collect()
    }
}

#[async_trait]
impl Pinger for SystemPing {
    async fn is_alive(&self, address: Ipv4Addr) -> bool {
        let output = Command::new("ping")
            .args(Self::args(address))
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            // Windows ping exits 0 on "Destination host unreachable", only a TTL marks a real reply.
            Ok(out) if cfg!(windows) => {
                out.status.success() && String::from_utf8_lossy(&out.stdout).contains("TTL=")
            }
            Ok(out) => out.status.success(),
            Err(e) => {
                debug!("Unable to run ping against {address}: {e}");
                false
            }
        }
    }
}

/// Runs the reachability stage.
pub async fn ping(
    pinger: &dyn Pinger,
    address: Ipv4Addr,
    log: &dyn ProbeLogger,
) -> Result<(), ProbeError> {
    log.info(&format!("Pinging IPV4 address '{address}'..."));

    if pinger.is_alive(address).await {
        log.info(&format!("--> Successfully pinged {address}"));
        return Ok(());
    }

    let err = ProbeError::Reachability { address };
    log.critical(&format!("--> {err}"));
    Err(err)
}
