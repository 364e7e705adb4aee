use std::io;
use std::net::Ipv4Addr;
use std::process::Stdio;

use async_trait::async_trait;
use netprobe_common::network::hop::TraceFormat;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, Receiver};
use tracing::debug;

use super::{PathTracer, TraceEvent};

const EVENT_BUFFER: usize = 64;

/// Exit code reported when the tool was killed by a signal.
const NO_EXIT_CODE: i32 = -1;

/// Runs `traceroute -q 1 -n` (or `tracert -d` on Windows) and streams its
/// stdout as hop events.
#[derive(Clone, Debug)]
pub struct SystemTraceroute {
    format: TraceFormat,
    program: String,
    args: Vec<String>,
}

impl Default for SystemTraceroute {
    fn default() -> Self {
        Self::new(TraceFormat::native())
    }
}

impl SystemTraceroute {
    pub fn new(format: TraceFormat) -> Self {
        let (program, args): (&str, &[&str]) = match format {
            TraceFormat::Windows => ("tracert", &["-d"]),
            TraceFormat::Unix => ("traceroute", &["-q", "1", "-n"]),
        };
        Self::with_program(format, program, args)
    }

    /// Runs `program args.. <address>` in place of the platform tool.
    pub fn with_program(format: TraceFormat, program: &str, args: &[&str]) -> Self {
        Self {
            format,
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn command(&self, address: Ipv4Addr) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(address.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PathTracer for SystemTraceroute {
    async fn start(&self, address: Ipv4Addr) -> io::Result<Receiver<TraceEvent>> {
        let mut child = self.command(address).spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("traceroute stdout was not captured"))?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let format = self.format;

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                // Receiver gone: returning drops `child`, which kills the tool.
                let next = tokio::select! {
                    _ = tx.closed() => return,
                    next = lines.next_line() => next,
                };
                match next {
                    Ok(Some(line)) => {
                        let Some(hop) = format.parse_line(&line) else {
                            continue;
                        };
                        if tx.send(TraceEvent::Hop(hop)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!("Reading traceroute output for {address} failed: {e}");
                        break;
                    }
                }
            }

            let exit_code = match child.wait().await {
                Ok(status) => status.code().unwrap_or(NO_EXIT_CODE),
                Err(e) => {
                    debug!("Waiting on traceroute for {address} failed: {e}");
                    NO_EXIT_CODE
                }
            };
            let _ = tx.send(TraceEvent::Close { exit_code }).await;
        });

        Ok(rx)
    }
}
