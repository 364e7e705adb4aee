pub mod check;

use std::time::Duration;

use clap::{ArgAction, Parser};

#[derive(Parser)]
#[command(name = "netprobe")]
#[command(version)]
#[command(about = "Checks DNS, ping, traceroute and HTTPS towards one host, in that order.")]
pub struct CommandLine {
    /// Host name or IPv4 address to resolve, ping and trace
    #[arg(long = "host", env = "NETPROBE_PING_HOST")]
    pub host: String,

    /// URL requested over HTTPS once the path checks passed
    #[arg(long = "url", env = "NETPROBE_HTTPS_URL")]
    pub url: String,

    /// Abort any stage still running after this many seconds (no limit by default)
    #[arg(short = 't', long = "timeout", env = "NETPROBE_STAGE_TIMEOUT", value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Show debug output, repeat for trace output
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and failures
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid number of seconds '{s}': {e}"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got '{s}'"));
    }
    Ok(Duration::from_secs_f64(secs))
}
