//! Parsing of the line-oriented output produced by `traceroute` and `tracert`.

use std::net::IpAddr;

use serde::Serialize;

/// Placeholder used for an address or round trip time that never arrived.
pub const NO_REPLY: &str = "*";

/// One intermediate router reported while tracing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hop {
    pub hop: u32,
    pub ip: String,
    pub rtt1: String,
}

impl Hop {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// Output dialect of the path tracing tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceFormat {
    /// `traceroute -q 1 -n`
    Unix,
    /// `tracert -d`
    Windows,
}

impl TraceFormat {
    pub const fn native() -> Self {
        if cfg!(windows) {
            TraceFormat::Windows
        } else {
            TraceFormat::Unix
        }
    }

    /// Returns `None` for banners, blank lines and anything else that does not
    /// start with a hop number.
    pub fn parse_line(self, line: &str) -> Option<Hop> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let hop: u32 = tokens.first()?.parse().ok()?;
        match self {
            TraceFormat::Unix => parse_unix(hop, &tokens[1..]),
            TraceFormat::Windows => parse_windows(hop, &tokens[1..]),
        }
    }
}

// " 3  10.0.0.1  5.678 ms" or " 2  *"
fn parse_unix(hop: u32, rest: &[&str]) -> Option<Hop> {
    let ip = *rest.first()?;
    if ip == NO_REPLY {
        return Some(silent(hop));
    }

    let rtt1 = match rest.get(1..3) {
        Some([value, "ms"]) => format!("{value} ms"),
        _ => NO_REPLY.to_string(),
    };

    Some(Hop {
        hop,
        ip: ip.to_string(),
        rtt1,
    })
}

// "  3    12 ms    11 ms    13 ms  10.0.0.1" or "  2     *        *        *     Request timed out."
fn parse_windows(hop: u32, rest: &[&str]) -> Option<Hop> {
    let first = *rest.first()?;
    let rtt1 = match rest.get(1) {
        Some(&"ms") => format!("{first} ms"),
        _ => NO_REPLY.to_string(),
    };

    let ip = rest
        .last()
        .filter(|token| token.parse::<IpAddr>().is_ok())
        .map(|token| token.to_string());

    match ip {
        Some(ip) => Some(Hop { hop, ip, rtt1 }),
        None => Some(silent(hop)),
    }
}

fn silent(hop: u32) -> Hop {
    Hop {
        hop,
        ip: NO_REPLY.to_string(),
        rtt1: NO_REPLY.to_string(),
    }
}
