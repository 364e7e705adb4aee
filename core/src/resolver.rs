//! # DNS Resolution Stage
//!
//! Turns the configured host name into the IPv4 address used by every later
//! stage. Only A records are consulted and only the first answer is kept.

use std::fmt;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use netprobe_common::log::ProbeLogger;

use crate::error::ProbeError;

/// Why a lookup produced no address. `code` follows the resolver error codes
/// operators already know (`ENOTFOUND`, `ENODATA`, `ETIMEOUT`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupFailure {
    pub code: String,
    pub message: String,
}

impl LookupFailure {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for LookupFailure {}

/// A-record lookup facility.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve4(&self, host: &str) -> Result<Vec<Ipv4Addr>, LookupFailure>;
}

/// Resolves through the system resolver configuration using hickory.
#[derive(Clone, Copy, Debug, Default)]
pub struct HickoryResolver;

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn resolve4(&self, host: &str) -> Result<Vec<Ipv4Addr>, LookupFailure> {
        if let Ok(ip) = host.parse::<Ipv4Addr>() {
            return Ok(vec![ip]);
        }

        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| LookupFailure::new("EFILE", format!("cannot load resolver configuration: {e}")))?;

        let lookup = resolver.ipv4_lookup(host).await.map_err(|e| classify(&e))?;
        Ok(lookup.iter().map(|record| record.0).collect())
    }
}

fn classify(err: &ResolveError) -> LookupFailure {
    let code = match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            "ENOTFOUND"
        }
        ResolveErrorKind::NoRecordsFound { .. } => "ENODATA",
        ResolveErrorKind::Timeout => "ETIMEOUT",
        ResolveErrorKind::NoConnections => "ECONNREFUSED",
        _ => "ESERVFAIL",
    };
    LookupFailure::new(code, err.to_string())
}

/// Runs the resolution stage and returns the first address.
pub async fn resolve(
    resolver: &dyn DnsResolver,
    host: &str,
    log: &dyn ProbeLogger,
) -> Result<Ipv4Addr, ProbeError> {
    log.info(&format!("Starting DNS resolution for host '{host}'..."));

    let outcome = resolver
        .resolve4(host)
        .await
        .and_then(|addresses| {
            addresses
                .first()
                .copied()
                .ok_or_else(|| LookupFailure::new("ENODATA", format!("no A records for {host}")))
        });

    match outcome {
        Ok(address) => {
            log.info(&format!("--> Successfully resolved DNS to {address}."));
            Ok(address)
        }
        Err(failure) => {
            log.critical(&format!("--> Failed to resolve host, error: {}", failure.code));
            Err(ProbeError::Resolution {
                host: host.to_string(),
                code: failure.code,
                message: failure.message,
            })
        }
    }
}
