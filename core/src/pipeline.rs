//! # Probe Pipeline
//!
//! Drives the four stages in [`Stage::ORDER`], stopping at the first failure.
//! The resolved address is the only value threaded between stages.
//!
//! Facilities are injected through [`PipelineBuilder`], so the same driver
//! runs against the real system tools or against scripted doubles.

use std::net::Ipv4Addr;
use std::sync::Arc;

use netprobe_common::config::Config;
use netprobe_common::log::{ProbeLogger, TracingLogger};

use crate::endpoint::{self, HttpsClient, ReqwestClient};
use crate::error::ProbeError;
use crate::prober::{self, Pinger, SystemPing};
use crate::resolver::{self, DnsResolver, HickoryResolver};
use crate::stage::Stage;
use crate::tracer::{self, PathTracer, SystemTraceroute};

pub struct Pipeline {
    config: Config,
    resolver: Box<dyn DnsResolver>,
    pinger: Box<dyn Pinger>,
    tracer: Box<dyn PathTracer>,
    client: Box<dyn HttpsClient>,
    log: Arc<dyn ProbeLogger>,
}

/// Values produced so far in one run.
#[derive(Debug, Default)]
struct Progress {
    address: Option<Ipv4Addr>,
}

impl Progress {
    fn address_for(&self, stage: Stage) -> Result<Ipv4Addr, ProbeError> {
        self.address.ok_or(ProbeError::OutOfOrder { stage })
    }
}

impl Pipeline {
    /// Pipeline wired to the system resolver, `ping`, `traceroute` and an
    /// HTTPS client, logging through `tracing`.
    pub fn system(config: Config) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Runs every stage once, in order.
    ///
    /// Resolves with `Ok(())` only when all four stages passed, otherwise with
    /// the error of the first stage that failed. Later stages are never
    /// started after a failure.
    pub async fn run(&self) -> Result<(), ProbeError> {
        let mut progress = Progress::default();
        for stage in Stage::ORDER {
            self.run_stage(stage, &mut progress).await?;
        }
        Ok(())
    }

    async fn run_stage(&self, stage: Stage, progress: &mut Progress) -> Result<(), ProbeError> {
        let work = self.execute(stage, progress);
        let Some(limit) = self.config.stage_timeout else {
            return work.await;
        };

        match tokio::time::timeout(limit, work).await {
            Ok(result) => result,
            Err(_) => {
                let err = ProbeError::Timeout { stage, after: limit };
                self.log.critical(&format!("--> {err}"));
                Err(err)
            }
        }
    }

    async fn execute(&self, stage: Stage, progress: &mut Progress) -> Result<(), ProbeError> {
        let log = self.log.as_ref();
        let target = &self.config.target;

        match stage {
            Stage::Resolve => {
                let host = target.ping_host();
                let address = resolver::resolve(self.resolver.as_ref(), host, log).await?;
                log.debug(&format!("{host:?} using address: {address}"));
                progress.address = Some(address);
            }
            Stage::Ping => {
                let address = progress.address_for(stage)?;
                prober::ping(self.pinger.as_ref(), address, log).await?;
            }
            Stage::Trace => {
                let address = progress.address_for(stage)?;
                tracer::trace(self.tracer.as_ref(), address, log).await?;
            }
            Stage::Endpoint => {
                endpoint::check(self.client.as_ref(), target.https_url(), log).await?;
            }
        }
        Ok(())
    }
}

pub struct PipelineBuilder {
    config: Config,
    resolver: Option<Box<dyn DnsResolver>>,
    pinger: Option<Box<dyn Pinger>>,
    tracer: Option<Box<dyn PathTracer>>,
    client: Option<Box<dyn HttpsClient>>,
    log: Option<Arc<dyn ProbeLogger>>,
}

impl PipelineBuilder {
    fn new(config: Config) -> Self {
        Self {
            config,
            resolver: None,
            pinger: None,
            tracer: None,
            client: None,
            log: None,
        }
    }

    pub fn resolver(mut self, resolver: impl DnsResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn pinger(mut self, pinger: impl Pinger + 'static) -> Self {
        self.pinger = Some(Box::new(pinger));
        self
    }

    pub fn tracer(mut self, tracer: impl PathTracer + 'static) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    pub fn client(mut self, client: impl HttpsClient + 'static) -> Self {
        self.client = Some(Box::new(client));
        self
    }

    pub fn logger(mut self, log: Arc<dyn ProbeLogger>) -> Self {
        self.log = Some(log);
        self
    }

    /// Missing facilities fall back to the system implementations.
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            resolver: self.resolver.unwrap_or_else(|| Box::new(HickoryResolver)),
            pinger: self.pinger.unwrap_or_else(|| Box::new(SystemPing)),
            tracer: self
                .tracer
                .unwrap_or_else(|| Box::new(SystemTraceroute::default())),
            client: self.client.unwrap_or_else(|| Box::new(ReqwestClient::default())),
            log: self.log.unwrap_or_else(|| Arc::new(TracingLogger)),
        }
    }
}
