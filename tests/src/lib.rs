//! Scripted stand-ins for the system facilities, plus a journal recording
//! which facility was invoked and in what order.

use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use netprobe_common::config::Config;
use netprobe_common::log::RecordingLogger;
use netprobe_common::network::hop::Hop;
use netprobe_common::network::target::Target;
use netprobe_core::endpoint::HttpsClient;
use netprobe_core::prober::Pinger;
use netprobe_core::resolver::{DnsResolver, LookupFailure};
use netprobe_core::tracer::{PathTracer, TraceEvent};
use netprobe_core::{Pipeline, Stage, TransportError};
use tokio::sync::mpsc::{self, Receiver};

pub const HOST: &str = "example.test";
pub const URL: &str = "https://example.test/status";
pub const ADDRESS: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Stage>>>);

impl Journal {
    fn record(&self, stage: Stage) {
        self.0.lock().unwrap().push(stage);
    }

    pub fn invoked(&self) -> Vec<Stage> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, stage: Stage) -> usize {
        self.invoked().iter().filter(|s| **s == stage).count()
    }
}

pub struct ScriptedResolver {
    answer: Result<Vec<Ipv4Addr>, LookupFailure>,
    journal: Journal,
}

#[async_trait]
impl DnsResolver for ScriptedResolver {
    async fn resolve4(&self, _host: &str) -> Result<Vec<Ipv4Addr>, LookupFailure> {
        self.journal.record(Stage::Resolve);
        self.answer.clone()
    }
}

pub struct ScriptedPinger {
    alive: bool,
    journal: Journal,
    probed: Arc<Mutex<Vec<Ipv4Addr>>>,
}

#[async_trait]
impl Pinger for ScriptedPinger {
    async fn is_alive(&self, address: Ipv4Addr) -> bool {
        self.journal.record(Stage::Ping);
        self.probed.lock().unwrap().push(address);
        self.alive
    }
}

pub struct ScriptedTracer {
    script: TraceScript,
    journal: Journal,
    traced: Arc<Mutex<Vec<Ipv4Addr>>>,
}

#[async_trait]
impl PathTracer for ScriptedTracer {
    async fn start(&self, address: Ipv4Addr) -> io::Result<Receiver<TraceEvent>> {
        self.journal.record(Stage::Trace);
        self.traced.lock().unwrap().push(address);

        let (hops, exit_code) = match &self.script {
            TraceScript::Run { hops, exit_code } => (*hops, *exit_code),
            TraceScript::Missing => {
                return Err(io::Error::new(io::ErrorKind::NotFound, "traceroute: command not found"));
            }
            TraceScript::Stall => {
                let (tx, rx) = mpsc::channel(1);
                tokio::spawn(async move {
                    let _keep_open = tx;
                    std::future::pending::<()>().await;
                });
                return Ok(rx);
            }
        };

        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            for n in 1..=hops {
                let hop = Hop {
                    hop: n,
                    ip: format!("10.0.{n}.1"),
                    rtt1: format!("{n}.0 ms"),
                };
                if tx.send(TraceEvent::Hop(hop)).await.is_err() {
                    return;
                }
            }
            if let Some(exit_code) = exit_code {
                let _ = tx.send(TraceEvent::Close { exit_code }).await;
            }
        });
        Ok(rx)
    }
}

pub struct ScriptedClient {
    reply: Result<Option<usize>, String>,
    journal: Journal,
}

#[async_trait]
impl HttpsClient for ScriptedClient {
    async fn first_chunk(&self, _url: &str) -> Result<Option<usize>, TransportError> {
        self.journal.record(Stage::Endpoint);
        self.reply.clone().map_err(TransportError::from)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TraceScript {
    /// Emits `hops` hop events, then a close event when `exit_code` is set.
    Run { hops: u32, exit_code: Option<i32> },
    /// The tracing tool cannot be started.
    Missing,
    /// Starts, then never reports anything.
    Stall,
}

/// Describes how every facility behaves. The default is a fully healthy path.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub dns: Result<Vec<Ipv4Addr>, LookupFailure>,
    pub alive: bool,
    pub trace: TraceScript,
    pub https: Result<Option<usize>, String>,
    pub stage_timeout: Option<Duration>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            dns: Ok(vec![ADDRESS]),
            alive: true,
            trace: TraceScript::Run {
                hops: 5,
                exit_code: Some(0),
            },
            https: Ok(Some(1256)),
            stage_timeout: None,
        }
    }
}

pub struct Harness {
    pub pipeline: Pipeline,
    pub log: Arc<RecordingLogger>,
    pub journal: Journal,
    pub pinged: Arc<Mutex<Vec<Ipv4Addr>>>,
    pub traced: Arc<Mutex<Vec<Ipv4Addr>>>,
}

impl Scenario {
    pub fn build(self) -> Harness {
        let journal = Journal::default();
        let log = Arc::new(RecordingLogger::new());
        let pinged = Arc::new(Mutex::new(Vec::new()));
        let traced = Arc::new(Mutex::new(Vec::new()));

        let target = Target::new(HOST, URL).unwrap();
        let config = Config::new(target, self.stage_timeout).unwrap();

        let pipeline = Pipeline::builder(config)
            .resolver(ScriptedResolver {
                answer: self.dns,
                journal: journal.clone(),
            })
            .pinger(ScriptedPinger {
                alive: self.alive,
                journal: journal.clone(),
                probed: pinged.clone(),
            })
            .tracer(ScriptedTracer {
                script: self.trace,
                journal: journal.clone(),
                traced: traced.clone(),
            })
            .client(ScriptedClient {
                reply: self.https,
                journal: journal.clone(),
            })
            .logger(log.clone())
            .build();

        Harness {
            pipeline,
            log,
            journal,
            pinged,
            traced,
        }
    }
}
