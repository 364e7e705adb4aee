use std::fmt;

/// One discrete step of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Resolve,
    Ping,
    Trace,
    Endpoint,
}

impl Stage {
    /// Execution order. A stage only starts once every stage before it succeeded.
    pub const ORDER: [Stage; 4] = [Stage::Resolve, Stage::Ping, Stage::Trace, Stage::Endpoint];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Ping => "ping",
            Stage::Trace => "trace",
            Stage::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
