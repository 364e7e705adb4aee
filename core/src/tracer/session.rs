use netprobe_common::log::ProbeLogger;

use super::TraceEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceVerdict {
    Finished { hops: usize },
    /// `exit_code` is `None` when the stream closed without reporting one.
    Failed { hops: usize, exit_code: Option<i32> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceState {
    Idle,
    Tracing { hops: usize },
    Completed(TraceVerdict),
}

/// Hop accumulator for a single trace.
#[derive(Debug)]
pub struct TraceSession {
    state: TraceState,
}

impl Default for TraceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceSession {
    pub fn new() -> Self {
        Self {
            state: TraceState::Idle,
        }
    }

    pub fn state(&self) -> TraceState {
        self.state
    }

    pub fn is_tracing(&self) -> bool {
        matches!(self.state, TraceState::Tracing { .. })
    }

    /// Idle -> Tracing. No effect in any other state.
    pub fn begin(&mut self) {
        if self.state == TraceState::Idle {
            self.state = TraceState::Tracing { hops: 0 };
        }
    }

    /// Feeds one event. Events outside the tracing state are dropped.
    pub fn apply(&mut self, event: TraceEvent, log: &dyn ProbeLogger) {
        let TraceState::Tracing { hops } = self.state else {
            return;
        };

        self.state = match event {
            TraceEvent::Hop(hop) => {
                log.info(&format!("Hop: {}", hop.to_json()));
                TraceState::Tracing { hops: hops + 1 }
            }
            TraceEvent::Close { exit_code: 0 } => TraceState::Completed(TraceVerdict::Finished { hops }),
            TraceEvent::Close { exit_code } => TraceState::Completed(TraceVerdict::Failed {
                hops,
                exit_code: Some(exit_code),
            }),
        };
    }

    /// The producer went away before sending a close event.
    pub fn end_of_stream(&mut self) {
        if let TraceState::Tracing { hops } = self.state {
            self.state = TraceState::Completed(TraceVerdict::Failed { hops, exit_code: None });
        }
    }

    /// Only available after a terminal transition.
    pub fn verdict(&self) -> Option<TraceVerdict> {
        match self.state {
            TraceState::Completed(verdict) => Some(verdict),
            _ => None,
        }
    }
}
