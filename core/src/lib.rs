pub mod endpoint;
pub mod error;
pub mod pipeline;
pub mod prober;
pub mod resolver;
pub mod stage;
pub mod tracer;

pub use error::{ProbeError, TransportError};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use stage::Stage;
