pub mod pipeline;
pub mod sink;

pub use pipeline::{AgentPipeline, StepReport};
pub use sink::{MemorySink, NullSink, PersistenceQueue};
