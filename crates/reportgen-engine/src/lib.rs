//! reportgen-engine
//!
//! The report pipeline: request parsing, per-type lifecycle use cases with
//! a liveness heartbeat, and the processor that drives generate, upload,
//! notify and finish for each queue message.

mod cleanup;
pub mod error;
pub mod heartbeat;
pub mod metrics;
pub mod processor;
pub mod request;
pub mod usecase;

pub use crate::error::EngineError;
pub use crate::metrics::{Metric, MetricsSink, TracingMetrics};
pub use crate::processor::ReportProcessor;
pub use crate::usecase::{GenerateUseCase, LifecycleUseCase, ReportTypeRegistry};
