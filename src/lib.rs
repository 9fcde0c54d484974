//! Variant Engine: Combinatorial Parallel Execution
//!
//! Expands a base configuration into variants, runs an execution step once per
//! variant (sequentially or on a bounded worker pool), collects every result and
//! its captured output, and replays that output to a sink exactly once per
//! variant before any failure is reported.

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod logging;
pub mod outcome;
pub mod output;
pub mod scheduler;
pub mod variant;

pub use engine::{run, run_with_result, Engine, RunOptions};
pub use error::{CompositeFailure, EngineError, ExecutionError, VariantFailure};
pub use outcome::{Execution, Outcome};
pub use output::{BufferSink, OutputLine, OutputSink, StreamKind, TracingSink};
pub use scheduler::{ErrorPolicy, Scheduler};
pub use variant::{configure, Configure, Generator, Variant};
