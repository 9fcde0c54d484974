//! Run pipeline
//!
//! Generates the variants of a base configuration, schedules them, replays
//! captured output and finally reports failures. Output is always dispatched
//! before a failure is returned to the caller.

use crate::aggregator;
use crate::collector::OutcomeCollector;
use crate::config::SchedulingConfig;
use crate::dispatcher::DispatchGuard;
use crate::error::{EngineError, ExecutionError};
use crate::outcome::Execution;
use crate::output::{OutputLine, OutputSink};
use crate::scheduler::{ErrorPolicy, Scheduler};
use crate::variant::{Generator, Variant};
use std::time::Instant;
use tracing::{error, info};

/// Options for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of variants executing at once; 1 runs sequentially
    pub concurrency: usize,
    pub stop_on_first_error: bool,
}

impl RunOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel(concurrency: usize) -> Self {
        Self {
            concurrency,
            ..Self::default()
        }
    }

    pub fn with_stop_on_first_error(mut self, stop_on_first_error: bool) -> Self {
        self.stop_on_first_error = stop_on_first_error;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            stop_on_first_error: true,
        }
    }
}

impl From<&SchedulingConfig> for RunOptions {
    fn from(config: &SchedulingConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            stop_on_first_error: config.stop_on_first_error,
        }
    }
}

/// Combinatorial execution engine
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: RunOptions,
}

impl Engine {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self::new(RunOptions::from(config))
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    fn scheduler(&self) -> Result<Scheduler, EngineError> {
        if self.options.concurrency == 0 {
            return Err(EngineError::InvalidConcurrency(0));
        }
        Ok(Scheduler::new(
            self.options.concurrency,
            ErrorPolicy::from(self.options.stop_on_first_error),
        ))
    }

    /// Run an executor that only produces output.
    pub fn run<V, G, F, S>(
        &self,
        generator: &G,
        executor: F,
        sink: &mut S,
    ) -> Result<Vec<Execution<V>>, EngineError>
    where
        V: Variant,
        G: Generator<V> + ?Sized,
        F: Fn(&V) -> Result<Vec<OutputLine>, ExecutionError> + Sync,
        S: OutputSink + ?Sized,
    {
        self.run_with_result(generator, |variant: &V| executor(variant).map(|output| ((), output)), sink)
    }

    /// Run an executor that produces a result alongside its output.
    ///
    /// Blocks until every started variant has finished. Output of variants
    /// with logging enabled is sent to `sink` on both the success and the
    /// failure path; a failed run then returns [`EngineError::Failed`] with
    /// every failure.
    pub fn run_with_result<V, R, G, F, S>(
        &self,
        generator: &G,
        executor: F,
        sink: &mut S,
    ) -> Result<Vec<Execution<V, R>>, EngineError>
    where
        V: Variant,
        R: Send,
        G: Generator<V> + ?Sized,
        F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError> + Sync,
        S: OutputSink + ?Sized,
    {
        let scheduler = self.scheduler()?;
        let variants = generator.expand(V::default());
        let total = variants.len();
        let started_at = Instant::now();

        info!(
            variants = total,
            concurrency = scheduler.concurrency(),
            policy = ?scheduler.policy(),
            "Starting run"
        );

        let collector = OutcomeCollector::with_capacity(total);
        let guard = DispatchGuard::new(&collector, sink);
        scheduler.schedule(variants, &executor, &collector);
        guard.release();

        let outcomes = collector.into_outcomes();
        let started = outcomes.len();
        let duration_ms = started_at.elapsed().as_millis();

        match aggregator::check(outcomes) {
            Ok(executions) => {
                info!(variants = total, started, duration_ms, "Run completed");
                Ok(executions)
            }
            Err(composite) => {
                error!(
                    variants = total,
                    started,
                    failed = composite.len(),
                    duration_ms,
                    "Run failed"
                );
                Err(EngineError::Failed(composite))
            }
        }
    }
}

/// Run an output-only executor over every variant produced by `generator`.
pub fn run<V, G, F, S>(
    generator: &G,
    executor: F,
    sink: &mut S,
    concurrency: usize,
    stop_on_first_error: bool,
) -> Result<Vec<Execution<V>>, EngineError>
where
    V: Variant,
    G: Generator<V> + ?Sized,
    F: Fn(&V) -> Result<Vec<OutputLine>, ExecutionError> + Sync,
    S: OutputSink + ?Sized,
{
    Engine::new(RunOptions {
        concurrency,
        stop_on_first_error,
    })
    .run(generator, executor, sink)
}

/// Run a result-producing executor over every variant produced by `generator`.
pub fn run_with_result<V, R, G, F, S>(
    generator: &G,
    executor: F,
    sink: &mut S,
    concurrency: usize,
    stop_on_first_error: bool,
) -> Result<Vec<Execution<V, R>>, EngineError>
where
    V: Variant,
    R: Send,
    G: Generator<V> + ?Sized,
    F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError> + Sync,
    S: OutputSink + ?Sized,
{
    Engine::new(RunOptions {
        concurrency,
        stop_on_first_error,
    })
    .run_with_result(generator, executor, sink)
}
