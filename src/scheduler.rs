//! Variant Scheduler
//!
//! Dispatches variants to an execution step, one at a time or across a bounded
//! pool of scoped worker threads, and records exactly one outcome per started
//! variant.
//!
//! Under [`ErrorPolicy::StopOnFirstError`] a failure raises a shared stop flag
//! before its record is added. Workers check the flag before taking the next
//! variant, so nothing new is started, while variants already in flight run
//! to completion and are recorded.

use crate::collector::OutcomeCollector;
use crate::error::ExecutionError;
use crate::outcome::Outcome;
use crate::output::OutputLine;
use crate::variant::Variant;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, warn};

/// What to do with the remaining variants once one has failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Start no new variant after the first failure
    StopOnFirstError,
    /// Run every variant regardless of failures
    CollectAll,
}

impl ErrorPolicy {
    pub fn from_stop_on_first_error(stop_on_first_error: bool) -> Self {
        if stop_on_first_error {
            ErrorPolicy::StopOnFirstError
        } else {
            ErrorPolicy::CollectAll
        }
    }

    pub fn stops_on_error(self) -> bool {
        self == ErrorPolicy::StopOnFirstError
    }
}

impl From<bool> for ErrorPolicy {
    fn from(stop_on_first_error: bool) -> Self {
        Self::from_stop_on_first_error(stop_on_first_error)
    }
}

/// Dispatches variants under a concurrency limit.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    concurrency: usize,
    policy: ErrorPolicy,
}

impl Scheduler {
    /// `concurrency` is clamped to at least one worker.
    pub fn new(concurrency: usize, policy: ErrorPolicy) -> Self {
        Self {
            concurrency: concurrency.max(1),
            policy,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Sequential mode streams output live; parallel mode buffers it.
    pub fn is_sequential(&self) -> bool {
        self.concurrency == 1
    }

    /// Schedule into a fresh collector and return the records in generator order.
    pub fn run<V, R, F>(&self, variants: Vec<V>, execute: &F) -> Vec<Outcome<V, R>>
    where
        V: Variant,
        R: Send,
        F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError> + Sync,
    {
        let collector = OutcomeCollector::with_capacity(variants.len());
        self.schedule(variants, execute, &collector);
        collector.into_outcomes()
    }

    /// Run every variant through `execute`, adding one record per started
    /// variant to `collector`. Blocks until all started work has finished.
    pub fn schedule<V, R, F>(&self, variants: Vec<V>, execute: &F, collector: &OutcomeCollector<V, R>)
    where
        V: Variant,
        R: Send,
        F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError> + Sync,
    {
        if self.is_sequential() {
            self.schedule_sequential(variants, execute, collector);
        } else {
            self.schedule_parallel(variants, execute, collector);
        }
    }

    fn schedule_sequential<V, R, F>(
        &self,
        variants: Vec<V>,
        execute: &F,
        collector: &OutcomeCollector<V, R>,
    ) where
        V: Variant,
        F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError>,
    {
        let total = variants.len();
        for (index, mut variant) in variants.into_iter().enumerate() {
            variant.set_live_output(true);
            let record = run_one(index, variant, execute);
            let failed = record.is_failure();
            collector.add(record);

            if failed && self.policy.stops_on_error() {
                warn!(
                    started = index + 1,
                    skipped = total - index - 1,
                    "Variant failed, stopping dispatch"
                );
                break;
            }
        }
    }

    fn schedule_parallel<V, R, F>(
        &self,
        variants: Vec<V>,
        execute: &F,
        collector: &OutcomeCollector<V, R>,
    ) where
        V: Variant,
        R: Send,
        F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError> + Sync,
    {
        let total = variants.len();
        let workers = self.concurrency.min(total);
        let pending = Mutex::new(variants.into_iter().enumerate());
        let stop = AtomicBool::new(false);
        let policy = self.policy;

        thread::scope(|scope| {
            for worker in 0..workers {
                let pending = &pending;
                let stop = &stop;
                scope.spawn(move || loop {
                    if stop.load(Ordering::Acquire) {
                        break;
                    }
                    // The guard is released before the step runs. The flag is
                    // read again under the lock so a failure raised while this
                    // worker waited stops it from taking another variant.
                    let next = {
                        let mut pending = pending.lock();
                        if stop.load(Ordering::Acquire) {
                            None
                        } else {
                            pending.next()
                        }
                    };
                    let Some((index, mut variant)) = next else {
                        break;
                    };

                    debug!(worker, index, "Dispatching variant");
                    variant.set_live_output(false);
                    let record = run_one(index, variant, execute);

                    if record.is_failure()
                        && policy.stops_on_error()
                        && !stop.swap(true, Ordering::AcqRel)
                    {
                        warn!(index, "Variant failed, no further variants will be started");
                    }
                    collector.add(record);
                });
            }
        });

        if stop.load(Ordering::Acquire) {
            let started = collector.len();
            debug!(
                started,
                skipped = total.saturating_sub(started),
                "Dispatch stopped after failure"
            );
        }
    }
}

/// Execute one variant and turn the result, error or panic into its record.
fn run_one<V, R, F>(index: usize, variant: V, execute: &F) -> Outcome<V, R>
where
    F: Fn(&V) -> Result<(R, Vec<OutputLine>), ExecutionError>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| execute(&variant)))
        .unwrap_or_else(|payload| Err(ExecutionError::Panicked(panic_message(payload))));

    match result {
        Ok((result, output)) => Outcome::succeeded(index, variant, result, output),
        Err(error) => {
            warn!(index, error = %error, "Variant failed");
            Outcome::failed(index, variant, error)
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
