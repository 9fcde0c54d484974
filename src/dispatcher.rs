//! Output Dispatcher
//!
//! Replays captured output to a sink once all work of a run has settled. For a
//! failed variant the replayed lines are the failure's partial output.

use crate::collector::OutcomeCollector;
use crate::outcome::Outcome;
use crate::output::OutputSink;
use crate::variant::Variant;
use tracing::debug;

pub struct OutputDispatcher;

impl OutputDispatcher {
    /// Emit the output of every record whose variant has logging enabled.
    ///
    /// Variants are visited in generator order and each variant's lines keep
    /// their original order. Returns the number of lines emitted.
    pub fn flush<V, R, S>(records: &[Outcome<V, R>], sink: &mut S) -> usize
    where
        V: Variant,
        S: OutputSink + ?Sized,
    {
        let mut eligible: Vec<&Outcome<V, R>> = records
            .iter()
            .filter(|record| record.variant().log_output())
            .collect();
        eligible.sort_by_key(|record| record.index());

        let mut emitted = 0;
        for record in eligible {
            for line in record.output() {
                sink.emit(line.kind, &line.text);
                emitted += 1;
            }
        }
        emitted
    }
}

/// Flushes a collector's output exactly once, on release or on drop.
///
/// Created before scheduling starts, so output already collected is
/// delivered even if the run unwinds.
pub struct DispatchGuard<'a, V, R, S>
where
    V: Variant,
    S: OutputSink + ?Sized,
{
    collector: &'a OutcomeCollector<V, R>,
    sink: &'a mut S,
    flushed: bool,
}

impl<'a, V, R, S> DispatchGuard<'a, V, R, S>
where
    V: Variant,
    S: OutputSink + ?Sized,
{
    pub fn new(collector: &'a OutcomeCollector<V, R>, sink: &'a mut S) -> Self {
        Self {
            collector,
            sink,
            flushed: false,
        }
    }

    /// Flush now and give up the guard. Returns the number of lines emitted.
    pub fn release(mut self) -> usize {
        self.flush()
    }

    fn flush(&mut self) -> usize {
        if self.flushed {
            return 0;
        }
        // Marked first: a panicking sink must not be flushed again from drop.
        self.flushed = true;
        let sink = &mut *self.sink;
        let emitted = self
            .collector
            .with_records(|records| OutputDispatcher::flush(records, sink));
        debug!(lines = emitted, "Dispatched captured output");
        emitted
    }
}

impl<V, R, S> Drop for DispatchGuard<'_, V, R, S>
where
    V: Variant,
    S: OutputSink + ?Sized,
{
    fn drop(&mut self) {
        self.flush();
    }
}
