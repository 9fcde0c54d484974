//! Outcome collector
//!
//! Append-only accumulator shared by every worker of a run.

use crate::outcome::Outcome;
use parking_lot::Mutex;

pub struct OutcomeCollector<V, R> {
    records: Mutex<Vec<Outcome<V, R>>>,
}

impl<V, R> OutcomeCollector<V, R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn add(&self, record: Outcome<V, R>) {
        self.records.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Number of records holding a failure
    pub fn failed(&self) -> usize {
        self.records.lock().iter().filter(|r| r.is_failure()).count()
    }

    /// Run `f` over a consistent view of the records collected so far.
    ///
    /// The lock is held for the duration of `f`; do not call back into the
    /// collector from it.
    pub fn with_records<T>(&self, f: impl FnOnce(&[Outcome<V, R>]) -> T) -> T {
        let records = self.records.lock();
        f(&records)
    }

    /// Consume the collector, returning records in generator order
    pub fn into_outcomes(self) -> Vec<Outcome<V, R>> {
        let mut records = self.records.into_inner();
        records.sort_by_key(Outcome::index);
        records
    }
}

impl<V, R> Default for OutcomeCollector<V, R> {
    fn default() -> Self {
        Self::new()
    }
}
