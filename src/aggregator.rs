//! Error aggregation over a finished run.

use crate::error::{CompositeFailure, VariantFailure};
use crate::outcome::{Execution, Outcome};
use tracing::debug;

/// Turn the outcomes of a run into executions, or a composite failure holding
/// every variant that failed.
pub fn check<V, R>(outcomes: Vec<Outcome<V, R>>) -> Result<Vec<Execution<V, R>>, CompositeFailure> {
    let total = outcomes.len();
    let mut executions = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for outcome in outcomes {
        let (index, variant, result, output) = outcome.into_parts();
        match result {
            Ok(result) => executions.push(Execution {
                variant,
                result,
                output,
            }),
            Err(error) => failures.push(VariantFailure { index, error }),
        }
    }

    if failures.is_empty() {
        Ok(executions)
    } else {
        failures.sort_by_key(|f| f.index);
        debug!(total, failed = failures.len(), "Run finished with failures");
        Err(CompositeFailure { total, failures })
    }
}
