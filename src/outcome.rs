//! Per-variant outcome records.

use crate::error::ExecutionError;
use crate::output::OutputLine;

/// The record of one started variant.
///
/// Created once by the scheduler and read-only afterwards. For a failed
/// variant `output` holds the failure's partial output, or nothing.
#[derive(Debug)]
pub struct Outcome<V, R> {
    index: usize,
    variant: V,
    result: Result<R, ExecutionError>,
    output: Vec<OutputLine>,
}

impl<V, R> Outcome<V, R> {
    pub fn succeeded(index: usize, variant: V, result: R, output: Vec<OutputLine>) -> Self {
        Self {
            index,
            variant,
            result: Ok(result),
            output,
        }
    }

    pub fn failed(index: usize, variant: V, error: ExecutionError) -> Self {
        let output = error
            .partial_output()
            .map(<[OutputLine]>::to_vec)
            .unwrap_or_default();
        Self {
            index,
            variant,
            result: Err(error),
            output,
        }
    }

    /// Position of the variant in the generated sequence
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn variant(&self) -> &V {
        &self.variant
    }

    pub fn result(&self) -> Result<&R, &ExecutionError> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&ExecutionError> {
        self.result.as_ref().err()
    }

    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }

    pub fn output(&self) -> &[OutputLine] {
        &self.output
    }

    pub fn into_parts(self) -> (usize, V, Result<R, ExecutionError>, Vec<OutputLine>) {
        (self.index, self.variant, self.result, self.output)
    }
}

/// A successfully executed variant, as returned to the caller of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Execution<V, R = ()> {
    pub variant: V,
    pub result: R,
    pub output: Vec<OutputLine>,
}

impl<V> Execution<V, ()> {
    pub fn new(variant: V, output: Vec<OutputLine>) -> Self {
        Self {
            variant,
            result: (),
            output,
        }
    }
}
