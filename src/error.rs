//! Error types for the variant execution engine.

use crate::output::OutputLine;
use std::fmt;
use thiserror::Error;

/// Failure of a single variant's execution step
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A process-like step failed after emitting some output
    #[error("{message}")]
    Process {
        exit_code: Option<i32>,
        message: String,
        output: Vec<OutputLine>,
    },

    #[error("{0}")]
    Failed(String),

    #[error("Execution step panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExecutionError {
    pub fn failed(message: impl Into<String>) -> Self {
        ExecutionError::Failed(message.into())
    }

    pub fn process(
        exit_code: Option<i32>,
        message: impl Into<String>,
        output: Vec<OutputLine>,
    ) -> Self {
        ExecutionError::Process {
            exit_code,
            message: message.into(),
            output,
        }
    }

    /// Output the step managed to emit before failing, if it carries any
    pub fn partial_output(&self) -> Option<&[OutputLine]> {
        match self {
            ExecutionError::Process { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// A failed variant, identified by its position in the generated sequence
#[derive(Debug)]
pub struct VariantFailure {
    pub index: usize,
    pub error: ExecutionError,
}

/// Every failure of one run
#[derive(Debug, Error)]
pub struct CompositeFailure {
    /// Number of variants that were started
    pub total: usize,
    pub failures: Vec<VariantFailure>,
}

impl CompositeFailure {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }

    pub fn first(&self) -> Option<&VariantFailure> {
        self.failures.first()
    }
}

impl fmt::Display for CompositeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} variant(s) failed",
            self.failures.len(),
            self.total
        )?;
        for failure in &self.failures {
            write!(f, "\n  variant #{}: {}", failure.index, failure.error)?;
        }
        Ok(())
    }
}

/// Engine-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Failed(#[from] CompositeFailure),

    #[error("Invalid concurrency: {0} (must be at least 1)")]
    InvalidConcurrency(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EngineError {
    /// The composite failure, when the run itself failed
    pub fn as_composite(&self) -> Option<&CompositeFailure> {
        match self {
            EngineError::Failed(composite) => Some(composite),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}
