//! Configuration variants, single-variant transforms and combinatorial generators.

use std::fmt;

/// A configuration the engine can execute.
///
/// The base configuration handed to a [`Generator`] is `Self::default()`.
pub trait Variant: Default + Send {
    /// Whether the execution step should stream output as it runs
    fn live_output(&self) -> bool;

    /// Set by the scheduler before the execution step runs
    fn set_live_output(&mut self, enabled: bool);

    /// Whether captured output is replayed to the sink after the run.
    ///
    /// Independent of live-output mode. Defaults to enabled.
    fn log_output(&self) -> bool {
        true
    }
}

type Transform<T> = dyn Fn(T) -> T + Send + Sync;

/// A single-variant transform.
///
/// An empty configurator is the identity.
pub struct Configure<T> {
    transform: Option<Box<Transform<T>>>,
}

impl<T> Configure<T> {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self {
            transform: Some(Box::new(transform)),
        }
    }

    pub fn identity() -> Self {
        Self { transform: None }
    }

    pub fn is_identity(&self) -> bool {
        self.transform.is_none()
    }

    pub fn invoke(&self, value: T) -> T {
        match &self.transform {
            Some(transform) => transform(value),
            None => value,
        }
    }
}

impl<T> Default for Configure<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T> fmt::Debug for Configure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configure")
            .field("identity", &self.is_identity())
            .finish()
    }
}

/// Apply an optional configurator; an absent one leaves `value` untouched.
pub fn configure<T>(configurator: Option<&Configure<T>>, value: T) -> T {
    match configurator {
        Some(configurator) => configurator.invoke(value),
        None => value,
    }
}

/// Expands a base configuration into a finite sequence of variants.
pub trait Generator<T> {
    fn expand(&self, base: T) -> Vec<T>;
}

impl<T, F, I> Generator<T> for F
where
    F: Fn(T) -> I,
    I: IntoIterator<Item = T>,
{
    fn expand(&self, base: T) -> Vec<T> {
        self(base).into_iter().collect()
    }
}
