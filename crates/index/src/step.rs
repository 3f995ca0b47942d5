use crate::error::{Error, Result};

/// Outcome of a pipeline step.
///
/// `Degraded` carries a usable value produced after one or more recoverable
/// failures (already recorded in the [`IndexLog`](crate::IndexLog)); `Fatal`
/// aborts the submission.
#[derive(Debug)]
pub enum Step<T> {
    Done(T),
    Degraded(T),
    Fatal(Error),
}

impl<T> Step<T> {
    /// `Done` when no recoverable failures were logged, `Degraded` otherwise.
    pub fn from_failures(value: T, failures: usize) -> Self {
        match failures {
            0 => Step::Done(value),
            _ => Step::Degraded(value),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Step::Degraded(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Step<U> {
        match self {
            Step::Done(v) => Step::Done(f(v)),
            Step::Degraded(v) => Step::Degraded(f(v)),
            Step::Fatal(e) => Step::Fatal(e),
        }
    }

    /// Collapses the step, keeping degraded values.
    pub fn into_result(self) -> Result<T> {
        match self {
            Step::Done(v) | Step::Degraded(v) => Ok(v),
            Step::Fatal(e) => Err(e),
        }
    }
}
