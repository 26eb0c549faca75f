//! Eager values and lazily evaluated thunks under test.

use crate::error::BoxError;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// An error or panic captured while evaluating code under test.
pub struct Failure {
    type_name: &'static str,
    message: String,
    error: Option<BoxError>,
}

impl Failure {
    /// Captures a typed error.
    pub fn from_error<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<E>()),
            message: err.to_string(),
            error: Some(Box::new(err)),
        }
    }

    /// Captures an already-boxed error, whose concrete type name is no longer known.
    pub fn from_boxed(err: BoxError) -> Self {
        Self {
            type_name: "Error",
            message: err.to_string(),
            error: Some(err),
        }
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("unknown panic payload")
        };

        Self {
            type_name: "panic",
            message,
            error: None,
        }
    }

    /// Short name of the captured error's type (`"panic"` for panics).
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The captured error's message.
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns whether the captured error is of type `E`.
    pub fn is<E: std::error::Error + 'static>(&self) -> bool {
        self.error
            .as_ref()
            .is_some_and(|err| err.downcast_ref::<E>().is_some())
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

impl std::fmt::Debug for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Failure")
            .field("type_name", &self.type_name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Input to an assertion: either a value computed by the caller, or a thunk the
/// harness evaluates only if the assertion is active.
pub enum Subject<'a, T> {
    /// An eagerly computed value.
    Value(T),
    /// A deferred computation.
    Thunk(Box<dyn FnOnce() -> Result<T, Failure> + 'a>),
}

/// A boolean subject, as taken by [`Harness::assert`](crate::Harness::assert).
pub type Condition<'a> = Subject<'a, bool>;

impl<'a, T> Subject<'a, T> {
    /// Wraps a fallible thunk. An `Err` it returns is recorded as a test failure.
    pub fn thunk<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + 'a,
        E: Into<BoxError>,
    {
        Self::Thunk(Box::new(move || f().map_err(|err| Failure::from_boxed(err.into()))))
    }

    /// Wraps a thunk that only fails by panicking.
    ///
    /// A panic is recorded as a failure, but the process's panic hook still
    /// runs first; with the default hook that prints a "panicked at" line to
    /// stderr, outside the harness's output sink.
    pub fn infallible<F>(f: F) -> Self
    where
        F: FnOnce() -> T + 'a,
    {
        Self::Thunk(Box::new(move || Ok(f())))
    }

    /// Returns whether this subject is deferred.
    pub const fn is_thunk(&self) -> bool {
        matches!(self, Self::Thunk(_))
    }

    /// Produces the subject's value, running the thunk if there is one.
    pub fn evaluate(self) -> Result<T, Failure> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Thunk(f) => guarded(f),
        }
    }
}

impl<T> From<T> for Subject<'_, T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl Default for Condition<'_> {
    /// A vacuous condition, which passes.
    fn default() -> Self {
        Self::Value(true)
    }
}

/// A thunk expected to fail, as taken by
/// [`Harness::catch_err`](crate::Harness::catch_err). Its success value is
/// discarded.
///
/// Implemented for closures returning a concrete error type. Wrap closures
/// returning [`BoxError`] (or anything convertible into it, such as
/// `anyhow::Error`) in [`Boxed`].
pub trait Fallible {
    /// Runs the thunk, capturing a returned error or a panic.
    fn attempt(self) -> Result<(), Failure>;
}

impl<F, T, X> Fallible for F
where
    F: FnOnce() -> Result<T, X>,
    X: std::error::Error + Send + Sync + 'static,
{
    fn attempt(self) -> Result<(), Failure> {
        guarded(move || self().map(|_| ()).map_err(Failure::from_error))
    }
}

/// Adapter for thunks whose error is already type-erased.
///
/// The captured failure reports its type as `Error`, but
/// [`Failure::is`] still sees the concrete type inside a [`BoxError`].
pub struct Boxed<F>(pub F);

impl<F, T, E> Fallible for Boxed<F>
where
    F: FnOnce() -> Result<T, E>,
    E: Into<BoxError>,
{
    fn attempt(self) -> Result<(), Failure> {
        let Self(f) = self;
        guarded(move || f().map(|_| ()).map_err(|err| Failure::from_boxed(err.into())))
    }
}

/// Runs `f` to completion, converting a panic into a [`Failure`].
fn guarded<T>(f: impl FnOnce() -> Result<T, Failure>) -> Result<T, Failure> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Failure::from_panic(payload.as_ref())),
    }
}

/// Reduces a fully qualified type name to its last path segment, dropping any
/// generic arguments.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[derive(Debug, thiserror::Error)]
    #[error("bad input")]
    struct BadInput;

    #[test]
    fn short_type_names() {
        assert_eq!(short_type_name("core::num::error::ParseIntError"), "ParseIntError");
        assert_eq!(short_type_name("alloc::boxed::Box<dyn core::error::Error>"), "Box");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn values_evaluate_to_themselves() {
        let subject: Subject<'_, i32> = 5.into();
        assert!(!subject.is_thunk());
        assert_eq!(subject.evaluate().ok(), Some(5));
    }

    #[test]
    fn thunks_run_only_on_evaluation() {
        let runs = Cell::new(0);
        let subject = Subject::infallible(|| {
            runs.set(runs.get() + 1);
            7
        });

        assert!(subject.is_thunk());
        assert_eq!(runs.get(), 0);
        assert_eq!(subject.evaluate().ok(), Some(7));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn thunk_errors_become_failures() {
        let subject: Subject<'_, i32> = Subject::thunk(|| "x".parse::<i32>());
        let failure = subject.evaluate().unwrap_err();
        assert_eq!(failure.type_name(), "Error");
        assert_eq!(failure.message(), "invalid digit found in string");
    }

    #[test]
    fn panics_become_failures() {
        let subject: Subject<'_, bool> = Subject::infallible(|| -> bool { panic!("boom") });
        let failure = subject.evaluate().unwrap_err();
        assert_eq!(failure.to_string(), "panic: boom");
        assert!(!failure.is::<BadInput>());
    }

    #[test]
    fn fallible_thunks_keep_error_type() {
        let failure = (|| Err::<(), _>(BadInput)).attempt().unwrap_err();
        assert_eq!(failure.to_string(), "BadInput: bad input");
        assert!(failure.is::<BadInput>());
        assert!(!failure.is::<std::fmt::Error>());

        assert!((|| "12".parse::<u8>()).attempt().is_ok());
    }

    #[test]
    fn boxed_thunks_keep_downcastable_errors() {
        let failure = Boxed(|| Err::<(), BoxError>(Box::new(BadInput))).attempt().unwrap_err();
        assert_eq!(failure.to_string(), "Error: bad input");
        assert!(failure.is::<BadInput>());

        let failure = Boxed(|| Err::<u8, _>("missing key")).attempt().unwrap_err();
        assert_eq!(failure.message(), "missing key");

        assert!(Boxed(|| Ok::<_, BoxError>(1)).attempt().is_ok());
    }

    #[test]
    fn default_condition_is_vacuously_true() {
        assert_eq!(Condition::default().evaluate().ok(), Some(true));
    }
}
