//! Embeddable assertion harness for scripts that run in two contexts.
//!
//! A script written against this crate declares blocks of assertions for a
//! *local* context and for a *hosted* context, and runs unchanged in both. The
//! [`Harness`] compares the mode each block declares against the ambient mode
//! it detected at construction, and only the matching blocks take effect.
//!
//! # Outcomes and errors
//!
//! Failures of the code under test (false conditions, unequal values, errors
//! and panics raised by thunks, mismatched expected errors) are *recorded*:
//! they bump the failure counter and produce a diagnostic line, and the run
//! continues. Misuse of the harness itself, such as a non-numeric verbosity
//! or an invalid error pattern, is returned to the caller as an [`Error`].
//!
//! # Verbosity
//!
//! At verbosity 1 or above every assertion writes a line and the summary
//! includes a statistics line. Below 1, only the summary's verdict line is
//! written.

mod error;
mod harness;
mod matching;
mod mode;
mod options;
mod registry;
mod subject;
mod trace_categories;

pub use error::{BoxError, Error};
pub use harness::{Counters, Harness, Outcome};
pub use mode::{ExecutionMode, LocalRuntime, RuntimeProbe};
pub use options::{HarnessOptions, Verbosity};
pub use registry::CustomAssertion;
pub use subject::{Boxed, Condition, Fallible, Failure, Subject};

/// Re-exported so callers can build operands without depending on `serde_json`.
pub use serde_json::{Value, json};
