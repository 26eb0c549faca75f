//! The harness: counters, gating, assertions and reporting.

use crate::error::Error;
use crate::matching;
use crate::mode::{ExecutionMode, LocalRuntime, RuntimeProbe};
use crate::options::{HarnessOptions, Verbosity};
use crate::registry::AssertionRegistry;
use crate::subject::{Condition, Fallible, Failure, Subject, short_type_name};
use crate::trace_categories;
use serde_json::Value;
use std::io::{Stdout, Write};
use std::rc::Rc;

const DEFAULT_PASS_MESSAGE: &str = "condition passed";
const DEFAULT_FAIL_MESSAGE: &str = "condition failed";
const NO_ERROR_THROWN: &str = "No error thrown";
const ERROR_MATCHED: &str = "error thrown with expected type and message";
const EVALUATION_FAILED: &str = "unable to evaluate value";
const IS_2D_ARRAY: &str = "value is a 2D array";
const IS_NOT_2D_ARRAY: &str = "value is not a 2D array";
const ALL_PASSED: &str = "ALL TESTS ✔ PASSED";
const SOME_FAILED: &str = "❌ Some Tests FAILED";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Result of a single assertion call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The assertion held.
    Passed,
    /// The assertion did not hold.
    Failed,
    /// Evaluating the subject raised an error or panicked.
    Errored,
    /// The harness was inactive; nothing was evaluated or counted.
    Skipped,
}

impl Outcome {
    /// Returns whether the assertion held.
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns whether the assertion was counted as a failure.
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Errored)
    }
}

/// Tallies of assertions run since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Number of assertions evaluated.
    pub total: u64,
    /// Number of assertions that passed.
    pub passed: u64,
    /// Number of assertions that failed or errored.
    pub failed: u64,
}

/// Assertion and reporting engine shared by one test run.
///
/// A harness is *active* only while it is enabled and its execution mode
/// matches the ambient mode detected at construction. While inactive, every
/// assertion and report operation does nothing: thunks are not run, counters
/// do not move and nothing is written. A script can therefore declare local
/// and hosted assertion blocks side by side and have only the matching block
/// take effect.
pub struct Harness<W = Stdout> {
    enabled: bool,
    execution_mode: ExecutionMode,
    ambient_mode: ExecutionMode,
    verbosity: Verbosity,
    counters: Counters,
    writer: W,
    registry: AssertionRegistry<W>,
}

impl Harness<Stdout> {
    /// Creates a disabled harness writing to stdout, for a process that runs
    /// locally.
    pub fn new() -> Self {
        Self::with_probe(&LocalRuntime)
    }

    /// Creates a disabled harness writing to stdout, taking its ambient mode
    /// from `probe`.
    pub fn with_probe(probe: &impl RuntimeProbe) -> Self {
        Self::with_writer(std::io::stdout(), probe)
    }
}

impl Default for Harness<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Harness<W> {
    /// Creates a disabled harness writing to `writer`, taking its ambient mode
    /// from `probe`.
    pub fn with_writer(writer: W, probe: &impl RuntimeProbe) -> Self {
        let ambient_mode = probe.ambient_mode();
        tracing::debug!(
            target: trace_categories::CONFIG,
            "harness created; ambient mode: {ambient_mode}"
        );

        Self {
            enabled: false,
            execution_mode: ExecutionMode::default(),
            ambient_mode,
            verbosity: Verbosity::default(),
            counters: Counters::default(),
            writer,
            registry: AssertionRegistry::default(),
        }
    }

    /// Enables the harness.
    pub const fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disables the harness.
    pub const fn disable(&mut self) {
        self.enabled = false;
    }

    /// Returns whether the harness is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Declares which context the following assertions are written for.
    pub fn set_execution_mode(&mut self, hosted: bool) {
        self.set_mode(ExecutionMode::from_hosted(hosted));
    }

    /// Declares which context the following assertions are written for.
    pub fn set_mode(&mut self, mode: ExecutionMode) {
        tracing::debug!(target: trace_categories::CONFIG, "execution mode: {mode}");
        self.execution_mode = mode;
    }

    /// The context the current assertions are written for.
    pub const fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    /// The context the process is actually running in.
    pub const fn ambient_mode(&self) -> ExecutionMode {
        self.ambient_mode
    }

    /// Returns the current verbosity.
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Sets the verbosity.
    pub fn set_verbosity(&mut self, verbosity: impl Into<Verbosity>) {
        self.verbosity = verbosity.into();
        tracing::debug!(target: trace_categories::CONFIG, "verbosity: {}", self.verbosity);
    }

    /// Sets the verbosity from text. Non-numeric text is rejected with
    /// [`Error::TypeMismatch`] and the current verbosity is kept.
    pub fn set_verbosity_str(&mut self, verbosity: &str) -> Result<(), Error> {
        let parsed: Verbosity = verbosity.parse()?;
        self.set_verbosity(parsed);
        Ok(())
    }

    /// Applies a set of options. Counters are left untouched.
    pub fn apply_options(&mut self, options: &HarnessOptions) {
        self.enabled = options.enabled;
        self.set_mode(options.execution_mode);
        self.set_verbosity(options.verbosity);
    }

    /// Returns the current counters.
    pub const fn counters(&self) -> Counters {
        self.counters
    }

    /// Number of assertions evaluated.
    pub const fn total_tests(&self) -> u64 {
        self.counters.total
    }

    /// Number of assertions that passed.
    pub const fn passed_tests(&self) -> u64 {
        self.counters.passed
    }

    /// Number of assertions that failed.
    pub const fn failed_tests(&self) -> u64 {
        self.counters.failed
    }

    /// Zeroes all counters.
    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    /// Returns whether assertions currently take effect.
    pub fn is_active(&self) -> bool {
        self.enabled && self.execution_mode == self.ambient_mode
    }

    /// Returns the output sink.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Consumes the harness, returning its output sink.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Checks a condition.
    pub fn assert<'a>(
        &mut self,
        condition: impl Into<Condition<'a>>,
        message: Option<&str>,
    ) -> Outcome {
        if self.skip("assert") {
            return Outcome::Skipped;
        }

        let result = condition.into().evaluate();
        self.record(result, message, |passed| {
            String::from(if passed { DEFAULT_PASS_MESSAGE } else { DEFAULT_FAIL_MESSAGE })
        })
    }

    /// Checks that `value` is strictly equal to `expected`: operands of
    /// different kinds never compare equal.
    pub fn assert_equals<'a>(
        &mut self,
        value: impl Into<Subject<'a, Value>>,
        expected: impl Into<Value>,
        message: Option<&str>,
    ) -> Outcome {
        if self.skip("assert_equals") {
            return Outcome::Skipped;
        }

        let expected = expected.into();
        match value.into().evaluate() {
            Ok(value) => {
                let equal = matching::strict_equals(&value, &expected);
                self.record(Ok(equal), message, |passed| {
                    let op = if passed { "===" } else { "!=" };
                    format!(
                        "{} {op} {}",
                        matching::render_operand(&value),
                        matching::render_operand(&expected)
                    )
                })
            }
            Err(failure) => self.record(Err(failure), message, |_| String::from(EVALUATION_FAILED)),
        }
    }

    /// Checks that `thunk` fails with an error whose text matches the regular
    /// expression `pattern`.
    ///
    /// An invalid pattern is a contract violation and is returned as
    /// [`Error::InvalidPattern`] without counting a test.
    ///
    /// A panic in `thunk` counts as a thrown error. The process's panic hook
    /// still runs before the panic is caught, so the default hook's message
    /// reaches stderr rather than the harness's sink.
    pub fn catch_err(
        &mut self,
        thunk: impl Fallible,
        pattern: &str,
        message: Option<&str>,
    ) -> Result<Outcome, Error> {
        self.check_thrown(thunk, pattern, message, None)
    }

    /// Like [`catch_err`](Self::catch_err), but additionally requires the
    /// error to be of type `E`.
    pub fn catch_err_of<E: std::error::Error + 'static>(
        &mut self,
        thunk: impl Fallible,
        pattern: &str,
        message: Option<&str>,
    ) -> Result<Outcome, Error> {
        let expected = ExpectedType {
            name: short_type_name(std::any::type_name::<E>()),
            matches: Failure::is::<E>,
        };
        self.check_thrown(thunk, pattern, message, Some(&expected))
    }

    fn check_thrown(
        &mut self,
        thunk: impl Fallible,
        pattern: &str,
        message: Option<&str>,
        expected_type: Option<&ExpectedType>,
    ) -> Result<Outcome, Error> {
        if self.skip("catch_err") {
            return Ok(Outcome::Skipped);
        }

        let regex = regex::Regex::new(pattern)?;

        let Err(failure) = thunk.attempt() else {
            return Ok(self.assert(false, Some(NO_ERROR_THROWN)));
        };

        let type_match = expected_type.is_none_or(|expected| (expected.matches)(&failure));
        let actual_text = failure.to_string();
        let message_match = regex.is_match(&actual_text);

        tracing::debug!(
            target: trace_categories::ASSERTIONS,
            "caught '{actual_text}'; type match: {type_match}, message match: {message_match}"
        );

        let synthesized;
        let message = if let Some(message) = message {
            message
        } else {
            synthesized = matching::describe_error_mismatch(
                expected_type
                    .filter(|_| !type_match)
                    .map(|expected| (failure.type_name(), expected.name)),
                (!message_match).then_some((actual_text.as_str(), pattern)),
            )
            .unwrap_or_else(|| String::from(ERROR_MATCHED));
            synthesized.as_str()
        };

        Ok(self.assert(type_match && message_match, Some(message)))
    }

    /// Checks that `value` is an array whose first element is itself an array.
    /// Only the first element is inspected; an empty array fails.
    pub fn is_2d_array<'a>(
        &mut self,
        value: impl Into<Subject<'a, Value>>,
        message: Option<&str>,
    ) -> Outcome {
        if self.skip("is_2d_array") {
            return Outcome::Skipped;
        }

        match value.into().evaluate() {
            Ok(value) => {
                let is_2d = matching::is_2d_array(&value);
                let default = if is_2d { IS_2D_ARRAY } else { IS_NOT_2D_ARRAY };
                self.assert(is_2d, Some(message.unwrap_or(default)))
            }
            Err(failure) => self.record(Err(failure), message, |_| String::from(IS_NOT_2D_ARRAY)),
        }
    }

    /// Writes a bordered three-line header.
    pub fn print_header(&mut self, text: &str) {
        if self.skip("print_header") || !self.verbosity.is_detailed() {
            return;
        }

        let border = matching::header_border(text);
        self.emit(&border);
        self.emit(format_args!("* {text}"));
        self.emit(&border);
    }

    /// Writes a single-line sub-header.
    pub fn print_sub_header(&mut self, text: &str) {
        if self.skip("print_sub_header") || !self.verbosity.is_detailed() {
            return;
        }

        self.emit(format_args!("** {text}"));
    }

    /// Writes the run summary: a statistics line when detailed, then a verdict
    /// line regardless of verbosity.
    pub fn print_summary(&mut self) {
        if self.skip("print_summary") {
            return;
        }

        let Counters {
            total,
            passed,
            failed,
        } = self.counters;

        if self.verbosity.is_detailed() {
            self.emit(format_args!("TOTAL TESTS={total}, FAILED={failed}, PASSED={passed}"));
        }

        self.emit(if failed == 0 { ALL_PASSED } else { SOME_FAILED });
    }

    /// Clears a terminal attached to the output sink.
    pub fn clear_console(&mut self) {
        if self.skip("clear_console") {
            return;
        }

        if let Err(err) = write!(self.writer, "{CLEAR_SCREEN}") {
            tracing::warn!("failed to write harness output: {err}");
        }
    }

    /// Registers a named custom assertion, replacing any earlier one with the
    /// same name.
    pub fn register_assertion(
        &mut self,
        name: impl Into<String>,
        assertion: impl Fn(&mut Self, &[Value]) + 'static,
    ) {
        let name = name.into();
        tracing::debug!(target: trace_categories::REGISTRY, "registering assertion: {name}");

        if self.registry.insert(name, Rc::new(assertion)) {
            tracing::debug!(target: trace_categories::REGISTRY, "replaced an existing assertion");
        }
    }

    /// Runs the custom assertion registered under `name`.
    pub fn run_assertion(&mut self, name: &str, args: &[Value]) -> Result<(), Error> {
        let assertion = self
            .registry
            .get(name)
            .ok_or_else(|| Error::UnknownAssertion(name.to_owned()))?;

        tracing::debug!(target: trace_categories::REGISTRY, "running assertion: {name}");
        assertion(self, args);
        Ok(())
    }

    /// Returns whether a custom assertion is registered under `name`.
    pub fn has_assertion(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Names of all registered custom assertions, sorted.
    pub fn assertion_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Returns true (and traces) if `operation` must be skipped.
    fn skip(&self, operation: &str) -> bool {
        if self.is_active() {
            return false;
        }

        tracing::trace!(
            target: trace_categories::GATING,
            "skipping {operation}: enabled={}, execution mode={}, ambient mode={}",
            self.enabled,
            self.execution_mode,
            self.ambient_mode
        );
        true
    }

    /// Counts one evaluated assertion and writes its line. `describe` produces
    /// the default message, given whether the assertion passed.
    fn record(
        &mut self,
        result: Result<bool, Failure>,
        message: Option<&str>,
        describe: impl FnOnce(bool) -> String,
    ) -> Outcome {
        let passed = matches!(result, Ok(true));
        let message = message.map_or_else(|| describe(passed), str::to_owned);

        self.counters.total = self.counters.total.saturating_add(1);
        let outcome = match result {
            Ok(true) => {
                self.counters.passed = self.counters.passed.saturating_add(1);
                self.emit_detail(format_args!("✔ PASSED: {message}"));
                Outcome::Passed
            }
            Ok(false) => {
                self.counters.failed = self.counters.failed.saturating_add(1);
                self.emit_detail(format_args!("❌ FAILED: {message}"));
                Outcome::Failed
            }
            Err(failure) => {
                self.counters.failed = self.counters.failed.saturating_add(1);
                self.emit_detail(format_args!("❌ ERROR: {message} ({failure})"));
                Outcome::Errored
            }
        };

        tracing::debug!(
            target: trace_categories::ASSERTIONS,
            "{outcome:?}: {message}; {:?}",
            self.counters
        );
        outcome
    }

    fn emit_detail(&mut self, line: impl std::fmt::Display) {
        if self.verbosity.is_detailed() {
            self.emit(line);
        }
    }

    fn emit(&mut self, line: impl std::fmt::Display) {
        if let Err(err) = writeln!(self.writer, "{line}") {
            tracing::warn!("failed to write harness output: {err}");
        }
    }
}

/// An error type a thrown error must match.
struct ExpectedType {
    name: &'static str,
    matches: fn(&Failure) -> bool,
}
