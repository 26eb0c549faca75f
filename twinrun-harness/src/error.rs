//! Error types for the harness.

/// Boxed error type returned by fallible thunks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Contract violations raised by the harness's own API.
///
/// Failures of the code under test are never reported through this type; they
/// are recorded as test outcomes instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A configuration value had the wrong type.
    #[error("type mismatch: expected {expected}, found '{found}'")]
    TypeMismatch {
        /// Description of the expected type.
        expected: &'static str,
        /// The offending value, as text.
        found: String,
    },

    /// An expected-error pattern could not be compiled.
    #[error("invalid error pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// No custom assertion is registered under the given name.
    #[error("no assertion registered with name: {0}")]
    UnknownAssertion(String),

    /// Harness options could not be parsed.
    #[error("invalid harness options: {0}")]
    InvalidOptions(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidOptions(err.to_string())
    }
}
