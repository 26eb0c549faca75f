//! Configuration types for the harness.

use crate::error::Error;
use crate::mode::ExecutionMode;
use serde::Deserialize;
use std::str::FromStr;

/// Level of detail for emitted diagnostics.
///
/// At `1` or above, every assertion writes a line and summaries include a
/// statistics line. Below `1`, only the final pass/fail verdict is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Verbosity(pub i64);

impl Verbosity {
    /// Summary-only output.
    pub const SILENT: Self = Self(0);
    /// Per-assertion output.
    pub const DETAILED: Self = Self(1);

    /// Returns whether per-assertion lines should be written.
    pub const fn is_detailed(self) -> bool {
        self.0 >= 1
    }

    fn from_yaml(value: &serde_yaml::Value) -> Result<Self, Error> {
        match value {
            serde_yaml::Value::Number(n) => {
                if let Some(level) = n.as_i64() {
                    Ok(Self(level))
                } else {
                    n.to_string().parse()
                }
            }
            serde_yaml::Value::String(s) => s.parse(),
            other => Err(Error::TypeMismatch {
                expected: "a numeric verbosity",
                found: serde_yaml::to_string(other)
                    .map_or_else(|_| String::from("?"), |s| s.trim_end().to_owned()),
            }),
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::DETAILED
    }
}

impl From<i64> for Verbosity {
    fn from(level: i64) -> Self {
        Self(level)
    }
}

impl From<i32> for Verbosity {
    fn from(level: i32) -> Self {
        Self(i64::from(level))
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Verbosity {
    type Err = Error;

    /// Parses a verbosity level. Fractional levels are truncated toward zero, so
    /// `0.5` is summary-only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(level) = trimmed.parse::<i64>() {
            return Ok(Self(level));
        }

        match trimmed.parse::<f64>() {
            Ok(level) if level.is_finite() => {
                #[expect(clippy::cast_possible_truncation)]
                let truncated = level.trunc() as i64;
                Ok(Self(truncated))
            }
            _ => Err(Error::TypeMismatch {
                expected: "a numeric verbosity",
                found: s.to_owned(),
            }),
        }
    }
}

/// Options applied to a harness as a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HarnessOptions {
    /// Whether assertions run at all.
    pub enabled: bool,
    /// The mode the following assertions are written for.
    pub execution_mode: ExecutionMode,
    /// Diagnostic detail level.
    pub verbosity: Verbosity,
}

/// On-disk shape of [`HarnessOptions`]; verbosity is kept loosely typed so a
/// non-numeric value can be reported as a type mismatch.
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawOptions {
    enabled: Option<bool>,
    execution_mode: Option<ExecutionMode>,
    hosted: Option<bool>,
    verbosity: Option<serde_yaml::Value>,
}

impl HarnessOptions {
    /// Parses options from YAML text. All keys are optional:
    ///
    /// ```yaml
    /// enabled: true
    /// execution_mode: hosted   # or `hosted: true`
    /// verbosity: 0
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self, Error> {
        let raw: RawOptions = if text.trim().is_empty() {
            RawOptions::default()
        } else {
            serde_yaml::from_str(text)?
        };

        let execution_mode = match (raw.execution_mode, raw.hosted) {
            (Some(mode), Some(hosted)) if mode.is_hosted() != hosted => {
                return Err(Error::InvalidOptions(format!(
                    "execution_mode '{mode}' conflicts with hosted: {hosted}"
                )));
            }
            (Some(mode), _) => mode,
            (None, Some(hosted)) => ExecutionMode::from_hosted(hosted),
            (None, None) => ExecutionMode::default(),
        };

        let verbosity = raw
            .verbosity
            .as_ref()
            .map(Verbosity::from_yaml)
            .transpose()?
            .unwrap_or_default();

        let options = Self {
            enabled: raw.enabled.unwrap_or_default(),
            execution_mode,
            verbosity,
        };

        tracing::debug!(target: crate::trace_categories::CONFIG, "loaded options: {options:?}");

        Ok(options)
    }

    /// Sets whether the harness is enabled.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the execution mode.
    #[must_use]
    pub const fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Sets the verbosity.
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}
