//! Execution and ambient modes.

use serde::{Deserialize, Serialize};

/// The context a block of assertions is meant for, or the context the process
/// is actually running in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Running on a developer machine.
    #[default]
    Local,
    /// Running inside the hosted runtime.
    Hosted,
}

impl ExecutionMode {
    /// Returns the mode matching the given "is hosted" flag.
    pub const fn from_hosted(hosted: bool) -> Self {
        if hosted { Self::Hosted } else { Self::Local }
    }

    /// Returns whether this is the hosted mode.
    pub const fn is_hosted(self) -> bool {
        matches!(self, Self::Hosted)
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Hosted => write!(f, "hosted"),
        }
    }
}

/// Answers whether the current process is running in the hosted runtime.
///
/// A harness consults its probe once, at construction; the answer becomes the
/// harness's fixed ambient mode.
pub trait RuntimeProbe {
    /// Returns true if the process is executing in the hosted runtime.
    fn is_hosted(&self) -> bool;

    /// Returns the ambient mode reported by this probe.
    fn ambient_mode(&self) -> ExecutionMode {
        ExecutionMode::from_hosted(self.is_hosted())
    }
}

/// Probe for processes that always run locally.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalRuntime;

impl RuntimeProbe for LocalRuntime {
    fn is_hosted(&self) -> bool {
        false
    }
}

impl RuntimeProbe for ExecutionMode {
    fn is_hosted(&self) -> bool {
        Self::is_hosted(*self)
    }
}

impl<F: Fn() -> bool> RuntimeProbe for F {
    fn is_hosted(&self) -> bool {
        self()
    }
}
