//! Trace utilities

/// Trace category for assertion evaluation.
pub const ASSERTIONS: &str = "assertions";
/// Trace category for configuration changes.
pub const CONFIG: &str = "config";
/// Trace category for calls skipped by gating.
pub const GATING: &str = "gating";
/// Trace category for the custom assertion registry.
pub const REGISTRY: &str = "registry";
