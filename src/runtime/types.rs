// ABOUTME: Runtime type definitions for Docker and Podman CLIs.
// ABOUTME: Includes RuntimeType enum, RuntimeConfig override, and RuntimeInfo.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Runtime used when nothing is configured or detected.
pub const DEFAULT_RUNTIME: RuntimeType = RuntimeType::Docker;

/// The container runtime CLI flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl RuntimeType {
    /// Executable name looked up on `PATH`.
    pub fn binary_name(&self) -> &'static str {
        match self {
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary_name())
    }
}

impl FromStr for RuntimeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docker" => Ok(RuntimeType::Docker),
            "podman" => Ok(RuntimeType::Podman),
            other => Err(format!("unknown runtime: {other} (expected docker or podman)")),
        }
    }
}

/// Resolved runtime: which flavour, and which executable to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub runtime_type: RuntimeType,
    /// Executable name or path passed to the executor.
    pub binary: String,
}

/// Explicit runtime override from configuration or flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Explicit runtime type (overrides detection).
    #[serde(default)]
    pub runtime: Option<RuntimeType>,
    /// Explicit executable (overrides the runtime's default name).
    #[serde(default)]
    pub binary: Option<String>,
}
