// ABOUTME: Runtime CLI client that turns operations into argument vectors.
// ABOUTME: Every invocation goes through the injected Executor; no state is shared between calls.

use super::error::{CommandSnafu, InspectSnafu, OciError};
use super::types::{DEFAULT_RUNTIME, RuntimeInfo};
use crate::exec::{ContainerExecutor, Executor, LocalExecutor, combined_output_lines};
use snafu::ResultExt;
use std::sync::Arc;

/// Handle on a docker-compatible runtime CLI.
///
/// Holds only the executable name and the executor used to run it, so it is
/// cheap to clone and safe to share between concurrent callers.
#[derive(Clone)]
pub struct CliRuntime {
    binary: String,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for CliRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliRuntime")
            .field("binary", &self.binary)
            .finish()
    }
}

impl Default for CliRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME.binary_name(), Arc::new(LocalExecutor))
    }
}

impl CliRuntime {
    pub fn new(binary: impl Into<String>, executor: Arc<dyn Executor>) -> Self {
        Self {
            binary: binary.into(),
            executor,
        }
    }

    /// Runtime on the local host for a detected or configured runtime.
    pub fn local(info: &RuntimeInfo) -> Self {
        Self::new(info.binary.clone(), Arc::new(LocalExecutor))
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn executor(&self) -> Arc<dyn Executor> {
        Arc::clone(&self.executor)
    }

    /// Executor that runs commands inside `container` through this runtime.
    pub fn container_executor(&self, container: &str) -> ContainerExecutor {
        ContainerExecutor::new(self.binary.clone(), container, self.executor())
    }

    /// Run the runtime with `args`, returning combined output lines.
    pub(crate) async fn output_lines(
        &self,
        args: Vec<String>,
    ) -> Result<Vec<String>, crate::exec::ExecError> {
        let cmd = self.executor.command(&self.binary, args);
        combined_output_lines(cmd).await
    }

    /// Low-level information on a container (or any object) via a Go template.
    ///
    /// On failure the partial output is kept in the error; treat it as unreliable.
    pub async fn inspect(&self, target: &str, format: &str) -> Result<Vec<String>, OciError> {
        let args = strings(["inspect", "-f", format, target]);
        self.output_lines(args)
            .await
            .context(InspectSnafu { target })
    }

    /// Detailed information on one or more networks.
    pub async fn network_inspect(
        &self,
        networks: &[&str],
        format: &str,
    ) -> Result<Vec<String>, OciError> {
        let mut args = strings(["network", "inspect", "-f", format]);
        args.extend(networks.iter().map(|n| n.to_string()));
        self.output_lines(args).await.context(InspectSnafu {
            target: networks.join(" "),
        })
    }

    /// Pause a container's processes.
    pub async fn pause(&self, name: &str) -> Result<(), OciError> {
        self.output_lines(strings(["pause", name]))
            .await
            .context(CommandSnafu {
                action: "pause",
                target: name,
            })?;
        Ok(())
    }

    /// Force-remove a container together with its anonymous volumes.
    pub async fn remove(&self, name: &str) -> Result<(), OciError> {
        self.output_lines(strings(["rm", "-f", "-v", name]))
            .await
            .context(CommandSnafu {
                action: "remove",
                target: name,
            })?;
        Ok(())
    }

    /// List all containers (including stopped ones) carrying `label`, one formatted line each.
    pub async fn list_containers(&self, label: &str, format: &str) -> Result<Vec<String>, OciError> {
        let args = strings([
            "ps",
            // quiet output for parsing
            "-q",
            // include stopped containers
            "-a",
            "--no-trunc",
            "--filter",
            &format!("label={label}"),
            "--format",
            format,
        ]);
        self.output_lines(args).await.context(CommandSnafu {
            action: "list",
            target: label,
        })
    }
}

fn strings<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}
