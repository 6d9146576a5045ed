// ABOUTME: Container creation via `<runtime> run` with accumulated options.
// ABOUTME: CreateOptions is a chained builder; each setter replaces the previous value.

use super::client::CliRuntime;
use super::error::{CreateSnafu, OciError};
use super::mounts::{Mount, PortMapping, generate_mount_bindings, generate_port_mappings};
use snafu::ResultExt;

/// Options for `run <run args...> <image> <container args...>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    run_args: Vec<String>,
    container_args: Vec<String>,
    mounts: Vec<Mount>,
    port_mappings: Vec<PortMapping>,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments for the runtime, placed before the image.
    pub fn run_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments for the container entrypoint, placed after the image.
    pub fn container_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.container_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn mounts(mut self, mounts: Vec<Mount>) -> Self {
        self.mounts = mounts;
        self
    }

    pub fn port_mappings(mut self, port_mappings: Vec<PortMapping>) -> Self {
        self.port_mappings = port_mappings;
        self
    }

    /// Full argument vector for the runtime.
    pub fn argv(&self, image: &str) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        args.extend(self.run_args.iter().cloned());
        args.extend(generate_mount_bindings(&self.mounts));
        args.extend(generate_port_mappings(&self.port_mappings));
        args.push(image.to_string());
        args.extend(self.container_args.iter().cloned());
        args
    }
}

impl CliRuntime {
    /// Create and start a container from `image`.
    pub async fn create_container(
        &self,
        image: &str,
        options: &CreateOptions,
    ) -> Result<(), OciError> {
        let args = options.argv(image);
        tracing::debug!("creating container: {} {}", self.binary(), args.join(" "));
        self.output_lines(args)
            .await
            .context(CreateSnafu { image })?;
        Ok(())
    }
}
