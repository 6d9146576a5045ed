// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Wraps executor failures with the runtime operation that triggered them.

use snafu::Snafu;

use crate::exec::ExecError;

/// Failure of a single runtime CLI operation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OciError {
    #[snafu(display("failed to create container from {image}: {source}"))]
    Create { image: String, source: ExecError },

    #[snafu(display("failed to pull image {image}: {source}"))]
    Pull { image: String, source: ExecError },

    #[snafu(display("failed to inspect {target}: {source}"))]
    Inspect { target: String, source: ExecError },

    #[snafu(display("{action} {target} failed: {source}"))]
    Command {
        action: &'static str,
        target: String,
        source: ExecError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OciErrorKind {
    Create,
    Pull,
    Inspect,
    Command,
}

impl OciError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> OciErrorKind {
        match self {
            OciError::Create { .. } => OciErrorKind::Create,
            OciError::Pull { .. } => OciErrorKind::Pull,
            OciError::Inspect { .. } => OciErrorKind::Inspect,
            OciError::Command { .. } => OciErrorKind::Command,
        }
    }

    /// The underlying executor failure.
    pub fn exec_error(&self) -> &ExecError {
        match self {
            OciError::Create { source, .. }
            | OciError::Pull { source, .. }
            | OciError::Inspect { source, .. }
            | OciError::Command { source, .. } => source,
        }
    }

    /// Output lines captured from the failed command.
    pub fn output(&self) -> &[String] {
        self.exec_error().output()
    }
}
