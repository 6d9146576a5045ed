// ABOUTME: Pluggable command executor used for every runtime invocation.
// ABOUTME: Defines Executor/Cmd traits plus helpers to capture combined output.

mod container;
mod error;
mod local;

pub use container::ContainerExecutor;
pub use error::ExecError;
pub use local::LocalExecutor;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite};

/// Input stream attached to a command's stdin.
pub type Input = Box<dyn AsyncRead + Send + Unpin>;

/// Output stream attached to a command's stdout or stderr.
pub type Output = Box<dyn AsyncWrite + Send + Unpin>;

/// Builds commands for a program and its arguments.
///
/// Implementations decide where the command actually runs: on the host, inside
/// a container, or nowhere at all in tests.
pub trait Executor: Send + Sync {
    fn command(&self, program: &str, args: Vec<String>) -> Box<dyn Cmd>;
}

/// A single command ready to run.
///
/// Streams that are not attached are discarded (stdout/stderr) or closed (stdin).
#[async_trait]
pub trait Cmd: Send {
    /// Additional environment, as `KEY=VALUE` entries.
    fn set_env(&mut self, env: Vec<String>);

    fn set_stdin(&mut self, stdin: Input);

    fn set_stdout(&mut self, stdout: Output);

    fn set_stderr(&mut self, stderr: Output);

    /// Run to completion. A non-zero exit status is an [`ExecError::Exit`].
    async fn run(&mut self) -> Result<(), ExecError>;
}

/// Run a command with stdout and stderr merged, returning the output lines.
///
/// On failure the lines captured so far are carried by the error.
pub async fn combined_output_lines(mut cmd: Box<dyn Cmd>) -> Result<Vec<String>, ExecError> {
    let buffer = SharedBuffer::default();
    cmd.set_stdout(Box::new(buffer.clone()));
    cmd.set_stderr(Box::new(buffer.clone()));

    let result = cmd.run().await;
    let lines = buffer.lines();
    match result {
        Ok(()) => Ok(lines),
        Err(err) => Err(err.with_output(lines)),
    }
}

/// Render a program and its arguments the way a shell user would type them.
pub(crate) fn display_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// In-memory writer shared between stdout and stderr.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Captured bytes split into lines, lossily decoded.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.0.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
