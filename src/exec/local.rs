// ABOUTME: Executor that runs programs on the local host.
// ABOUTME: Uses tokio::process and forwards attached streams while the child runs.

use super::{Cmd, ExecError, Executor, Input, Output, display_command};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::Command;

/// Runs commands as child processes of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExecutor;

impl Executor for LocalExecutor {
    fn command(&self, program: &str, args: Vec<String>) -> Box<dyn Cmd> {
        Box::new(LocalCmd {
            program: program.to_string(),
            args,
            env: Vec::new(),
            stdin: None,
            stdout: None,
            stderr: None,
        })
    }
}

struct LocalCmd {
    program: String,
    args: Vec<String>,
    env: Vec<String>,
    stdin: Option<Input>,
    stdout: Option<Output>,
    stderr: Option<Output>,
}

#[async_trait]
impl Cmd for LocalCmd {
    fn set_env(&mut self, env: Vec<String>) {
        self.env = env;
    }

    fn set_stdin(&mut self, stdin: Input) {
        self.stdin = Some(stdin);
    }

    fn set_stdout(&mut self, stdout: Output) {
        self.stdout = Some(stdout);
    }

    fn set_stderr(&mut self, stderr: Output) {
        self.stderr = Some(stderr);
    }

    async fn run(&mut self) -> Result<(), ExecError> {
        let rendered = display_command(&self.program, &self.args);
        tracing::debug!(command = %rendered, "running");

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        for entry in &self.env {
            match entry.split_once('=') {
                Some((key, value)) => command.env(key, value),
                None => command.env(entry, ""),
            };
        }
        command
            .stdin(piped_if(self.stdin.is_some()))
            .stdout(piped_if(self.stdout.is_some()))
            .stderr(piped_if(self.stderr.is_some()));

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        // stdin may never reach EOF, so it is fed independently of the child's lifetime
        let feed = match (self.stdin.take(), child.stdin.take()) {
            (Some(mut input), Some(mut pipe)) => Some(tokio::spawn(async move {
                let fed = async {
                    tokio::io::copy(&mut input, &mut pipe).await?;
                    pipe.shutdown().await
                };
                if let Err(err) = fed.await {
                    tracing::debug!("stdin forwarding stopped: {}", err);
                }
            })),
            _ => None,
        };

        let out = forward(child.stdout.take(), self.stdout.as_mut());
        let err = forward(child.stderr.take(), self.stderr.as_mut());
        let forwarded = tokio::try_join!(out, err);
        let status = child.wait().await;
        if let Some(feed) = feed {
            feed.abort();
        }
        forwarded?;
        let status = status?;
        if !status.success() {
            return Err(ExecError::Exit {
                command: rendered,
                code: status.code(),
                output: Vec::new(),
            });
        }
        Ok(())
    }
}

fn piped_if(attached: bool) -> Stdio {
    if attached {
        Stdio::piped()
    } else {
        Stdio::null()
    }
}

async fn forward<R>(source: Option<R>, sink: Option<&mut Output>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    if let (Some(mut source), Some(sink)) = (source, sink) {
        tokio::io::copy(&mut source, sink).await?;
        sink.flush().await?;
    }
    Ok(())
}
