// ABOUTME: Executor that runs commands inside an existing node container.
// ABOUTME: Wraps each command in `<runtime> exec` and delegates to a host executor.

use super::{Cmd, ExecError, Executor, Input, Output};
use async_trait::async_trait;
use std::sync::Arc;

/// Runs commands inside a container via `<runtime> exec --privileged`.
#[derive(Clone)]
pub struct ContainerExecutor {
    runtime: String,
    container: String,
    host: Arc<dyn Executor>,
    tty: bool,
}

impl std::fmt::Debug for ContainerExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerExecutor")
            .field("runtime", &self.runtime)
            .field("container", &self.container)
            .field("tty", &self.tty)
            .finish()
    }
}

impl ContainerExecutor {
    pub fn new(
        runtime: impl Into<String>,
        container: impl Into<String>,
        host: Arc<dyn Executor>,
    ) -> Self {
        Self {
            runtime: runtime.into(),
            container: container.into(),
            host,
            tty: false,
        }
    }

    /// Allocate a TTY for commands that have output attached.
    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

impl Executor for ContainerExecutor {
    fn command(&self, program: &str, args: Vec<String>) -> Box<dyn Cmd> {
        Box::new(ContainerCmd {
            executor: self.clone(),
            program: program.to_string(),
            args,
            env: Vec::new(),
            stdin: None,
            stdout: None,
            stderr: None,
        })
    }
}

struct ContainerCmd {
    executor: ContainerExecutor,
    program: String,
    args: Vec<String>,
    env: Vec<String>,
    stdin: Option<Input>,
    stdout: Option<Output>,
    stderr: Option<Output>,
}

impl ContainerCmd {
    fn exec_args(&self) -> Vec<String> {
        let mut args = vec![
            "exec".to_string(),
            // privileged so commands can remount and manage services
            "--privileged".to_string(),
        ];
        if self.stdin.is_some() {
            args.push("-i".to_string());
        }
        let output_attached = self.stdout.is_some() || self.stderr.is_some();
        if self.executor.tty && output_attached {
            args.push("-t".to_string());
        }
        for entry in &self.env {
            args.push("-e".to_string());
            args.push(entry.clone());
        }
        // everything after the container name belongs to the command in the container
        args.push(self.executor.container.clone());
        args.push(self.program.clone());
        args.extend(self.args.iter().cloned());
        args
    }
}

#[async_trait]
impl Cmd for ContainerCmd {
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
        let args = self.exec_args();
        let mut cmd = self.executor.host.command(&self.executor.runtime, args);
        if let Some(stdin) = self.stdin.take() {
            cmd.set_stdin(stdin);
        }
        if let Some(stdout) = self.stdout.take() {
            cmd.set_stdout(stdout);
        }
        if let Some(stderr) = self.stderr.take() {
            cmd.set_stderr(stderr);
        }
        cmd.run().await
    }
}
