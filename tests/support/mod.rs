// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted executor that records argv and replays canned output.

use async_trait::async_trait;
use nodectr::exec::{Cmd, ExecError, Executor, Input, Output};
use nodectr::runtime::CliRuntime;
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use tokio::io::AsyncWriteExt;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("nodectr=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

struct Rule {
    prefix: Vec<String>,
    lines: Vec<String>,
    code: i32,
    /// How many more commands this rule answers; `None` is unlimited.
    remaining: Option<usize>,
}

/// Executor that never spawns anything.
///
/// Every command is recorded as `[program, args...]`. The first rule whose
/// prefix matches the arguments decides the output and exit code; commands
/// without a rule succeed silently.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    rules: Arc<Mutex<Vec<Rule>>>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` succeed and print `lines`.
    pub fn on(&self, prefix: &[&str], lines: &[&str]) -> &Self {
        self.rule(prefix, lines, 0)
    }

    /// Commands starting with `prefix` print `lines` and exit with status 1.
    pub fn fail(&self, prefix: &[&str], lines: &[&str]) -> &Self {
        self.rule(prefix, lines, 1)
    }

    /// Like [`ScriptedExecutor::fail`], but only for the next `times` matching commands.
    pub fn fail_times(&self, prefix: &[&str], times: usize, lines: &[&str]) -> &Self {
        self.push_rule(prefix, lines, 1, Some(times))
    }

    fn rule(&self, prefix: &[&str], lines: &[&str], code: i32) -> &Self {
        self.push_rule(prefix, lines, code, None)
    }

    fn push_rule(&self, prefix: &[&str], lines: &[&str], code: i32, remaining: Option<usize>) -> &Self {
        self.rules.lock().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
            code,
            remaining,
        });
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Recorded calls whose first argument is `subcommand`.
    pub fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.get(1).is_some_and(|arg| arg == subcommand))
            .collect()
    }

    /// A `docker` runtime backed by this executor.
    pub fn runtime(&self) -> CliRuntime {
        CliRuntime::new("docker", Arc::new(self.clone()))
    }
}

impl Executor for ScriptedExecutor {
    fn command(&self, program: &str, args: Vec<String>) -> Box<dyn Cmd> {
        Box::new(ScriptedCmd {
            program: program.to_string(),
            args,
            executor: self.clone(),
            stdout: None,
        })
    }
}

struct ScriptedCmd {
    program: String,
    args: Vec<String>,
    executor: ScriptedExecutor,
    stdout: Option<Output>,
}

#[async_trait]
impl Cmd for ScriptedCmd {
    fn set_env(&mut self, _env: Vec<String>) {}

    fn set_stdin(&mut self, _stdin: Input) {}

    fn set_stdout(&mut self, stdout: Output) {
        self.stdout = Some(stdout);
    }

    fn set_stderr(&mut self, _stderr: Output) {}

    async fn run(&mut self) -> Result<(), ExecError> {
        let mut argv = vec![self.program.clone()];
        argv.extend(self.args.iter().cloned());
        self.executor.calls.lock().push(argv.clone());

        let (lines, code) = {
            let mut rules = self.executor.rules.lock();
            let matched = rules.iter_mut().find(|rule| {
                self.args.starts_with(&rule.prefix) && rule.remaining != Some(0)
            });
            match matched {
                Some(rule) => {
                    if let Some(remaining) = rule.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    (rule.lines.clone(), rule.code)
                }
                None => (Vec::new(), 0),
            }
        };

        if let Some(stdout) = self.stdout.as_mut() {
            for line in &lines {
                stdout.write_all(line.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            stdout.flush().await?;
        }

        if code != 0 {
            return Err(ExecError::Exit {
                command: argv.join(" "),
                code: Some(code),
                output: Vec::new(),
            });
        }
        Ok(())
    }
}
