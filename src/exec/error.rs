// ABOUTME: Error types for external command execution.
// ABOUTME: Distinguishes spawn failures, non-zero exits, and stream I/O errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}{}", describe_code(.code), describe_output(.output))]
    Exit {
        command: String,
        code: Option<i32>,
        output: Vec<String>,
    },

    #[error("I/O error while running command: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Output lines captured before the failure, if any were collected.
    pub fn output(&self) -> &[String] {
        match self {
            ExecError::Exit { output, .. } => output,
            _ => &[],
        }
    }

    /// Attach captured output to a non-zero exit.
    pub fn with_output(self, lines: Vec<String>) -> Self {
        match self {
            ExecError::Exit { command, code, .. } => ExecError::Exit {
                command,
                code,
                output: lines,
            },
            other => other,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn describe_output(output: &[String]) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!("; output: {}", output.join("\n"))
    }
}
