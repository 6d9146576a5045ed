// ABOUTME: Application-wide error types for nodectr.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::exec::ExecError;
use crate::node::NodeError;
use crate::runtime::{DetectionError, OciError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Runtime(#[from] OciError),

    #[error("runtime detection failed: {0}")]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
