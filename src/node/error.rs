// ABOUTME: Error types for node lifecycle operations.
// ABOUTME: Classifies failures so callers know which are worth retrying.

use super::handle::Node;
use super::proxy::ProxyError;
use crate::runtime::{MappingError, OciError};

/// Errors from creating, stopping, deleting, listing, or inspecting nodes.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Role is not one of the recognized variants. No runtime command was issued.
    #[error("unknown node role: {0}")]
    UnknownRole(String),

    /// Proxy settings could not be read from the environment. No runtime command was issued.
    #[error("proxy setup error: {0}")]
    ProxySetup(#[from] ProxyError),

    /// A mount or port mapping is invalid. No runtime command was issued.
    #[error("invalid node mapping: {0}")]
    InvalidMapping(#[from] MappingError),

    /// The node image could not be made available before the pull deadline.
    #[error("node image unavailable: {0}")]
    Pull(#[source] OciError),

    /// The runtime rejected the container. The handle is kept for cleanup.
    #[error("failed to create node {node}: {source}")]
    Create {
        node: Node,
        #[source]
        source: OciError,
    },

    #[error("failed to stop node {name}: {source}")]
    Stop {
        name: String,
        #[source]
        source: OciError,
    },

    #[error("failed to delete node {name}: {source}")]
    Delete {
        name: String,
        #[source]
        source: OciError,
    },

    #[error("failed to list containers for {profile}: {source}")]
    List {
        profile: String,
        #[source]
        source: OciError,
    },

    /// Runtime output did not have the expected shape.
    #[error("invalid output when {context}: {line:?}")]
    Parse { context: &'static str, line: String },

    /// Inspect failed. Any partial output is available through [`NodeError::output`].
    #[error("{0}")]
    Inspect(#[source] OciError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownRole,
    ProxySetup,
    InvalidMapping,
    Pull,
    Create,
    Stop,
    Delete,
    List,
    Parse,
    Inspect,
}

impl NodeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            NodeError::UnknownRole(_) => ErrorKind::UnknownRole,
            NodeError::ProxySetup(_) => ErrorKind::ProxySetup,
            NodeError::InvalidMapping(_) => ErrorKind::InvalidMapping,
            NodeError::Pull(_) => ErrorKind::Pull,
            NodeError::Create { .. } => ErrorKind::Create,
            NodeError::Stop { .. } => ErrorKind::Stop,
            NodeError::Delete { .. } => ErrorKind::Delete,
            NodeError::List { .. } => ErrorKind::List,
            NodeError::Parse { .. } => ErrorKind::Parse,
            NodeError::Inspect(_) => ErrorKind::Inspect,
        }
    }

    /// Whether retrying the same operation may succeed.
    ///
    /// Pulls depend on the network; structural failures (bad role, proxy
    /// environment, malformed output) will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(self, NodeError::Pull(_))
    }

    /// Handle of a node whose creation failed, for cleanup.
    pub fn node(&self) -> Option<&Node> {
        match self {
            NodeError::Create { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Output lines captured from the failing runtime command.
    pub fn output(&self) -> &[String] {
        match self {
            NodeError::Pull(source)
            | NodeError::Create { source, .. }
            | NodeError::Stop { source, .. }
            | NodeError::Delete { source, .. }
            | NodeError::List { source, .. }
            | NodeError::Inspect(source) => source.output(),
            _ => &[],
        }
    }
}
