// ABOUTME: Node name validation.
// ABOUTME: Node names double as container name and hostname, so both rule sets apply.

use std::fmt;
use thiserror::Error;

/// Hostnames are limited to a single 63-character DNS label.
const MAX_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NodeNameError {
    #[error("node name must be at least 2 characters")]
    TooShort,

    #[error("node name exceeds maximum length of {MAX_LEN} characters")]
    TooLong,

    #[error("node name must start with a letter or digit")]
    InvalidStart,

    #[error("invalid character in node name: '{0}'")]
    InvalidChar(char),
}

/// Container name accepted by docker and podman: `[a-zA-Z0-9][a-zA-Z0-9_.-]+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(String);

impl NodeName {
    pub fn new(value: &str) -> Result<Self, NodeNameError> {
        if value.len() < 2 {
            return Err(NodeNameError::TooShort);
        }
        if value.len() > MAX_LEN {
            return Err(NodeNameError::TooLong);
        }

        let mut chars = value.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return Err(NodeNameError::InvalidStart);
        }
        if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(NodeNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
