// ABOUTME: Node handle: a named reference to a container owned by the runtime.
// ABOUTME: Stop, delete, inspect, and run commands in a node by name.

use super::error::NodeError;
use crate::exec::ContainerExecutor;
use crate::runtime::CliRuntime;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Go template printing `<ipv4>,<ipv6>` for each attached network.
const IP_FORMAT: &str =
    "{{range .NetworkSettings.Networks}}{{.IPAddress}},{{.GlobalIPv6Address}}{{end}}";

/// Reference to a node container.
///
/// Holds no container state; a handle whose container was removed elsewhere
/// only shows up as failing operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    name: String,
}

/// Addresses of a node on its runtime network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeAddresses {
    pub ipv4: Option<Ipv4Addr>,
    pub ipv6: Option<Ipv6Addr>,
}

impl Node {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pause the node's processes.
    pub async fn stop(&self, runtime: &CliRuntime) -> Result<(), NodeError> {
        runtime
            .pause(&self.name)
            .await
            .map_err(|source| NodeError::Stop {
                name: self.name.clone(),
                source,
            })
    }

    /// Force-remove the node container and its volumes.
    pub async fn delete(&self, runtime: &CliRuntime) -> Result<(), NodeError> {
        runtime
            .remove(&self.name)
            .await
            .map_err(|source| NodeError::Delete {
                name: self.name.clone(),
                source,
            })?;
        tracing::info!("deleted node {}", self.name);
        Ok(())
    }

    /// Inspect the node with a Go template, one string per output line.
    pub async fn inspect(&self, runtime: &CliRuntime, format: &str) -> Result<Vec<String>, NodeError> {
        runtime
            .inspect(&self.name, format)
            .await
            .map_err(NodeError::Inspect)
    }

    /// Full container ID as reported by the runtime.
    pub async fn container_id(&self, runtime: &CliRuntime) -> Result<String, NodeError> {
        let lines = self.inspect(runtime, "{{.Id}}").await?;
        match lines.as_slice() {
            [id] if !id.trim().is_empty() => Ok(id.trim().to_string()),
            _ => Err(NodeError::Parse {
                context: "reading container id",
                line: lines.join("\n"),
            }),
        }
    }

    /// IPv4 and IPv6 addresses of the node.
    pub async fn ip(&self, runtime: &CliRuntime) -> Result<NodeAddresses, NodeError> {
        let lines = self.inspect(runtime, IP_FORMAT).await?;
        parse_node_addresses(&lines)
    }

    /// Executor running commands inside this node.
    pub fn executor(&self, runtime: &CliRuntime) -> ContainerExecutor {
        runtime.container_executor(&self.name)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Parse the single `<ipv4>,<ipv6>` line produced by the address template.
pub fn parse_node_addresses(lines: &[String]) -> Result<NodeAddresses, NodeError> {
    let invalid = |line: &str| NodeError::Parse {
        context: "reading node addresses",
        line: line.to_string(),
    };

    let [line] = lines else {
        return Err(invalid(&lines.join("\n")));
    };
    let Some((v4, v6)) = line.split_once(',') else {
        return Err(invalid(line));
    };
    if v6.contains(',') {
        return Err(invalid(line));
    }

    let ipv4: Option<Ipv4Addr> = match v4.trim() {
        "" => None,
        addr => Some(addr.parse().map_err(|_| invalid(line))?),
    };
    let ipv6: Option<Ipv6Addr> = match v6.trim() {
        "" => None,
        addr => Some(addr.parse().map_err(|_| invalid(line))?),
    };
    Ok(NodeAddresses { ipv4, ipv6 })
}
