// ABOUTME: Declarative node specification and node roles.
// ABOUTME: Validates roles and expands role-specific settings before creation.

use super::create::{NodeRequest, create_node_with_proxy};
use super::error::NodeError;
use super::handle::Node;
use super::list::list_nodes;
use super::proxy::ProxyDetails;
use crate::config::deserialize::{deserialize_image_ref, deserialize_node_name};
use crate::runtime::{CliRuntime, MappingError, Mount, PortMapping, PullPolicy};
use crate::types::{ImageRef, NodeName};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// Label key identifying the cluster (profile) a node belongs to.
pub const CLUSTER_LABEL_KEY: &str = "io.nodectr.cluster";

/// Label key carrying the node's role.
pub const NODE_ROLE_KEY: &str = "io.nodectr.role";

/// Port the API server listens on inside a control-plane node.
pub const API_SERVER_CONTAINER_PORT: u16 = 6443;

pub const DEFAULT_PROFILE: &str = "nodectr";

/// Role a node plays in the simulated cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    ControlPlane,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ControlPlane => "control-plane",
            Role::Worker => "worker",
        }
    }

    /// Value of the role label, `<NODE_ROLE_KEY>=<role>`.
    pub fn label(&self) -> String {
        format!("{}={}", NODE_ROLE_KEY, self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "control-plane" => Ok(Role::ControlPlane),
            "worker" => Ok(Role::Worker),
            other => Err(NodeError::UnknownRole(other.to_string())),
        }
    }
}

/// A node to create, purely from the container point of view.
///
/// Starting cluster software inside the node is left to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    #[serde(deserialize_with = "deserialize_node_name")]
    pub name: NodeName,

    #[serde(default = "default_profile")]
    pub profile: String,

    /// Kept as written so unknown roles surface as a creation error.
    pub role: String,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    #[serde(default)]
    pub mounts: Vec<Mount>,

    #[serde(default)]
    pub ports: Vec<PortMapping>,

    #[serde(default)]
    pub api_server_address: Option<IpAddr>,

    #[serde(default)]
    pub api_server_port: Option<u16>,

    #[serde(default)]
    pub ipv6: bool,
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

impl NodeSpec {
    pub fn new(name: NodeName, role: impl Into<String>, image: ImageRef) -> Self {
        Self {
            name,
            profile: default_profile(),
            role: role.into(),
            image,
            mounts: Vec::new(),
            ports: Vec::new(),
            api_server_address: None,
            api_server_port: None,
            ipv6: false,
        }
    }

    /// Cluster label value, `<CLUSTER_LABEL_KEY>=<profile>`.
    pub fn cluster_label(&self) -> String {
        format!("{}={}", CLUSTER_LABEL_KEY, self.profile)
    }

    pub fn role(&self) -> Result<Role, NodeError> {
        self.role.parse()
    }

    /// Check mounts and port mappings.
    pub fn validate_mappings(&self) -> Result<(), MappingError> {
        self.mounts.iter().try_for_each(Mount::validate)?;
        self.ports.iter().try_for_each(PortMapping::validate)
    }

    /// Runtime-level request with role-specific ports and arguments applied.
    pub fn request(&self, role: Role) -> (NodeRequest, Vec<String>) {
        let mut port_mappings = self.ports.clone();
        let mut extra_args = Vec::new();

        if role == Role::ControlPlane
            && let Some(port) = self.api_server_port
        {
            let address = self
                .api_server_address
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
            port_mappings.push(
                PortMapping::new(port, API_SERVER_CONTAINER_PORT).listen_address(address),
            );
            extra_args.push("--expose".to_string());
            extra_args.push(port.to_string());
        }

        if self.ipv6 {
            extra_args.push("--sysctl=net.ipv6.conf.all.disable_ipv6=0".to_string());
            extra_args.push("--sysctl=net.ipv6.conf.all.forwarding=1".to_string());
        }

        let request = NodeRequest {
            name: self.name.to_string(),
            image: self.image.to_string(),
            cluster_label: self.cluster_label(),
            role,
            mounts: self.mounts.clone(),
            port_mappings,
        };
        (request, extra_args)
    }

    /// Create the node container.
    ///
    /// The role, mounts, ports, and proxy environment are checked before any
    /// runtime command runs. The image is then made available according to `pull`.
    pub async fn create(&self, runtime: &CliRuntime, pull: &PullPolicy) -> Result<Node, NodeError> {
        let role = self.role()?;
        self.validate_mappings()?;
        let proxy = ProxyDetails::from_env()?;

        runtime
            .ensure_image(self.image.as_str(), pull.force, pull.timeout)
            .await
            .map_err(NodeError::Pull)?;

        let (request, extra_args) = self.request(role);
        create_node_with_proxy(runtime, &request, &proxy, &extra_args).await
    }

    /// Pause this node's container.
    pub async fn stop(&self, runtime: &CliRuntime) -> Result<(), NodeError> {
        Node::from_name(self.name.as_str()).stop(runtime).await
    }

    /// Remove this node's container and its volumes.
    pub async fn delete(&self, runtime: &CliRuntime) -> Result<(), NodeError> {
        Node::from_name(self.name.as_str()).delete(runtime).await
    }

    /// Names of all nodes in this node's profile.
    pub async fn list_nodes(&self, runtime: &CliRuntime) -> Result<Vec<String>, NodeError> {
        list_nodes(runtime, &self.profile).await
    }
}
