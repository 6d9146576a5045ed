// ABOUTME: Mount and port-mapping descriptors and their runtime flag rendering.
// ABOUTME: Produces `--volume=` and `--publish=` flags in input order.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};

/// Mount visibility between host and container mount namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "kebab-case")]
pub enum MountPropagation {
    /// Private; the runtime default.
    #[default]
    None,
    /// Host mounts propagate into the container (`rslave`).
    HostToContainer,
    /// Mounts propagate both ways (`rshared`).
    Bidirectional,
}

impl From<String> for MountPropagation {
    /// Unrecognized values fall back to private.
    fn from(value: String) -> Self {
        match value.as_str() {
            "host-to-container" | "HostToContainer" => MountPropagation::HostToContainer,
            "bidirectional" | "Bidirectional" => MountPropagation::Bidirectional,
            _ => MountPropagation::None,
        }
    }
}

/// A bind mount from the host into a node container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub host_path: String,
    pub container_path: String,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub selinux_relabel: bool,
    #[serde(default)]
    pub propagation: MountPropagation,
}

impl Mount {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            readonly: false,
            selinux_relabel: false,
            propagation: MountPropagation::None,
        }
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn selinux_relabel(mut self, relabel: bool) -> Self {
        self.selinux_relabel = relabel;
        self
    }

    pub fn propagation(mut self, propagation: MountPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        if self.host_path.is_empty() {
            return Err(MappingError::EmptyHostPath);
        }
        if self.container_path.is_empty() {
            return Err(MappingError::EmptyContainerPath(self.host_path.clone()));
        }
        Ok(())
    }

    /// Render as a single `--volume=<host>:<container>[:attrs]` flag.
    pub fn to_flag(&self) -> String {
        let mut bind = format!("{}:{}", self.host_path, self.container_path);

        let mut attrs = Vec::new();
        if self.readonly {
            attrs.push("ro");
        }
        // Relabeling without an SELinux context would lock the volume to the
        // first container that mounts it.
        if self.selinux_relabel {
            attrs.push("Z");
        }
        match self.propagation {
            MountPropagation::None => {}
            MountPropagation::Bidirectional => attrs.push("rshared"),
            MountPropagation::HostToContainer => attrs.push("rslave"),
        }

        if !attrs.is_empty() {
            bind.push(':');
            bind.push_str(&attrs.join(","));
        }
        format!("--volume={bind}")
    }
}

/// Transport protocol of a published port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

/// A container port published on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    #[serde(default)]
    pub listen_address: Option<IpAddr>,
    pub host_port: u16,
    pub container_port: u16,
    #[serde(default)]
    pub protocol: Protocol,
}

impl PortMapping {
    pub fn new(host_port: u16, container_port: u16) -> Self {
        Self {
            listen_address: None,
            host_port,
            container_port,
            protocol: Protocol::Tcp,
        }
    }

    pub fn listen_address(mut self, address: IpAddr) -> Self {
        self.listen_address = Some(address);
        self
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        if self.host_port == 0 || self.container_port == 0 {
            return Err(MappingError::ZeroPort {
                host_port: self.host_port,
                container_port: self.container_port,
            });
        }
        Ok(())
    }

    /// Render as a single `--publish=[<address>:]<hostPort>:<containerPort>` flag.
    pub fn to_flag(&self) -> String {
        let host_binding = match self.listen_address {
            // SocketAddr brackets IPv6 addresses.
            Some(address) => SocketAddr::new(address, self.host_port).to_string(),
            None => self.host_port.to_string(),
        };
        format!("--publish={}:{}", host_binding, self.container_port)
    }
}

/// Invalid mount or port mapping.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("mount host path cannot be empty")]
    EmptyHostPath,

    #[error("mount container path cannot be empty (host path {0})")]
    EmptyContainerPath(String),

    #[error("ports must be positive (host {host_port}, container {container_port})")]
    ZeroPort { host_port: u16, container_port: u16 },
}

/// Convert mounts to `--volume=` flags.
pub fn generate_mount_bindings(mounts: &[Mount]) -> Vec<String> {
    mounts.iter().map(Mount::to_flag).collect()
}

/// Convert port mappings to `--publish=` flags.
pub fn generate_port_mappings(port_mappings: &[PortMapping]) -> Vec<String> {
    port_mappings.iter().map(PortMapping::to_flag).collect()
}
