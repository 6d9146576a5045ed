// ABOUTME: Configuration types and parsing for nodectr.yml.
// ABOUTME: Handles YAML parsing, discovery, and validation of node specs.

pub(crate) mod deserialize;

use crate::error::{Error, Result};
use crate::node::NodeSpec;
use crate::runtime::{PullPolicy, RuntimeConfig, RuntimeType};
use deserialize::deserialize_nodes;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "nodectr.yml";
pub const CONFIG_FILENAME_ALT: &str = "nodectr.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".nodectr/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Runtime flavour; detected from `PATH` when absent.
    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    /// Explicit runtime executable.
    #[serde(default)]
    pub binary: Option<String>,

    #[serde(default)]
    pub pull: PullPolicy,

    #[serde(deserialize_with = "deserialize_nodes")]
    pub nodes: NonEmpty<NodeSpec>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Check mounts and ports of every node, and that node names are unique
    /// within a profile.
    ///
    /// Roles are left alone: an unknown role is reported when the node is created.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for node in self.nodes.iter() {
            node.validate_mappings()
                .map_err(|e| Error::InvalidConfig(format!("node {}: {e}", node.name)))?;
            if !seen.insert((node.profile.as_str(), node.name.as_str())) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate node {} in profile {}",
                    node.name, node.profile
                )));
            }
        }
        Ok(())
    }

    /// Runtime overrides declared in the file.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime: self.runtime,
            binary: self.binary.clone(),
        }
    }

    /// First node named `name`, in any profile.
    pub fn node(&self, name: &str) -> Result<&NodeSpec> {
        self.nodes
            .iter()
            .find(|node| node.name.as_str() == name)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))
    }
}
