// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles node names, image refs, and the node list.

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::node::NodeSpec;
use crate::types::{ImageRef, NodeName};

pub fn deserialize_node_name<'de, D>(deserializer: D) -> Result<NodeName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NodeName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_image_ref<'de, D>(deserializer: D) -> Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_nodes<'de, D>(deserializer: D) -> Result<NonEmpty<NodeSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let nodes: Vec<NodeSpec> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(nodes).ok_or_else(|| serde::de::Error::custom("at least one node is required"))
}
