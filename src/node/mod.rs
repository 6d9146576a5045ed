// ABOUTME: Node containers: declarations, creation, handles, and listing.
// ABOUTME: Builds on the runtime layer to provision machines of a simulated cluster.

mod create;
mod error;
mod handle;
mod list;
mod proxy;
mod spec;

pub use create::{
    KERNEL_MODULES_DIR, NodeRequest, base_run_args, create_node, create_node_with_proxy,
    node_run_args,
};
pub use error::{ErrorKind, NodeError};
pub use handle::{Node, NodeAddresses, parse_node_addresses};
pub use list::{list_format, list_nodes, parse_node_list};
pub use proxy::{PROXY_VARS, ProxyDetails, ProxyError};
pub use spec::{
    API_SERVER_CONTAINER_PORT, CLUSTER_LABEL_KEY, DEFAULT_PROFILE, NODE_ROLE_KEY, NodeSpec, Role,
};
