// ABOUTME: Node container creation: the fixed run arguments every node needs.
// ABOUTME: Adds proxy env, caller arguments, and userns handling, then runs the container.

use super::error::NodeError;
use super::handle::Node;
use super::proxy::ProxyDetails;
use super::spec::Role;
use crate::runtime::{CliRuntime, CreateOptions, Mount, PortMapping};

/// Kernel modules directory, bound read-only into every node.
pub const KERNEL_MODULES_DIR: &str = "/lib/modules";

/// Everything the runtime needs to know to create one node container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRequest {
    pub name: String,
    pub image: String,
    /// Full cluster label, `<key>=<profile>`.
    pub cluster_label: String,
    pub role: Role,
    pub mounts: Vec<Mount>,
    pub port_mappings: Vec<PortMapping>,
}

fn kernel_modules_mount() -> Mount {
    Mount::new(KERNEL_MODULES_DIR, KERNEL_MODULES_DIR).readonly(true)
}

/// Run arguments shared by all nodes, in the order the runtime receives them.
pub fn base_run_args(request: &NodeRequest) -> Vec<String> {
    vec![
        // run the container detached
        "-d".to_string(),
        // allocate a tty for entrypoint logs
        "-t".to_string(),
        // running containers in a container requires privileged mode, which
        // also sets up mounts that would otherwise need replicating by hand
        "--privileged".to_string(),
        "--security-opt".to_string(),
        "seccomp=unconfined".to_string(),
        // various things depend on a working /tmp
        "--tmpfs".to_string(),
        "/tmp".to_string(),
        // systemd wants a writable /run
        "--tmpfs".to_string(),
        "/run".to_string(),
        kernel_modules_mount().to_flag(),
        "--hostname".to_string(),
        request.name.clone(),
        "--name".to_string(),
        request.name.clone(),
        "--label".to_string(),
        request.cluster_label.clone(),
        "--label".to_string(),
        request.role.label(),
    ]
}

/// Complete run arguments before mounts and port mappings are expanded.
pub fn node_run_args(
    request: &NodeRequest,
    proxy: &ProxyDetails,
    extra_args: &[String],
    userns_remap: bool,
) -> Vec<String> {
    let mut args = base_run_args(request);
    args.extend(proxy.run_args());
    args.extend(extra_args.iter().cloned());
    if userns_remap {
        // required when the daemon runs with userns-remap
        args.push("--userns=host".to_string());
    }
    args
}

/// Create a node, forwarding proxy settings from the process environment.
pub async fn create_node(
    runtime: &CliRuntime,
    request: &NodeRequest,
    extra_args: &[String],
) -> Result<Node, NodeError> {
    let proxy = ProxyDetails::from_env()?;
    create_node_with_proxy(runtime, request, &proxy, extra_args).await
}

/// Create a node with explicit proxy settings.
///
/// A runtime failure still yields the node handle inside
/// [`NodeError::Create`], so a partially created container can be removed.
pub async fn create_node_with_proxy(
    runtime: &CliRuntime,
    request: &NodeRequest,
    proxy: &ProxyDetails,
    extra_args: &[String],
) -> Result<Node, NodeError> {
    let userns_remap = runtime.userns_remap().await;
    let run_args = node_run_args(request, proxy, extra_args, userns_remap);

    let base_mount = kernel_modules_mount();
    let mounts: Vec<Mount> = request
        .mounts
        .iter()
        .filter(|mount| {
            let duplicate = **mount == base_mount;
            if duplicate {
                tracing::debug!("{} is already mounted on every node", mount.host_path);
            }
            !duplicate
        })
        .cloned()
        .collect();

    let options = CreateOptions::new()
        .run_args(run_args)
        .mounts(mounts)
        .port_mappings(request.port_mappings.clone());

    tracing::info!(
        "creating {} node {} from {}",
        request.role,
        request.name,
        request.image
    );
    let node = Node::from_name(request.name.clone());
    match runtime.create_container(&request.image, &options).await {
        Ok(()) => Ok(node),
        Err(source) => Err(NodeError::Create { node, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NodeRequest {
        NodeRequest {
            name: "n1".to_string(),
            image: "kindest/node:v1.16.2".to_string(),
            cluster_label: "io.nodectr.cluster=demo".to_string(),
            role: Role::ControlPlane,
            mounts: Vec::new(),
            port_mappings: Vec::new(),
        }
    }

    #[test]
    fn base_args_are_in_fixed_order() {
        assert_eq!(
            base_run_args(&request()),
            vec![
                "-d",
                "-t",
                "--privileged",
                "--security-opt",
                "seccomp=unconfined",
                "--tmpfs",
                "/tmp",
                "--tmpfs",
                "/run",
                "--volume=/lib/modules:/lib/modules:ro",
                "--hostname",
                "n1",
                "--name",
                "n1",
                "--label",
                "io.nodectr.cluster=demo",
                "--label",
                "io.nodectr.role=control-plane",
            ]
        );
    }

    #[test]
    fn proxy_then_extra_then_userns() {
        let proxy = ProxyDetails::from_pairs([("HTTP_PROXY", "http://p:3128")]);
        let extra = vec!["--expose".to_string(), "6443".to_string()];

        let args = node_run_args(&request(), &proxy, &extra, true);
        let tail: Vec<&str> = args[base_run_args(&request()).len()..]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(
            tail,
            vec![
                "-e",
                "HTTP_PROXY=http://p:3128",
                "--expose",
                "6443",
                "--userns=host"
            ]
        );
    }

    #[test]
    fn userns_flag_only_when_remapped() {
        let args = node_run_args(&request(), &ProxyDetails::default(), &[], false);
        assert!(!args.iter().any(|a| a == "--userns=host"));
    }
}
