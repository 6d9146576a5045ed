// ABOUTME: Listing the nodes of a profile from `ps` output.
// ABOUTME: Each line is `<names><TAB><cluster label>`; names may be comma-separated.

use super::error::NodeError;
use super::spec::CLUSTER_LABEL_KEY;
use crate::runtime::CliRuntime;

/// `ps` template emitting the container names and cluster label value.
///
/// The runtime expands the literal `\t` into a tab.
pub fn list_format() -> String {
    format!(r#"{{{{.Names}}}}\t{{{{.Label "{CLUSTER_LABEL_KEY}"}}}}"#)
}

/// Names of all node containers (running or stopped) in `profile`, in runtime order.
pub async fn list_nodes(runtime: &CliRuntime, profile: &str) -> Result<Vec<String>, NodeError> {
    let label = format!("{CLUSTER_LABEL_KEY}={profile}");
    let lines = runtime
        .list_containers(&label, &list_format())
        .await
        .map_err(|source| NodeError::List {
            profile: profile.to_string(),
            source,
        })?;
    parse_node_list(&lines)
}

/// Flatten `ps` lines into container names.
pub fn parse_node_list(lines: &[String]) -> Result<Vec<String>, NodeError> {
    let mut names = Vec::new();
    for line in lines {
        let parts: Vec<&str> = line.split('\t').collect();
        let [container_names, _label] = parts.as_slice() else {
            return Err(NodeError::Parse {
                context: "listing containers",
                line: line.clone(),
            });
        };
        // a container can carry several names
        names.extend(container_names.split(',').map(str::to_string));
    }
    Ok(names)
}
