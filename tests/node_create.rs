// ABOUTME: Integration tests for node creation through a scripted runtime.
// ABOUTME: Checks the full run argv, failure handling, userns probing, and proxy forwarding.

mod support;

use nodectr::node::{ErrorKind, NodeError, NodeSpec, PROXY_VARS, ProxyDetails, Role};
use nodectr::runtime::{MappingError, Mount, PortMapping, PullPolicy};
use nodectr::types::{ImageRef, NodeName};
use support::ScriptedExecutor;

const IMAGE: &str = "kindest/node:v1.16.2";

fn control_plane() -> NodeSpec {
    let mut spec = NodeSpec::new(
        NodeName::new("n1").unwrap(),
        "control-plane",
        ImageRef::parse(IMAGE).unwrap(),
    );
    spec.profile = "demo".to_string();
    spec.mounts = vec![Mount::new("/lib/modules", "/lib/modules").readonly(true)];
    spec.ports = vec![PortMapping::new(6443, 6443)];
    spec
}

/// Run `f` on a fresh runtime with no proxy variables set.
fn without_proxy<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    temp_env::with_vars_unset(PROXY_VARS, || {
        tokio::runtime::Runtime::new().unwrap().block_on(f)
    })
}

/// The single `run` invocation with `-e KEY=VALUE` pairs removed.
fn run_argv_without_env(executor: &ScriptedExecutor) -> Vec<String> {
    let runs = executor.calls_to("run");
    assert_eq!(runs.len(), 1, "expected exactly one run: {runs:?}");
    let mut argv = Vec::new();
    let mut iter = runs[0].iter();
    while let Some(arg) = iter.next() {
        if arg == "-e" {
            iter.next();
            continue;
        }
        argv.push(arg.clone());
    }
    argv
}

#[test]
fn control_plane_run_argv_is_in_fixed_order() {
    support::init_tracing();
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();

    let node = without_proxy(control_plane().create(&runtime, &PullPolicy::default())).unwrap();
    assert_eq!(node.name(), "n1");

    assert_eq!(
        run_argv_without_env(&executor),
        vec![
            "docker",
            "run",
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
            "--publish=6443:6443",
            IMAGE,
        ]
    );
}

#[test]
fn present_image_is_checked_before_userns_check_and_run() {
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();

    without_proxy(control_plane().create(&runtime, &PullPolicy::default())).unwrap();

    let subcommands: Vec<String> = executor.calls().iter().map(|c| c[1].clone()).collect();
    assert_eq!(subcommands, vec!["inspect", "info", "run"]);
    assert!(executor.calls_to("pull").is_empty());
}

#[test]
fn unknown_role_issues_no_runtime_command() {
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();
    let spec = NodeSpec::new(
        NodeName::new("n1").unwrap(),
        "etcd",
        ImageRef::parse(IMAGE).unwrap(),
    );

    let err = without_proxy(spec.create(&runtime, &PullPolicy::default())).unwrap_err();
    assert!(matches!(err, NodeError::UnknownRole(ref role) if role == "etcd"));
    assert_eq!(err.kind(), ErrorKind::UnknownRole);
    assert!(executor.calls().is_empty());
}

#[test]
fn invalid_mappings_issue_no_runtime_command() {
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();
    let mut spec = control_plane();
    spec.mounts = vec![Mount::new("", "/x")];
    spec.ports = vec![PortMapping::new(0, 80)];

    let err = without_proxy(spec.create(&runtime, &PullPolicy::default())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidMapping);
    assert!(matches!(
        err,
        NodeError::InvalidMapping(MappingError::EmptyHostPath)
    ));
    assert!(executor.calls().is_empty());
}

#[test]
fn zero_port_issues_no_runtime_command() {
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();
    let mut spec = control_plane();
    spec.ports = vec![PortMapping::new(0, 80)];

    let err = without_proxy(spec.create(&runtime, &PullPolicy::default())).unwrap_err();
    assert!(matches!(
        err,
        NodeError::InvalidMapping(MappingError::ZeroPort { host_port: 0, container_port: 80 })
    ));
    assert!(executor.calls().is_empty());
}

#[test]
fn failed_run_still_returns_handle() {
    let executor = ScriptedExecutor::new();
    executor.fail(&["run"], &["Error response from daemon: Conflict."]);
    let runtime = executor.runtime();

    let err = without_proxy(control_plane().create(&runtime, &PullPolicy::default())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Create);
    assert_eq!(err.node().map(|n| n.name()), Some("n1"));
    assert!(err.to_string().contains("Conflict"));
    assert!(!err.is_transient());
}

#[test]
fn userns_remap_adds_host_userns() {
    let executor = ScriptedExecutor::new();
    executor.on(
        &["info"],
        &[r#"["name=seccomp,profile=default","name=userns"]"#],
    );
    let runtime = executor.runtime();

    without_proxy(control_plane().create(&runtime, &PullPolicy::default())).unwrap();

    let argv = run_argv_without_env(&executor);
    let userns = argv.iter().position(|a| a == "--userns=host").unwrap();
    let publish = argv.iter().position(|a| a == "--publish=6443:6443").unwrap();
    assert!(userns < publish);
}

#[test]
fn failing_daemon_info_means_no_userns_flag() {
    let executor = ScriptedExecutor::new();
    executor.fail(&["info"], &["Cannot connect to the Docker daemon"]);
    let runtime = executor.runtime();

    without_proxy(control_plane().create(&runtime, &PullPolicy::default())).unwrap();

    assert!(!run_argv_without_env(&executor).contains(&"--userns=host".to_string()));
}

#[test]
fn proxy_environment_is_forwarded() {
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();

    let vars = [
        ("HTTP_PROXY", Some("http://proxy:3128")),
        ("NO_PROXY", Some("localhost")),
        ("HTTPS_PROXY", Some("")),
        ("http_proxy", None),
        ("https_proxy", None),
        ("no_proxy", None),
    ];
    temp_env::with_vars(vars, || {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(control_plane().create(&runtime, &PullPolicy::default()))
            .unwrap();
    });

    let run = &executor.calls_to("run")[0];
    let env_values: Vec<&str> = run
        .windows(2)
        .filter(|pair| pair[0] == "-e")
        .map(|pair| pair[1].as_str())
        .collect();
    assert_eq!(
        env_values,
        vec!["HTTP_PROXY=http://proxy:3128", "NO_PROXY=localhost"]
    );
}

#[cfg(unix)]
#[test]
fn non_unicode_proxy_fails_before_any_command() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();
    let bad = OsStr::from_bytes(b"http://\xff:3128");

    let err = temp_env::with_var("HTTP_PROXY", Some(bad), || {
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(control_plane().create(&runtime, &PullPolicy::default()))
            .unwrap_err()
    });
    assert_eq!(err.kind(), ErrorKind::ProxySetup);
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn explicit_proxy_and_extra_args_follow_base_args() {
    let executor = ScriptedExecutor::new();
    let runtime = executor.runtime();
    let mut spec = control_plane();
    spec.api_server_port = Some(38443);

    let role: Role = spec.role().unwrap();
    let (request, extra_args) = spec.request(role);
    let proxy = ProxyDetails::from_pairs([("HTTPS_PROXY", "http://p")]);
    nodectr::node::create_node_with_proxy(&runtime, &request, &proxy, &extra_args)
        .await
        .unwrap();

    let run = &executor.calls_to("run")[0];
    let tail: Vec<&str> = run
        .iter()
        .skip_while(|a| *a != "io.nodectr.role=control-plane")
        .skip(1)
        .map(String::as_str)
        .collect();
    assert_eq!(
        tail,
        vec![
            "-e",
            "HTTPS_PROXY=http://p",
            "--expose",
            "38443",
            "--publish=6443:6443",
            "--publish=127.0.0.1:38443:6443",
            IMAGE,
        ]
    );
}
