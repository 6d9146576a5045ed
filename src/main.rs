// ABOUTME: Entry point for the nodectr CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use nodectr::config::Config;
use nodectr::error::{Error, Result};
use nodectr::exec::{ExecError, Executor};
use nodectr::node::{DEFAULT_PROFILE, Node, NodeError, list_nodes};
use nodectr::output::{Output, OutputMode};
use nodectr::runtime::{CliRuntime, RuntimeConfig, detect_local};
use std::env;
use std::io::IsTerminal;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    match run(cli, &mut output).await {
        Ok(()) => {}
        // mirror the exit status of commands run inside a node
        Err(Error::Exec(ExecError::Exit {
            code: Some(code), ..
        })) => std::process::exit(code),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let config_required = matches!(cli.command, Commands::Create { .. });
    let config = load_config(&cli, config_required)?;
    let runtime = connect(&cli, config.as_ref())?;

    match cli.command {
        Commands::Create { name, retain } => {
            let Some(config) = config else {
                return Err(Error::ConfigNotFound(env::current_dir()?));
            };
            let specs = match name {
                Some(name) => vec![config.node(&name)?.clone()],
                None => config.nodes.iter().cloned().collect(),
            };

            output.start_timer();
            for spec in &specs {
                output.progress(&format!("Creating node {}...", spec.name));
                match spec.create(&runtime, &config.pull).await {
                    Ok(node) => output.progress(&format!("  ✓ {node}")),
                    Err(NodeError::Create { node, source }) => {
                        if !retain {
                            cleanup(&runtime, &node).await;
                        }
                        return Err(NodeError::Create { node, source }.into());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            output.success(&format!("Created {} node(s)", specs.len()));
            Ok(())
        }
        Commands::Stop { name } => {
            Node::from_name(&name).stop(&runtime).await?;
            output.success(&format!("Stopped {name}"));
            Ok(())
        }
        Commands::Delete { name } => {
            Node::from_name(&name).delete(&runtime).await?;
            output.success(&format!("Deleted {name}"));
            Ok(())
        }
        Commands::List { profile } => {
            let profile = profile.unwrap_or_else(|| DEFAULT_PROFILE.to_string());
            let names = list_nodes(&runtime, &profile).await?;
            output.lines("nodes", &names);
            Ok(())
        }
        Commands::Inspect { target, format } => {
            let lines = Node::from_name(&target).inspect(&runtime, &format).await?;
            output.lines("output", &lines);
            Ok(())
        }
        Commands::Pull {
            image,
            force,
            timeout,
        } => {
            output.start_timer();
            runtime
                .ensure_image(&image, force, Duration::from_secs(timeout))
                .await?;
            output.success(&format!("Image {image} is available"));
            Ok(())
        }
        Commands::Exec { node, env, command } => {
            let Some((program, args)) = command.split_first() else {
                return Err(Error::InvalidConfig("no command given".to_string()));
            };
            let executor = Node::from_name(&node)
                .executor(&runtime)
                .tty(std::io::stdout().is_terminal());
            let mut cmd = executor.command(program, args.to_vec());
            cmd.set_env(env);
            cmd.set_stdin(Box::new(tokio::io::stdin()));
            cmd.set_stdout(Box::new(tokio::io::stdout()));
            cmd.set_stderr(Box::new(tokio::io::stderr()));
            cmd.run().await?;
            Ok(())
        }
    }
}

/// Load the configuration from `--config` or the working directory.
///
/// A missing file is only an error when the command needs one.
fn load_config(cli: &Cli, required: bool) -> Result<Option<Config>> {
    if let Some(path) = &cli.config {
        return Config::load(path).map(Some);
    }
    match Config::discover(&env::current_dir()?) {
        Ok(config) => Ok(Some(config)),
        Err(Error::ConfigNotFound(_)) if !required => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolve the runtime: flags first, then the config file, then `PATH`.
fn connect(cli: &Cli, config: Option<&Config>) -> Result<CliRuntime> {
    let from_file = config.map(Config::runtime_config).unwrap_or_default();
    let runtime_config = RuntimeConfig {
        runtime: cli.runtime.or(from_file.runtime),
        binary: cli.binary.clone().or(from_file.binary),
    };
    let info = detect_local(Some(&runtime_config))?;
    tracing::debug!("using {} runtime at {}", info.runtime_type, info.binary);
    Ok(CliRuntime::local(&info))
}

async fn cleanup(runtime: &CliRuntime, node: &Node) {
    if let Err(e) = node.delete(runtime).await {
        tracing::warn!("failed to remove partially created node {node}: {e}");
    }
}
