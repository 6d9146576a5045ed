// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use nodectr::runtime::RuntimeType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodectr")]
#[command(about = "Provision cluster node containers with Docker or Podman")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: nodectr.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Container runtime to use (docker or podman)
    #[arg(long, global = true)]
    pub runtime: Option<RuntimeType>,

    /// Runtime executable name or path
    #[arg(long, global = true)]
    pub binary: Option<String>,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the node containers defined in the configuration
    Create {
        /// Only create the node with this name
        #[arg(short, long)]
        name: Option<String>,

        /// Keep containers whose creation failed instead of removing them
        #[arg(long)]
        retain: bool,
    },

    /// Pause a node container
    Stop {
        name: String,
    },

    /// Remove a node container and its volumes
    Delete {
        name: String,
    },

    /// List node containers of a profile
    List {
        /// Profile (cluster) name
        #[arg(short, long)]
        profile: Option<String>,
    },

    /// Inspect a container with a Go template
    Inspect {
        target: String,

        #[arg(short, long)]
        format: String,
    },

    /// Make an image available locally, retrying failed pulls
    Pull {
        image: String,

        /// Pull even if the image is present
        #[arg(long)]
        force: bool,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },

    /// Run a command inside a node
    Exec {
        node: String,

        /// Extra environment for the command, as KEY=VALUE
        #[arg(short, long = "env")]
        env: Vec<String>,

        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
}
