// ABOUTME: Library root for nodectr - node containers over a docker-compatible CLI.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod exec;
pub mod node;
pub mod output;
pub mod runtime;
pub mod types;
