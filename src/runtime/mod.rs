// ABOUTME: Container runtime CLI layer for Docker and Podman.
// ABOUTME: Argument construction, image pulls, daemon capability checks, and detection.

mod backoff;
mod client;
mod create;
mod detection;
mod error;
mod image;
pub mod mounts;
mod daemon;
mod types;

pub use backoff::ExponentialBackoff;
pub use client::CliRuntime;
pub use create::CreateOptions;
pub use detection::{DetectionError, detect_local};
pub use error::{OciError, OciErrorKind};
pub use image::PullPolicy;
pub use mounts::{MappingError, Mount, MountPropagation, PortMapping, Protocol};
pub use types::{DEFAULT_RUNTIME, RuntimeConfig, RuntimeInfo, RuntimeType};
