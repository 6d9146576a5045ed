// ABOUTME: Runtime detection for the local system.
// ABOUTME: Honors explicit config, otherwise searches PATH for docker then podman.

use super::types::{DEFAULT_RUNTIME, RuntimeConfig, RuntimeInfo, RuntimeType};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("runtime executable not found: {0}")]
    BinaryNotFound(PathBuf),
}

/// Resolve the runtime to use on the local system.
///
/// Resolution order:
/// 1. Explicit `binary` and/or `runtime` from `config`
/// 2. `docker` on `PATH`
/// 3. `podman` on `PATH`
/// 4. The default runtime name, left for the executor to resolve
pub fn detect_local(config: Option<&RuntimeConfig>) -> Result<RuntimeInfo, DetectionError> {
    let path_var = std::env::var_os("PATH");
    detect_with_path(config, path_var.as_deref())
}

fn detect_with_path(
    config: Option<&RuntimeConfig>,
    path_var: Option<&OsStr>,
) -> Result<RuntimeInfo, DetectionError> {
    if let Some(cfg) = config {
        if let Some(binary) = &cfg.binary {
            let runtime_type = cfg
                .runtime
                .or_else(|| guess_from_binary(binary))
                .unwrap_or(DEFAULT_RUNTIME);
            // An explicit path must exist; a bare name is resolved by the executor.
            if binary.contains(std::path::MAIN_SEPARATOR) && !Path::new(binary).exists() {
                return Err(DetectionError::BinaryNotFound(PathBuf::from(binary)));
            }
            return Ok(RuntimeInfo {
                runtime_type,
                binary: binary.clone(),
            });
        }
        if let Some(runtime_type) = cfg.runtime {
            return Ok(RuntimeInfo {
                runtime_type,
                binary: runtime_type.binary_name().to_string(),
            });
        }
    }

    for runtime_type in [RuntimeType::Docker, RuntimeType::Podman] {
        if find_on_path(runtime_type.binary_name(), path_var).is_some() {
            tracing::debug!("detected {} on PATH", runtime_type);
            return Ok(RuntimeInfo {
                runtime_type,
                binary: runtime_type.binary_name().to_string(),
            });
        }
    }

    Ok(RuntimeInfo {
        runtime_type: DEFAULT_RUNTIME,
        binary: DEFAULT_RUNTIME.binary_name().to_string(),
    })
}

fn guess_from_binary(binary: &str) -> Option<RuntimeType> {
    let file_name = Path::new(binary).file_name()?.to_str()?;
    file_name.parse().ok()
}

fn find_on_path(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    std::env::split_paths(path_var?)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
