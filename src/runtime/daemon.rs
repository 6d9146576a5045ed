// ABOUTME: Best-effort queries of runtime daemon configuration.
// ABOUTME: Detects user-namespace remapping, which changes how nodes must be run.

use super::client::CliRuntime;

/// Marker in the daemon's security options when userns-remap is active.
const USERNS_MARKER: &str = "name=userns";

impl CliRuntime {
    /// Whether the runtime daemon has user-namespace remapping enabled.
    ///
    /// Advisory only: any failure to query the daemon is reported as `false`.
    /// Not cached, since daemon configuration can change between calls.
    pub async fn userns_remap(&self) -> bool {
        let args = vec![
            "info".to_string(),
            "--format".to_string(),
            "{{json .SecurityOptions}}".to_string(),
        ];
        match self.output_lines(args).await {
            Ok(lines) => lines
                .first()
                .is_some_and(|line| line.contains(USERNS_MARKER)),
            Err(err) => {
                tracing::debug!("userns-remap check failed, assuming disabled: {}", err);
                false
            }
        }
    }
}
