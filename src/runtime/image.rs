// ABOUTME: Image availability: local presence check and pulls with exponential backoff.
// ABOUTME: Retries any failed pull until the next wait would overrun the deadline.

use super::backoff::ExponentialBackoff;
use super::client::CliRuntime;
use super::error::{OciError, PullSnafu};
use serde::Deserialize;
use snafu::ResultExt;
use std::time::Duration;
use tokio::time::Instant;

/// How images are brought onto the host before nodes are created.
#[derive(Debug, Clone, Deserialize)]
pub struct PullPolicy {
    /// Pull even when the image is already present.
    #[serde(default)]
    pub force: bool,

    /// Total time allowed for pull attempts and the waits between them.
    #[serde(default = "default_pull_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PullPolicy {
    fn default() -> Self {
        Self {
            force: false,
            timeout: default_pull_timeout(),
        }
    }
}

fn default_pull_timeout() -> Duration {
    Duration::from_secs(300)
}

impl CliRuntime {
    /// Whether `image` exists in the local image store.
    pub async fn image_exists(&self, image: &str) -> bool {
        let args = vec![
            "inspect".to_string(),
            "--type=image".to_string(),
            image.to_string(),
        ];
        self.output_lines(args).await.is_ok()
    }

    /// Make sure `image` is available locally.
    ///
    /// A present image is left alone unless `force_update` is set. Otherwise the
    /// image is pulled, retrying every failure with exponential backoff until the
    /// next wait would exceed `max_wait`; the last failure is then returned.
    pub async fn ensure_image(
        &self,
        image: &str,
        force_update: bool,
        max_wait: Duration,
    ) -> Result<(), OciError> {
        if !force_update && self.image_exists(image).await {
            tracing::debug!("image {} already present", image);
            return Ok(());
        }

        let started = Instant::now();
        let mut backoff = ExponentialBackoff::default();
        let mut attempt = 1u32;
        loop {
            let err = match self.pull(image).await {
                Ok(()) => {
                    tracing::info!("pulled image {} (attempt {})", image, attempt);
                    return Ok(());
                }
                Err(err) => err,
            };

            let wait = backoff.next_interval();
            if started.elapsed() + wait > max_wait {
                tracing::warn!(
                    "giving up on image {} after {} attempt(s) in {:?}",
                    image,
                    attempt,
                    started.elapsed()
                );
                return Err(err);
            }

            tracing::warn!(
                "pull attempt {} for {} failed, retrying in {:?}: {}",
                attempt,
                image,
                wait,
                err
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    /// A single pull attempt.
    pub async fn pull(&self, image: &str) -> Result<(), OciError> {
        let args = vec!["pull".to_string(), image.to_string()];
        self.output_lines(args).await.context(PullSnafu { image })?;
        Ok(())
    }
}
