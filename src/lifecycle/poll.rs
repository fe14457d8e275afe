use std::time::Duration;

use crate::foundation::error::{StudioError, StudioResult};
use crate::provider::{MediaProvider, VideoOperation};

/// Failure reported when a finished video job carries no retrievable link.
pub const NO_VIDEO_LINK_MESSAGE: &str = "Video generation failed or returned no link.";

/// How a long-running job is re-checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    /// Fixed delay between status checks.
    pub interval: Duration,
    /// Overall deadline. `None` waits until the collaborator reports completion.
    pub timeout: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: None,
        }
    }
}

async fn poll_loop<P: MediaProvider>(
    provider: &P,
    mut operation: VideoOperation,
    interval: Duration,
) -> StudioResult<VideoOperation> {
    let mut checks = 0u32;
    while !operation.done {
        tokio::time::sleep(interval).await;
        operation = provider.poll_video(&operation).await?;
        checks += 1;
        tracing::debug!(operation = %operation.name, checks, done = operation.done, "polled video job");
    }
    Ok(operation)
}

/// Re-check `operation` every `settings.interval` until it reports a terminal state.
///
/// Returns the link of the finished video. A job error, a missing link or the deadline passing
/// is a failure.
pub async fn poll_until_done<P: MediaProvider>(
    provider: &P,
    operation: VideoOperation,
    settings: PollSettings,
) -> StudioResult<String> {
    let finished = match settings.timeout {
        Some(limit) => tokio::time::timeout(limit, poll_loop(provider, operation, settings.interval))
            .await
            .map_err(|_| {
                StudioError::transport(format!(
                    "video job did not finish within {} s",
                    limit.as_secs()
                ))
            })??,
        None => poll_loop(provider, operation, settings.interval).await?,
    };

    if let Some(message) = finished.error {
        return Err(StudioError::transport(message));
    }
    finished
        .video_uri
        .filter(|uri| !uri.trim().is_empty())
        .ok_or_else(|| StudioError::transport(NO_VIDEO_LINK_MESSAGE))
}
