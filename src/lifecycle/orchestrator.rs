use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::assets::decode::decode_edit_response;
use crate::assets::media::MediaRef;
use crate::config::StudioConfig;
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::history::GenerationResult;
use crate::generate::request::{
    EditRequest, GenerationRequest, ImageRequest, OperationKind, VideoRequest,
};
use crate::lifecycle::poll::{PollSettings, poll_until_done};
use crate::lifecycle::progress::ProgressPlan;
use crate::lifecycle::site::ActionSite;
use crate::provider::MediaProvider;

/// Failure shown by the image generator.
pub const IMAGE_FAILURE_MESSAGE: &str = "Failed to generate image. Please try again.";
/// Failure shown by the video generator.
pub const VIDEO_FAILURE_MESSAGE: &str = "Failed to generate video. Please try again.";

/// Timing knobs for the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrchestratorOpts {
    /// Video status polling.
    pub poll: PollSettings,
    /// Progress messages shown while a video is pending.
    pub video_progress: ProgressPlan,
}

impl Default for OrchestratorOpts {
    fn default() -> Self {
        Self::from_config(&StudioConfig::default())
    }
}

impl OrchestratorOpts {
    /// Timings taken from `config`.
    pub fn from_config(config: &StudioConfig) -> Self {
        Self {
            poll: PollSettings {
                interval: config.video_poll_interval(),
                timeout: config.video_poll_timeout(),
            },
            video_progress: ProgressPlan::video(config.progress_interval()),
        }
    }
}

/// Routes requests to the collaborator and drives one lifecycle per operation kind.
///
/// Image generation, video generation and image editing are independent action sites: each
/// may be pending at the same time as the others, never twice at once.
pub struct Orchestrator<P> {
    provider: Arc<P>,
    opts: OrchestratorOpts,
    image: Arc<ActionSite>,
    video: Arc<ActionSite>,
    edit: Arc<ActionSite>,
}

impl<P> std::fmt::Debug for Orchestrator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("opts", &self.opts)
            .field("image", &self.image)
            .field("video", &self.video)
            .field("edit", &self.edit)
            .finish()
    }
}

impl<P: MediaProvider + 'static> Orchestrator<P> {
    /// Create an orchestrator over `provider`.
    pub fn new(provider: P, opts: OrchestratorOpts) -> Self {
        Self::with_shared(Arc::new(provider), opts)
    }

    /// Create an orchestrator over a provider shared with other owners.
    pub fn with_shared(provider: Arc<P>, opts: OrchestratorOpts) -> Self {
        Self {
            provider,
            opts,
            image: Arc::new(ActionSite::new("image").with_failure_message(IMAGE_FAILURE_MESSAGE)),
            video: Arc::new(
                ActionSite::new("video")
                    .with_failure_message(VIDEO_FAILURE_MESSAGE)
                    .with_progress(opts.video_progress),
            ),
            edit: Arc::new(ActionSite::new("edit")),
        }
    }

    /// The collaborator.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Timing settings.
    pub fn opts(&self) -> OrchestratorOpts {
        self.opts
    }

    /// Action site serving `kind`.
    pub fn site(&self, kind: OperationKind) -> &Arc<ActionSite> {
        match kind {
            OperationKind::ImageGeneration => &self.image,
            OperationKind::VideoGeneration => &self.video,
            OperationKind::ImageEdit => &self.edit,
        }
    }

    /// Submit without a way to cancel.
    ///
    /// See [`Orchestrator::submit_with_cancel`].
    pub fn submit(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        self.submit_with_cancel(request, CancellationToken::new())
    }

    /// Submit `request` to the site for its operation kind.
    ///
    /// The site is `Pending` (or the submit rejected as busy) when this returns; the returned
    /// future drives the request to `Succeeded` or `Failed`.
    pub fn submit_with_cancel(
        &self,
        request: GenerationRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        let kind = request.operation_kind();
        let provider = Arc::clone(&self.provider);
        let poll = self.opts.poll;
        let work_request = request.clone();
        let work = async move { dispatch(provider.as_ref(), &work_request, poll).await };
        self.site(kind).run(request, cancel, work)
    }
}

async fn dispatch<P: MediaProvider>(
    provider: &P,
    request: &GenerationRequest,
    poll: PollSettings,
) -> StudioResult<MediaRef> {
    match request {
        GenerationRequest::Image(r) => generate_image(provider, r).await,
        GenerationRequest::Video(r) => generate_video(provider, r, poll).await,
        GenerationRequest::Edit(r) => edit_image(provider, r).await,
    }
}

#[tracing::instrument(skip_all, fields(provider = provider.name(), style = request.style()))]
async fn generate_image<P: MediaProvider>(
    provider: &P,
    request: &ImageRequest,
) -> StudioResult<MediaRef> {
    let images = provider.generate_images(request).await?;
    images
        .into_iter()
        .next()
        .map(MediaRef::Image)
        .ok_or_else(|| StudioError::decode("image generation returned no images"))
}

#[tracing::instrument(skip_all, fields(provider = provider.name(), aspect = request.aspect_ratio()))]
async fn generate_video<P: MediaProvider>(
    provider: &P,
    request: &VideoRequest,
    poll: PollSettings,
) -> StudioResult<MediaRef> {
    let operation = provider.start_video(request).await?;
    let uri = poll_until_done(provider, operation, poll).await?;
    let video = provider.fetch_video(&uri).await?;
    Ok(MediaRef::Video(video))
}

#[tracing::instrument(skip_all, fields(provider = provider.name(), tool = request.tool().slug()))]
async fn edit_image<P: MediaProvider>(provider: &P, request: &EditRequest) -> StudioResult<MediaRef> {
    let text = provider.edit_image(request).await?;
    let image = decode_edit_response(&text)?;
    Ok(MediaRef::Image(image))
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/orchestrator.rs"]
mod tests;
