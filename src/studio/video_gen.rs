use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::assets::media::EncodedMedia;
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::history::{GenerationResult, ResultId};
use crate::generate::request::{GenerationRequest, OperationKind, VIDEO_ASPECT_RATIOS, VideoRequest};
use crate::lifecycle::orchestrator::Orchestrator;
use crate::lifecycle::site::ActionSite;
use crate::lifecycle::state::LifecycleState;
use crate::provider::MediaProvider;
use crate::studio::image_gen::replay;

/// Input mode of the video generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoTab {
    /// Prompt only.
    #[default]
    TextToVideo,
    /// Prompt plus a source image.
    ImageToVideo,
}

/// Text/image-to-video form and its action site.
pub struct VideoGenerator<P> {
    orchestrator: Arc<Orchestrator<P>>,
    tab: VideoTab,
    prompt: String,
    aspect_ratio: &'static str,
    source_image: Option<EncodedMedia>,
}

impl<P: MediaProvider + 'static> VideoGenerator<P> {
    /// Empty text-to-video form in widescreen.
    pub fn new(orchestrator: Arc<Orchestrator<P>>) -> Self {
        Self {
            orchestrator,
            tab: VideoTab::default(),
            prompt: String::new(),
            aspect_ratio: VIDEO_ASPECT_RATIOS[0],
            source_image: None,
        }
    }

    /// Active tab.
    pub fn tab(&self) -> VideoTab {
        self.tab
    }

    /// Switch tabs. The source image is kept.
    pub fn set_tab(&mut self, tab: VideoTab) {
        self.tab = tab;
    }

    /// Prompt as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replace the prompt.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Selected aspect ratio label.
    pub fn aspect_ratio(&self) -> &str {
        self.aspect_ratio
    }

    /// Select one of [`VIDEO_ASPECT_RATIOS`], by full label or by its ratio prefix (`"9:16"`).
    pub fn set_aspect_ratio(&mut self, label: &str) -> StudioResult<()> {
        let wanted = label.trim();
        self.aspect_ratio = VIDEO_ASPECT_RATIOS
            .into_iter()
            .find(|l| *l == wanted || l.split_whitespace().next() == Some(wanted))
            .ok_or_else(|| StudioError::validation(format!("unsupported aspect ratio '{label}'")))?;
        Ok(())
    }

    /// Source image for image-to-video.
    pub fn source_image(&self) -> Option<&EncodedMedia> {
        self.source_image.as_ref()
    }

    /// Attach a source image. The bytes must be a recognizable image.
    pub fn set_source_image(&mut self, bytes: Vec<u8>) -> StudioResult<()> {
        self.source_image = Some(EncodedMedia::sniff_image(bytes)?);
        Ok(())
    }

    /// Drop the source image.
    pub fn clear_source_image(&mut self) {
        self.source_image = None;
    }

    /// Request built from the form for the active tab.
    pub fn request(&self) -> StudioResult<VideoRequest> {
        match self.tab {
            VideoTab::TextToVideo => VideoRequest::from_text(self.prompt.clone(), self.aspect_ratio),
            VideoTab::ImageToVideo => VideoRequest::from_image(
                self.prompt.clone(),
                self.aspect_ratio,
                self.source_image.clone(),
            ),
        }
    }

    /// Submit the form.
    pub fn generate(
        &self,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        self.generate_with_cancel(CancellationToken::new())
    }

    /// Submit the form; cancelling `cancel` abandons the job and its polling.
    pub fn generate_with_cancel(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        let submitted = self.request().map(|r| {
            self.orchestrator
                .submit_with_cancel(GenerationRequest::Video(r), cancel)
        });
        async move { submitted?.await }
    }

    /// Submit the parameters of an earlier result again, producing a new entry.
    pub fn regenerate(
        &self,
        id: ResultId,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        let submitted = replay(self.site(), id).map(|r| self.orchestrator.submit(r));
        async move { submitted?.await }
    }

    /// The video action site.
    pub fn site(&self) -> &Arc<ActionSite> {
        self.orchestrator.site(OperationKind::VideoGeneration)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.site().state()
    }

    /// Current loading message, present only while a job is pending.
    pub fn progress(&self) -> Option<String> {
        self.site().progress()
    }

    /// Generated videos, most recent first.
    pub fn history(&self) -> Vec<Arc<GenerationResult>> {
        self.site().history()
    }
}
