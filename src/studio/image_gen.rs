use std::future::Future;
use std::sync::Arc;

use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::history::{GenerationResult, ResultId};
use crate::generate::request::{
    AspectRatio, DEFAULT_STYLE, GenerationRequest, IMAGE_STYLES, ImageRequest, OperationKind,
};
use crate::lifecycle::orchestrator::Orchestrator;
use crate::lifecycle::site::ActionSite;
use crate::lifecycle::state::LifecycleState;
use crate::provider::MediaProvider;

/// Text-to-image form and its action site.
pub struct ImageGenerator<P> {
    orchestrator: Arc<Orchestrator<P>>,
    prompt: String,
    style: String,
    aspect_ratio: AspectRatio,
}

impl<P: MediaProvider + 'static> ImageGenerator<P> {
    /// Empty form with the default style and a square aspect ratio.
    pub fn new(orchestrator: Arc<Orchestrator<P>>) -> Self {
        Self {
            orchestrator,
            prompt: String::new(),
            style: DEFAULT_STYLE.to_string(),
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Prompt as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Replace the prompt.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Selected style.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Select one of [`IMAGE_STYLES`].
    pub fn set_style(&mut self, style: &str) -> StudioResult<()> {
        let found = IMAGE_STYLES
            .iter()
            .find(|s| s.eq_ignore_ascii_case(style.trim()))
            .ok_or_else(|| StudioError::validation(format!("unknown style '{style}'")))?;
        self.style = (*found).to_string();
        Ok(())
    }

    /// Selected aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Select an aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Request built from the form. Fails on a blank prompt.
    pub fn request(&self) -> StudioResult<ImageRequest> {
        ImageRequest::new(self.prompt.clone(), self.style.clone(), self.aspect_ratio)
    }

    /// Submit the form.
    ///
    /// An invalid form resolves to a validation error and leaves the lifecycle untouched.
    pub fn generate(
        &self,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        let submitted = self
            .request()
            .map(|r| self.orchestrator.submit(GenerationRequest::Image(r)));
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

    /// The image action site.
    pub fn site(&self) -> &Arc<ActionSite> {
        self.orchestrator.site(OperationKind::ImageGeneration)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.site().state()
    }

    /// Generated images, most recent first.
    pub fn history(&self) -> Vec<Arc<GenerationResult>> {
        self.site().history()
    }
}

pub(crate) fn replay(site: &ActionSite, id: ResultId) -> StudioResult<GenerationRequest> {
    let entry = site
        .find(id)
        .ok_or_else(|| StudioError::validation(format!("no result with id {}", id.0)))?;
    entry
        .params
        .replay()
        .unwrap_or_else(|| Err(StudioError::validation("this result cannot be regenerated")))
}
