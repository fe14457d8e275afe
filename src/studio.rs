pub mod editor;
pub mod image_gen;
pub mod video_gen;

use std::sync::Arc;

use crate::config::StudioConfig;
use crate::foundation::error::StudioResult;
use crate::lifecycle::orchestrator::{Orchestrator, OrchestratorOpts};
use crate::provider::{AnyProvider, MediaProvider};

use self::editor::Editor;
use self::image_gen::ImageGenerator;
use self::video_gen::VideoGenerator;

/// Entry point wiring configuration, a provider and the three action sites together.
pub struct Studio<P> {
    config: StudioConfig,
    orchestrator: Arc<Orchestrator<P>>,
}

impl Studio<AnyProvider> {
    /// Build a studio whose provider is chosen by credential presence.
    pub fn from_config(config: StudioConfig) -> StudioResult<Self> {
        let provider = AnyProvider::from_config(&config)?;
        tracing::info!(provider = provider.name(), "studio ready");
        Ok(Self::new(provider, config))
    }

    /// Whether requests are served by the mock provider.
    pub fn is_mock(&self) -> bool {
        self.orchestrator.provider().is_mock()
    }
}

impl<P: MediaProvider + 'static> Studio<P> {
    /// Build a studio over an explicit provider.
    pub fn new(provider: P, config: StudioConfig) -> Self {
        let opts = OrchestratorOpts::from_config(&config);
        Self {
            config,
            orchestrator: Arc::new(Orchestrator::new(provider, opts)),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Shared orchestrator.
    pub fn orchestrator(&self) -> &Arc<Orchestrator<P>> {
        &self.orchestrator
    }

    /// A new image generator form bound to the image site.
    pub fn image_generator(&self) -> ImageGenerator<P> {
        ImageGenerator::new(Arc::clone(&self.orchestrator))
    }

    /// A new video generator form bound to the video site.
    pub fn video_generator(&self) -> VideoGenerator<P> {
        VideoGenerator::new(Arc::clone(&self.orchestrator))
    }

    /// A new editor session bound to the edit site.
    pub fn editor(&self) -> Editor<P> {
        Editor::new(
            Arc::clone(&self.orchestrator),
            self.config.container_width,
            self.config.default_brush_diameter,
        )
    }
}
