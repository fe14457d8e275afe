//! The media-generation collaborator contract.
//!
//! The orchestrator only talks to a [`MediaProvider`]. Live and mock behavior are two
//! implementations of the same contract; [`AnyProvider`] picks one from configuration.

pub mod gemini;
pub mod mock;

use std::future::Future;

use crate::assets::media::{EncodedMedia, VideoResource};
use crate::config::StudioConfig;
use crate::foundation::error::StudioResult;
use crate::generate::request::{EditRequest, ImageRequest, VideoRequest};

pub use gemini::GeminiProvider;
pub use mock::MockProvider;

/// Handle to a long-running video job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoOperation {
    /// Opaque operation name used for polling.
    pub name: String,
    /// Whether the job reached a terminal state.
    pub done: bool,
    /// Retrievable video link once done.
    pub video_uri: Option<String>,
    /// Failure reported by the job, if any.
    pub error: Option<String>,
}

impl VideoOperation {
    /// A job that is still running.
    pub fn running(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            video_uri: None,
            error: None,
        }
    }

    /// A job that finished with a video link.
    pub fn finished(name: impl Into<String>, video_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            video_uri: Some(video_uri.into()),
            error: None,
        }
    }
}

/// Contract for the upstream generative media API.
pub trait MediaProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Synthesize images for a prompt. Returns at least one encoded image on success.
    fn generate_images(
        &self,
        request: &ImageRequest,
    ) -> impl Future<Output = StudioResult<Vec<EncodedMedia>>> + Send;

    /// Start a video job and return its handle.
    fn start_video(
        &self,
        request: &VideoRequest,
    ) -> impl Future<Output = StudioResult<VideoOperation>> + Send;

    /// Re-check a video job.
    fn poll_video(
        &self,
        operation: &VideoOperation,
    ) -> impl Future<Output = StudioResult<VideoOperation>> + Send;

    /// Retrieve a finished video.
    fn fetch_video(&self, uri: &str) -> impl Future<Output = StudioResult<VideoResource>> + Send;

    /// Edit an image. Returns the raw text answer, which embeds a base64 image.
    fn edit_image(&self, request: &EditRequest) -> impl Future<Output = StudioResult<String>> + Send;
}

/// Provider selected from configuration: live when a credential is present, mock otherwise.
#[derive(Debug)]
pub enum AnyProvider {
    /// Live HTTP client.
    Live(GeminiProvider),
    /// Deterministic offline stand-in.
    Mock(MockProvider),
}

impl AnyProvider {
    /// Pick the implementation based on credential presence.
    pub fn from_config(config: &StudioConfig) -> StudioResult<Self> {
        match config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok(AnyProvider::Live(GeminiProvider::new(config, key)?)),
            None => {
                tracing::warn!("API_KEY environment variable not set. Using mock data.");
                Ok(AnyProvider::Mock(MockProvider::new(config.mock.clone())))
            }
        }
    }

    /// Whether calls are served by the mock.
    pub fn is_mock(&self) -> bool {
        matches!(self, AnyProvider::Mock(_))
    }
}

impl MediaProvider for AnyProvider {
    fn name(&self) -> &str {
        match self {
            AnyProvider::Live(p) => p.name(),
            AnyProvider::Mock(p) => p.name(),
        }
    }

    async fn generate_images(&self, request: &ImageRequest) -> StudioResult<Vec<EncodedMedia>> {
        match self {
            AnyProvider::Live(p) => p.generate_images(request).await,
            AnyProvider::Mock(p) => p.generate_images(request).await,
        }
    }

    async fn start_video(&self, request: &VideoRequest) -> StudioResult<VideoOperation> {
        match self {
            AnyProvider::Live(p) => p.start_video(request).await,
            AnyProvider::Mock(p) => p.start_video(request).await,
        }
    }

    async fn poll_video(&self, operation: &VideoOperation) -> StudioResult<VideoOperation> {
        match self {
            AnyProvider::Live(p) => p.poll_video(operation).await,
            AnyProvider::Mock(p) => p.poll_video(operation).await,
        }
    }

    async fn fetch_video(&self, uri: &str) -> StudioResult<VideoResource> {
        match self {
            AnyProvider::Live(p) => p.fetch_video(uri).await,
            AnyProvider::Mock(p) => p.fetch_video(uri).await,
        }
    }

    async fn edit_image(&self, request: &EditRequest) -> StudioResult<String> {
        match self {
            AnyProvider::Live(p) => p.edit_image(request).await,
            AnyProvider::Mock(p) => p.edit_image(request).await,
        }
    }
}
