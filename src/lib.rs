//! Auramatic is the core of a creative studio: mask painting over a base image plus generation
//! lifecycles for images, videos and image edits driven against a generative media API.
//!
//! # Overview
//!
//! 1. **Mask**: pointer samples become round-capped, anti-aliased segments on a [`MaskSurface`]
//!    via the [`StrokeRenderer`]. The surface exports a lossless PNG snapshot on every stroke end.
//! 2. **Requests**: [`ImageRequest`], [`VideoRequest`] and [`EditRequest`] are immutable value
//!    objects built from user input and validated at construction.
//! 3. **Lifecycle**: the [`Orchestrator`] drives one [`ActionSite`] per operation kind through
//!    `Idle -> Pending -> Succeeded | Failed`, with at most one pending request per site.
//! 4. **Provider**: a [`MediaProvider`] talks to the upstream API. [`AnyProvider`] picks the live
//!    client when a credential is configured and a deterministic mock otherwise.
//!
//! The [`Studio`] ties these together behind the [`ImageGenerator`], [`VideoGenerator`] and
//! [`Editor`] controllers.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod generate;
mod lifecycle;
mod logging;
mod mask;
mod provider;
mod studio;

pub use assets::decode::{
    EMPTY_RESPONSE_MESSAGE, INVALID_FORMAT_MESSAGE, decode_base_image, decode_base_image_bytes,
    decode_edit_response, decode_image_payload, strip_code_fences,
};
pub use assets::media::{
    BaseImage, EncodedMedia, MP4_MIME, MediaRef, PNG_MIME, VideoResource, download_file_name,
};
pub use config::{DEFAULT_API_BASE, MOCK_VIDEO_URL, MockOpts, ModelConfig, StudioConfig};
pub use foundation::core::{MASK_TINT, PixelSize, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{ErrorCode, StudioError, StudioResult};
pub use generate::history::{GenerationParams, GenerationResult, History, ResultId};
pub use generate::request::{
    AspectRatio, DEFAULT_STYLE, EDIT_OUTPUT_SUFFIX, EditRequest, GenerationRequest, IMAGE_STYLES,
    ImageRequest, OperationKind, VIDEO_ASPECT_RATIOS, VideoRequest,
};
pub use generate::tools::{EditMode, EditTool};
pub use lifecycle::orchestrator::{
    IMAGE_FAILURE_MESSAGE, Orchestrator, OrchestratorOpts, VIDEO_FAILURE_MESSAGE,
};
pub use lifecycle::poll::{NO_VIDEO_LINK_MESSAGE, PollSettings, poll_until_done};
pub use lifecycle::progress::{ProgressPlan, VIDEO_LOADING_MESSAGES};
pub use lifecycle::site::{ActionSite, LifecycleStats};
pub use lifecycle::state::{Failure, LifecycleState};
pub use logging::{LoggingConfig, init_logging};
pub use mask::brush::{Brush, BrushMode};
pub use mask::preview::compose_preview;
pub use mask::stroke::{StrokeRenderer, render_segment};
pub use mask::surface::MaskSurface;
pub use provider::{AnyProvider, GeminiProvider, MediaProvider, MockProvider, VideoOperation};
pub use studio::Studio;
pub use studio::editor::Editor;
pub use studio::image_gen::ImageGenerator;
pub use studio::video_gen::{VideoGenerator, VideoTab};

pub use tokio_util::sync::CancellationToken;
