use crate::assets::media::{BaseImage, EncodedMedia};
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::tools::{EditMode, EditTool};
use crate::mask::surface::MaskSurface;

/// Image styles offered by the image generator. `Default` adds nothing to the prompt.
pub const IMAGE_STYLES: [&str; 22] = [
    "Default",
    "Leonardo Phoenix",
    "Leonardo Vision XL",
    "Leonardo Kino XL",
    "Leonardo Diffusion XL",
    "Leonardo Lightning XL",
    "AlbedoBase XL",
    "DreamShaper",
    "Absolute Reality",
    "3D Animation Style",
    "Anime",
    "Illustrative",
    "Creative",
    "Dynamic",
    "Cinematic",
    "3D Render",
    "Raytraced",
    "Isometric",
    "Vintage Style Photography",
    "Spirit Creatures",
    "Folk Art",
    "Ghibli",
];

/// Style that leaves the prompt untouched.
pub const DEFAULT_STYLE: &str = "Default";

/// Aspect ratio labels offered by the video generator.
pub const VIDEO_ASPECT_RATIOS: [&str; 6] = [
    "16:9 (Widescreen)",
    "9:16 (Tall)",
    "1:1 (Square)",
    "4:3 (Standard)",
    "3:2 (Classic Film)",
    "2.39:1 (Cinemascope)",
];

/// Suffix appended to edit instructions so the model answers with a bare base64 image.
pub const EDIT_OUTPUT_SUFFIX: &str = "The output must be a single base64 encoded string of the resulting image, without any other text or markdown formatting.";

/// Aspect ratios supported for image synthesis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 4:3
    #[serde(rename = "4:3")]
    Standard,
    /// 3:4
    #[serde(rename = "3:4")]
    Portrait,
    /// 16:9
    #[serde(rename = "16:9")]
    Widescreen,
    /// 9:16
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    /// Every ratio, in display order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Standard,
        AspectRatio::Portrait,
        AspectRatio::Widescreen,
        AspectRatio::Tall,
    ];

    /// Wire value, e.g. `16:9`.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Tall => "9:16",
        }
    }

    /// Display label, e.g. `16:9 (Widescreen)`.
    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1 (Square)",
            AspectRatio::Standard => "4:3 (Standard)",
            AspectRatio::Portrait => "3:4 (Portrait)",
            AspectRatio::Widescreen => "16:9 (Widescreen)",
            AspectRatio::Tall => "9:16 (Tall)",
        }
    }

    /// Width over height.
    pub fn ratio(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Standard => (4, 3),
            AspectRatio::Portrait => (3, 4),
            AspectRatio::Widescreen => (16, 9),
            AspectRatio::Tall => (9, 16),
        }
    }

    /// Parse a wire value.
    pub fn parse(s: &str) -> StudioResult<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| StudioError::validation(format!("unsupported aspect ratio '{s}'")))
    }
}

/// Which collaborator operation a request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Image synthesis.
    ImageGeneration,
    /// Video synthesis.
    VideoGeneration,
    /// Image editing with an optional mask.
    ImageEdit,
}

fn require_prompt(prompt: &str) -> StudioResult<String> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(StudioError::validation("prompt must not be empty"));
    }
    Ok(prompt.to_string())
}

/// Text-to-image request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    prompt: String,
    style: String,
    aspect_ratio: AspectRatio,
    image_count: u32,
}

impl ImageRequest {
    /// Build a single-image request. Fails on a blank prompt.
    pub fn new(
        prompt: impl Into<String>,
        style: impl Into<String>,
        aspect_ratio: AspectRatio,
    ) -> StudioResult<Self> {
        let prompt = require_prompt(&prompt.into())?;
        let style = style.into();
        let style = if style.trim().is_empty() {
            DEFAULT_STYLE.to_string()
        } else {
            style
        };
        Ok(Self {
            prompt,
            style,
            aspect_ratio,
            image_count: 1,
        })
    }

    /// The prompt as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Selected style.
    pub fn style(&self) -> &str {
        &self.style
    }

    /// Selected aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Number of images requested.
    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    /// Prompt sent upstream, with the style folded in.
    pub fn instruction(&self) -> String {
        if self.style == DEFAULT_STYLE {
            self.prompt.clone()
        } else {
            format!("{}, in the style of {}", self.prompt, self.style)
        }
    }
}

/// Text-to-video or image-to-video request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRequest {
    prompt: String,
    aspect_ratio: String,
    source_image: Option<EncodedMedia>,
}

impl VideoRequest {
    /// Text-to-video.
    pub fn from_text(prompt: impl Into<String>, aspect_ratio: impl Into<String>) -> StudioResult<Self> {
        Ok(Self {
            prompt: require_prompt(&prompt.into())?,
            aspect_ratio: aspect_ratio.into(),
            source_image: None,
        })
    }

    /// Image-to-video. The source image is required.
    pub fn from_image(
        prompt: impl Into<String>,
        aspect_ratio: impl Into<String>,
        source_image: Option<EncodedMedia>,
    ) -> StudioResult<Self> {
        let source_image = source_image
            .filter(|img| !img.is_empty())
            .ok_or_else(|| StudioError::validation("image-to-video requires a source image"))?;
        Ok(Self {
            prompt: require_prompt(&prompt.into())?,
            aspect_ratio: aspect_ratio.into(),
            source_image: Some(source_image),
        })
    }

    /// The prompt as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Aspect ratio label.
    pub fn aspect_ratio(&self) -> &str {
        &self.aspect_ratio
    }

    /// Source image for image-to-video.
    pub fn source_image(&self) -> Option<&EncodedMedia> {
        self.source_image.as_ref()
    }

    /// Prompt sent upstream, with the aspect ratio folded in.
    pub fn instruction(&self) -> String {
        format!("{}, aspect ratio {}", self.prompt, self.aspect_ratio)
    }
}

/// Image edit request: base image, tool instruction and an optional mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditRequest {
    tool: EditTool,
    mode: EditMode,
    image: EncodedMedia,
    mask: Option<EncodedMedia>,
}

impl EditRequest {
    /// Whole-image edit. Fails when the tool has no auto mode.
    pub fn auto(tool: EditTool, base: &BaseImage) -> StudioResult<Self> {
        if tool.auto_prompt().is_none() {
            return Err(StudioError::validation(format!(
                "{} has no automatic mode",
                tool.name()
            )));
        }
        Ok(Self {
            tool,
            mode: EditMode::Auto,
            image: base.encoded.clone(),
            mask: None,
        })
    }

    /// Masked edit. Fails when the tool has no brush mode or nothing has been painted.
    pub fn brush(tool: EditTool, base: &BaseImage, surface: &MaskSurface) -> StudioResult<Self> {
        if tool.brush_prompt().is_none() {
            return Err(StudioError::validation(format!(
                "{} has no brush mode",
                tool.name()
            )));
        }
        if surface.native_size() != base.size {
            return Err(StudioError::validation(
                "mask surface was loaded for a different base image",
            ));
        }
        if surface.is_empty() {
            return Err(StudioError::validation(
                "paint over the area to edit before applying the brush",
            ));
        }
        Ok(Self {
            tool,
            mode: EditMode::Brush,
            image: base.encoded.clone(),
            mask: Some(surface.export_snapshot()?),
        })
    }

    /// Tool that produced this request.
    pub fn tool(&self) -> EditTool {
        self.tool
    }

    /// Auto or brush.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Base image to edit.
    pub fn image(&self) -> &EncodedMedia {
        &self.image
    }

    /// Mask snapshot, present in brush mode.
    pub fn mask(&self) -> Option<&EncodedMedia> {
        self.mask.as_ref()
    }

    /// Tool instruction without the output-format suffix.
    pub fn tool_prompt(&self) -> &'static str {
        // Constructors guarantee the prompt exists for the chosen mode.
        self.tool.prompt(self.mode).unwrap_or_default()
    }

    /// Instruction sent upstream.
    pub fn instruction(&self) -> String {
        format!("{}. {}", self.tool_prompt(), EDIT_OUTPUT_SUFFIX)
    }
}

/// A request value object, constructed fresh per user action and never mutated after dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationRequest {
    /// Image synthesis.
    Image(ImageRequest),
    /// Video synthesis.
    Video(VideoRequest),
    /// Image editing.
    Edit(EditRequest),
}

impl GenerationRequest {
    /// Operation this request targets.
    pub fn operation_kind(&self) -> OperationKind {
        match self {
            GenerationRequest::Image(_) => OperationKind::ImageGeneration,
            GenerationRequest::Video(_) => OperationKind::VideoGeneration,
            GenerationRequest::Edit(_) => OperationKind::ImageEdit,
        }
    }

    /// Instruction text sent upstream.
    pub fn instruction_text(&self) -> String {
        match self {
            GenerationRequest::Image(r) => r.instruction(),
            GenerationRequest::Video(r) => r.instruction(),
            GenerationRequest::Edit(r) => r.instruction(),
        }
    }

    /// Base image reference, if the operation takes one.
    pub fn base_image(&self) -> Option<&EncodedMedia> {
        match self {
            GenerationRequest::Image(_) => None,
            GenerationRequest::Video(r) => r.source_image(),
            GenerationRequest::Edit(r) => Some(r.image()),
        }
    }

    /// Mask reference, if any.
    pub fn mask(&self) -> Option<&EncodedMedia> {
        match self {
            GenerationRequest::Edit(r) => r.mask(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/request.rs"]
mod tests;
