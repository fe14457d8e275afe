/// The image editor's tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTool {
    /// Background remover.
    Background,
    /// Text remover.
    Text,
    /// Object remover (brush only).
    Object,
    /// Image enhancer (auto only).
    Enhancer,
}

/// Whether an edit is driven by a painted mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Whole-image instruction, no mask.
    Auto,
    /// Instruction restricted to the painted mask.
    Brush,
}

impl EditTool {
    /// Every tool, in display order.
    pub const ALL: [EditTool; 4] = [
        EditTool::Background,
        EditTool::Text,
        EditTool::Object,
        EditTool::Enhancer,
    ];

    /// Stable lowercase identifier, used in file names and the CLI.
    pub fn slug(self) -> &'static str {
        match self {
            EditTool::Background => "background",
            EditTool::Text => "text",
            EditTool::Object => "object",
            EditTool::Enhancer => "enhancer",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            EditTool::Background => "Background Remover",
            EditTool::Text => "Text Remover",
            EditTool::Object => "Object Remover",
            EditTool::Enhancer => "Image Enhancer",
        }
    }

    /// One-line help text.
    pub fn description(self) -> &'static str {
        match self {
            EditTool::Background => {
                "Upload an image to automatically remove the background. Use the brush to refine the selection."
            }
            EditTool::Text => {
                "Automatically detect and remove text. Use the brush to select any remaining text."
            }
            EditTool::Object => "Use the brush to paint over an object or defect you want to remove.",
            EditTool::Enhancer => "Automatically improve image quality, color, and sharpness.",
        }
    }

    /// Instruction for the whole-image mode, if the tool has one.
    pub fn auto_prompt(self) -> Option<&'static str> {
        match self {
            EditTool::Background => Some(
                "Remove the background from this image. The output must be a PNG with a transparent background.",
            ),
            EditTool::Text => Some(
                "Detect and remove all text from this image, seamlessly filling in the background (inpainting).",
            ),
            EditTool::Object => None,
            EditTool::Enhancer => Some(
                "Enhance the quality of this image. Improve sharpness, color balance, and lighting.",
            ),
        }
    }

    /// Instruction for the masked mode, if the tool has one.
    pub fn brush_prompt(self) -> Option<&'static str> {
        match self {
            EditTool::Background => Some(
                "From the main image, remove the background and also remove the area specified in the provided mask image. The output must be a PNG with a transparent background.",
            ),
            EditTool::Text => Some(
                "From the main image, remove the text located in the area specified by the provided mask image. Seamlessly fill in the background (inpainting).",
            ),
            EditTool::Object => Some(
                "Remove the object from the main image that is located in the area specified by the provided mask image. Seamlessly fill in the background (inpainting).",
            ),
            EditTool::Enhancer => None,
        }
    }

    /// Instruction for `mode`, if supported.
    pub fn prompt(self, mode: EditMode) -> Option<&'static str> {
        match mode {
            EditMode::Auto => self.auto_prompt(),
            EditMode::Brush => self.brush_prompt(),
        }
    }

    /// The enhancer runs as soon as an image is uploaded.
    pub fn runs_on_upload(self) -> bool {
        matches!(self, EditTool::Enhancer)
    }

    /// Parse a slug produced by [`slug`](Self::slug).
    pub fn from_slug(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == s)
    }
}
