use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::assets::media::{EncodedMedia, MediaRef, download_file_name};
use crate::foundation::error::StudioResult;
use crate::generate::request::{AspectRatio, GenerationRequest, ImageRequest, VideoRequest};
use crate::generate::tools::{EditMode, EditTool};

/// Unique, increasing identifier for a history entry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ResultId(pub u64);

static LAST_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl ResultId {
    /// Allocate the next id: the current time in milliseconds, bumped past any id already issued.
    pub fn next() -> Self {
        let now = now_millis();
        let mut prev = LAST_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match LAST_ID.compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return ResultId(candidate),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Parameters a result was produced with. Enough to submit the same request again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationParams {
    /// Image synthesis parameters.
    Image {
        /// Prompt as typed.
        prompt: String,
        /// Style name.
        style: String,
        /// Aspect ratio.
        aspect_ratio: AspectRatio,
    },
    /// Video synthesis parameters.
    Video {
        /// Prompt as typed.
        prompt: String,
        /// Aspect ratio label.
        aspect_ratio: String,
        /// Source image for image-to-video.
        source_image: Option<EncodedMedia>,
    },
    /// Image edit parameters.
    Edit {
        /// Tool used.
        tool: EditTool,
        /// Auto or brush.
        mode: EditMode,
    },
}

impl GenerationParams {
    /// Capture the parameters of a request.
    pub fn of(request: &GenerationRequest) -> Self {
        match request {
            GenerationRequest::Image(r) => GenerationParams::Image {
                prompt: r.prompt().to_string(),
                style: r.style().to_string(),
                aspect_ratio: r.aspect_ratio(),
            },
            GenerationRequest::Video(r) => GenerationParams::Video {
                prompt: r.prompt().to_string(),
                aspect_ratio: r.aspect_ratio().to_string(),
                source_image: r.source_image().cloned(),
            },
            GenerationRequest::Edit(r) => GenerationParams::Edit {
                tool: r.tool(),
                mode: r.mode(),
            },
        }
    }

    /// Rebuild a request with the same parameters.
    ///
    /// Edits cannot be replayed without their base image and mask, so they yield `None`.
    pub fn replay(&self) -> Option<StudioResult<GenerationRequest>> {
        match self {
            GenerationParams::Image {
                prompt,
                style,
                aspect_ratio,
            } => Some(
                ImageRequest::new(prompt.clone(), style.clone(), *aspect_ratio)
                    .map(GenerationRequest::Image),
            ),
            GenerationParams::Video {
                prompt,
                aspect_ratio,
                source_image,
            } => Some(
                match source_image {
                    Some(img) => VideoRequest::from_image(
                        prompt.clone(),
                        aspect_ratio.clone(),
                        Some(img.clone()),
                    ),
                    None => VideoRequest::from_text(prompt.clone(), aspect_ratio.clone()),
                }
                .map(GenerationRequest::Video),
            ),
            GenerationParams::Edit { .. } => None,
        }
    }
}

/// A finished generation. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationResult {
    /// Unique id, usable as a list key.
    pub id: ResultId,
    /// Prompt as the user typed it, or the tool instruction for edits.
    pub instruction: String,
    /// The generated asset.
    pub output: MediaRef,
    /// Parameters used.
    pub params: GenerationParams,
}

impl GenerationResult {
    /// Build a result for `request`, allocating a fresh id.
    pub fn new(request: &GenerationRequest, output: MediaRef) -> Self {
        let instruction = match request {
            GenerationRequest::Image(r) => r.prompt().to_string(),
            GenerationRequest::Video(r) => r.prompt().to_string(),
            GenerationRequest::Edit(r) => r.tool_prompt().to_string(),
        };
        Self {
            id: ResultId::next(),
            instruction,
            output,
            params: GenerationParams::of(request),
        }
    }

    /// File name offered when downloading this result.
    pub fn download_name(&self) -> String {
        match &self.params {
            GenerationParams::Image { prompt, .. } => download_file_name(prompt, "png"),
            GenerationParams::Video { prompt, .. } => download_file_name(prompt, "mp4"),
            GenerationParams::Edit { tool, .. } => {
                format!("edited_{}_{}.png", tool.slug(), self.id.0)
            }
        }
    }
}

/// Most-recent-first, unbounded, in-memory result list.
///
/// Entries are shared read-only; nothing hands out a mutable reference to one.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<Arc<GenerationResult>>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a result and return the shared handle.
    pub fn push(&mut self, result: GenerationResult) -> Arc<GenerationResult> {
        let entry = Arc::new(result);
        self.entries.insert(0, Arc::clone(&entry));
        entry
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&Arc<GenerationResult>> {
        self.entries.first()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: ResultId) -> Option<&Arc<GenerationResult>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<GenerationResult>> {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/history.rs"]
mod tests;
