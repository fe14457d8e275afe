use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::assets::decode::decode_base_image_bytes;
use crate::assets::media::{BaseImage, EncodedMedia};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::history::GenerationResult;
use crate::generate::request::{EditRequest, GenerationRequest, OperationKind};
use crate::generate::tools::{EditMode, EditTool};
use crate::lifecycle::orchestrator::Orchestrator;
use crate::lifecycle::site::ActionSite;
use crate::lifecycle::state::LifecycleState;
use crate::mask::brush::{Brush, BrushMode};
use crate::mask::preview::compose_preview;
use crate::mask::stroke::StrokeRenderer;
use crate::mask::surface::MaskSurface;
use crate::provider::MediaProvider;

/// Edited image for the current editor session.
///
/// Each reset opens a new session; results of requests dispatched in an older session are
/// dropped when they land.
#[derive(Default)]
struct EditedSlot {
    session: u64,
    result: Option<Arc<GenerationResult>>,
}

/// Image editor: tool selection, base image, mask painting and the edit action site.
///
/// Owns the [`MaskSurface`] of the active session exclusively.
pub struct Editor<P> {
    orchestrator: Arc<Orchestrator<P>>,
    container_width: u32,
    tool: Option<EditTool>,
    mode: EditMode,
    base: Option<BaseImage>,
    surface: Option<MaskSurface>,
    stroke: StrokeRenderer,
    mask_snapshot: Option<EncodedMedia>,
    edited: Arc<Mutex<EditedSlot>>,
}

fn lock(slot: &Mutex<EditedSlot>) -> MutexGuard<'_, EditedSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P: MediaProvider + 'static> Editor<P> {
    /// Editor with no tool selected, fitting the canvas into `container_width` pixels.
    pub fn new(orchestrator: Arc<Orchestrator<P>>, container_width: u32, brush_diameter: f64) -> Self {
        Self {
            orchestrator,
            container_width,
            tool: None,
            mode: EditMode::Auto,
            base: None,
            surface: None,
            stroke: StrokeRenderer::new(Brush::paint(brush_diameter)),
            mask_snapshot: None,
            edited: Arc::new(Mutex::new(EditedSlot::default())),
        }
    }

    fn reset_edited(&self) {
        let mut slot = lock(&self.edited);
        slot.session += 1;
        slot.result = None;
    }

    /// Active tool.
    pub fn tool(&self) -> Option<EditTool> {
        self.tool
    }

    /// Select a tool. Starts a fresh session: base image, mask and edited result are discarded.
    pub fn select_tool(&mut self, tool: EditTool) {
        self.tool = Some(tool);
        self.mode = if tool.auto_prompt().is_some() {
            EditMode::Auto
        } else {
            EditMode::Brush
        };
        self.base = None;
        self.surface = None;
        self.mask_snapshot = None;
        self.stroke.cancel();
        self.reset_edited();
        tracing::debug!(tool = tool.slug(), "tool selected");
    }

    /// Active mode.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Switch between auto and brush. Fails when the active tool lacks the mode.
    pub fn set_mode(&mut self, mode: EditMode) -> StudioResult<()> {
        let tool = self.require_tool()?;
        if tool.prompt(mode).is_none() {
            return Err(StudioError::validation(format!(
                "{} does not support {mode:?} mode",
                tool.name()
            )));
        }
        self.mode = mode;
        Ok(())
    }

    fn require_tool(&self) -> StudioResult<EditTool> {
        self.tool
            .ok_or_else(|| StudioError::validation("select a tool first"))
    }

    /// Load a new base image. The mask and any edited result are reset.
    ///
    /// When the active tool runs on upload, the returned future is the automatic edit; it is
    /// `None` otherwise or while an edit is already pending.
    pub fn upload(
        &mut self,
        bytes: Vec<u8>,
    ) -> StudioResult<Option<impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P>>>
    {
        let base = decode_base_image_bytes(bytes)?;
        match self.surface.as_mut() {
            Some(surface) => surface.load(&base, self.container_width),
            None => self.surface = Some(MaskSurface::for_image(&base, self.container_width)),
        }
        self.base = Some(base);
        self.mask_snapshot = None;
        self.stroke.cancel();
        self.reset_edited();

        let auto_run = self.tool.is_some_and(EditTool::runs_on_upload)
            && self.edited().is_none()
            && !self.is_pending();
        if !auto_run {
            return Ok(None);
        }
        tracing::info!("running enhancer on upload");
        Ok(Some(self.submit(EditMode::Auto)))
    }

    /// Current base image.
    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base.as_ref()
    }

    /// Mask surface of the current session.
    pub fn surface(&self) -> Option<&MaskSurface> {
        self.surface.as_ref()
    }

    /// Current brush.
    pub fn brush(&self) -> Brush {
        self.stroke.brush()
    }

    /// Set the brush diameter in surface pixels.
    pub fn set_brush_diameter(&mut self, diameter: f64) {
        let brush = Brush {
            diameter,
            ..self.stroke.brush()
        };
        self.stroke.set_brush(brush);
    }

    /// Toggle paint and erase.
    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        let brush = Brush {
            mode,
            ..self.stroke.brush()
        };
        self.stroke.set_brush(brush);
    }

    /// Begin a stroke at a surface-space point. Ignored without a base image.
    pub fn pointer_down(&mut self, p: Point) {
        if let Some(surface) = self.surface.as_mut() {
            self.stroke.pointer_down(surface, p);
        }
    }

    /// Begin a stroke from a pointer position in client space over the rendered canvas.
    pub fn pointer_down_client(&mut self, client: Point, rendered: Rect) {
        if let Some(surface) = self.surface.as_mut() {
            let p = surface.map_client_point(client, rendered);
            self.stroke.pointer_down(surface, p);
        }
    }

    /// Extend the active stroke to a surface-space point.
    pub fn pointer_move(&mut self, p: Point) {
        if let Some(surface) = self.surface.as_mut() {
            self.stroke.pointer_move(surface, p);
        }
    }

    /// Extend the active stroke to a pointer position in client space.
    pub fn pointer_move_client(&mut self, client: Point, rendered: Rect) {
        if let Some(surface) = self.surface.as_mut() {
            let p = surface.map_client_point(client, rendered);
            self.stroke.pointer_move(surface, p);
        }
    }

    /// Finish the active stroke and keep the exported mask.
    pub fn pointer_up(&mut self) -> StudioResult<()> {
        let Some(surface) = self.surface.as_ref() else {
            return Ok(());
        };
        if let Some(snapshot) = self.stroke.pointer_up(surface)? {
            self.mask_snapshot = Some(snapshot);
        }
        Ok(())
    }

    /// Mask exported at the end of the last stroke.
    pub fn mask_snapshot(&self) -> Option<&EncodedMedia> {
        self.mask_snapshot.as_ref()
    }

    /// Unselect everything.
    pub fn clear_mask(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
        self.mask_snapshot = None;
    }

    /// Base image with the mask overlay, at display size.
    pub fn preview(&self, opacity: f32) -> StudioResult<image::RgbaImage> {
        match (self.base.as_ref(), self.surface.as_ref()) {
            (Some(base), Some(surface)) => compose_preview(base, surface, opacity),
            _ => Err(StudioError::validation("upload an image first")),
        }
    }

    fn request(&self, mode: EditMode) -> StudioResult<EditRequest> {
        let tool = self.require_tool()?;
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| StudioError::validation("upload an image first"))?;
        match mode {
            EditMode::Auto => EditRequest::auto(tool, base),
            EditMode::Brush => {
                let surface = self
                    .surface
                    .as_ref()
                    .ok_or_else(|| StudioError::validation("upload an image first"))?;
                EditRequest::brush(tool, base, surface)
            }
        }
    }

    fn submit(
        &self,
        mode: EditMode,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        let session = lock(&self.edited).session;
        let slot = Arc::clone(&self.edited);
        let submitted = self
            .request(mode)
            .map(|r| self.orchestrator.submit(GenerationRequest::Edit(r)));
        async move {
            let result = submitted?.await?;
            let mut slot = lock(&slot);
            if slot.session == session {
                slot.result = Some(Arc::clone(&result));
            }
            Ok(result)
        }
    }

    /// Run the active tool on the whole image.
    pub fn apply_auto(
        &self,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        self.submit(EditMode::Auto)
    }

    /// Run the active tool on the painted area. Requires a non-empty mask.
    pub fn apply_brush(
        &self,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        self.submit(EditMode::Brush)
    }

    /// Run the active tool in the active mode.
    pub fn apply(
        &self,
    ) -> impl Future<Output = StudioResult<Arc<GenerationResult>>> + Send + use<P> {
        self.submit(self.mode)
    }

    /// Edited image of the current session.
    pub fn edited(&self) -> Option<Arc<GenerationResult>> {
        lock(&self.edited).result.clone()
    }

    /// File name for downloading the edited image.
    pub fn download_name(&self) -> Option<String> {
        self.edited().map(|r| r.download_name())
    }

    /// The edit action site.
    pub fn site(&self) -> &Arc<ActionSite> {
        self.orchestrator.site(OperationKind::ImageEdit)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.site().state()
    }

    /// Whether an edit is in flight.
    pub fn is_pending(&self) -> bool {
        self.site().is_pending()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/editor.rs"]
mod tests;
