use kurbo::{Line, ParamCurveNearest, Shape};

use crate::assets::media::EncodedMedia;
use crate::foundation::core::{PixelSize, Point};
use crate::foundation::error::StudioResult;
use crate::mask::brush::Brush;
use crate::mask::surface::MaskSurface;

/// Turns pointer samples into round-capped segments on a [`MaskSurface`].
///
/// A stroke runs from [`pointer_down`](Self::pointer_down) to the matching
/// [`pointer_up`](Self::pointer_up). Samples are consumed immediately; nothing is retained
/// once the stroke ends.
#[derive(Clone, Debug, Default)]
pub struct StrokeRenderer {
    brush: Brush,
    last: Option<Point>,
}

impl StrokeRenderer {
    /// Create a renderer with the given brush.
    pub fn new(brush: Brush) -> Self {
        Self { brush, last: None }
    }

    /// Current brush.
    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Replace the brush. Takes effect for the next segment.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    /// Whether a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    /// Begin a stroke at `p` (surface space). Renders a dot so single-point strokes leave a mark.
    ///
    /// Brushes with a non-positive diameter do not start a stroke.
    pub fn pointer_down(&mut self, surface: &mut MaskSurface, p: Point) {
        if !self.brush.is_drawable() {
            tracing::debug!(diameter = self.brush.diameter, "ignoring stroke with empty brush");
            self.last = None;
            return;
        }
        let p = surface.clamp_point(p);
        render_segment(surface, self.brush, p, p);
        self.last = Some(p);
    }

    /// Extend the stroke to `p`. Ignored when no stroke is in progress.
    pub fn pointer_move(&mut self, surface: &mut MaskSurface, p: Point) {
        let Some(last) = self.last else {
            return;
        };
        if !self.brush.is_drawable() {
            return;
        }
        let p = surface.clamp_point(p);
        render_segment(surface, self.brush, last, p);
        self.last = Some(p);
    }

    /// Finish the stroke and return the surface snapshot, or `None` if no stroke was active.
    ///
    /// Pointer-leave is handled identically.
    pub fn pointer_up(&mut self, surface: &MaskSurface) -> StudioResult<Option<EncodedMedia>> {
        if self.last.take().is_none() {
            return Ok(None);
        }
        surface.export_snapshot().map(Some)
    }

    /// Abandon the active stroke without exporting a snapshot.
    pub fn cancel(&mut self) {
        self.last = None;
    }

    /// Render a whole stroke from a sample sequence and return the resulting snapshot.
    pub fn draw_stroke(
        &mut self,
        surface: &mut MaskSurface,
        samples: &[Point],
    ) -> StudioResult<Option<EncodedMedia>> {
        let Some((&first, rest)) = samples.split_first() else {
            return Ok(None);
        };
        self.pointer_down(surface, first);
        for &p in rest {
            self.pointer_move(surface, p);
        }
        self.pointer_up(surface)
    }
}

/// Rasterize one round-capped segment from `a` to `b`.
///
/// Coverage is the anti-aliased distance falloff `r + 0.5 - d` sampled at pixel centers. Paint
/// rounds coverage up so every touched pixel ends up selected; erase clears every touched pixel.
/// The pixels holding either endpoint are always touched, so hairline brushes still leave a mark.
pub fn render_segment(surface: &mut MaskSurface, brush: Brush, a: Point, b: Point) {
    if !brush.is_drawable() {
        return;
    }
    let r = brush.radius();
    let reach = r + 0.5;
    let line = Line::new(a, b);
    let bounds = line
        .bounding_box()
        .inflate(reach, reach)
        .intersect(surface.size().to_rect());
    if bounds.is_zero_area() {
        return;
    }

    let x0 = bounds.x0.floor().max(0.0) as u32;
    let y0 = bounds.y0.floor().max(0.0) as u32;
    let x1 = bounds.x1.ceil() as u32;
    let y1 = bounds.y1.ceil() as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let d = distance_to_segment(&line, center);
            let coverage = (reach - d).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            let alpha = (coverage * 255.0).ceil() as u8;
            surface.compose(x, y, alpha, brush.mode);
        }
    }

    let PixelSize { width, height } = surface.size();
    for p in [a, b] {
        let x = (p.x.floor().max(0.0) as u32).min(width.saturating_sub(1));
        let y = (p.y.floor().max(0.0) as u32).min(height.saturating_sub(1));
        surface.compose(x, y, 1, brush.mode);
    }
}

fn distance_to_segment(line: &Line, p: Point) -> f64 {
    if line.p0 == line.p1 {
        return p.distance(line.p0);
    }
    line.nearest(p, 1e-9).distance_sq.sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/mask/stroke.rs"]
mod tests;
