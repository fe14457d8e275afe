use std::io::Cursor;

use anyhow::Context;

use crate::assets::media::{BaseImage, EncodedMedia, PNG_MIME};
use crate::foundation::core::{MASK_TINT, PixelSize, Point, Rect};
use crate::foundation::error::StudioResult;
use crate::mask::brush::BrushMode;

/// Selection overlay aligned 1:1 with the displayed (scaled) base image.
///
/// Logically a single 8-bit alpha channel. Any alpha above zero counts as selected.
#[derive(Clone, Debug)]
pub struct MaskSurface {
    native: PixelSize,
    size: PixelSize,
    scale: f64,
    alpha: Vec<u8>,
}

impl MaskSurface {
    /// Create a fully unselected surface for `base` displayed inside `container_width`.
    pub fn for_image(base: &BaseImage, container_width: u32) -> Self {
        let (scale, size) = base.size.fit_width(container_width);
        Self {
            native: base.size,
            size,
            scale,
            alpha: vec![0; size.area()],
        }
    }

    /// Reset to fully unselected at `base`'s scaled display dimensions.
    ///
    /// The scale factor is recomputed as `min(1, container_width / base.width)`.
    pub fn load(&mut self, base: &BaseImage, container_width: u32) {
        *self = Self::for_image(base, container_width);
        tracing::debug!(
            width = self.size.width,
            height = self.size.height,
            scale = self.scale,
            "mask surface loaded"
        );
    }

    /// Reset to fully unselected without reloading the base image.
    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    /// Surface dimensions in pixels.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Native dimensions of the base image this surface overlays.
    pub fn native_size(&self) -> PixelSize {
        self.native
    }

    /// Display scale factor from native image pixels to surface pixels.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw alpha channel, row-major.
    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Alpha at a pixel, `None` outside the surface.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(self.alpha[self.index(x, y)])
    }

    /// Whether a pixel is selected. Pixels outside the surface are never selected.
    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.alpha_at(x, y).is_some_and(|a| a > 0)
    }

    /// Number of selected pixels.
    pub fn selected_count(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0).count()
    }

    /// True when no pixel is selected.
    pub fn is_empty(&self) -> bool {
        self.alpha.iter().all(|&a| a == 0)
    }

    /// Clamp a surface-space point onto the surface bounds.
    pub fn clamp_point(&self, p: Point) -> Point {
        let w = f64::from(self.size.width);
        let h = f64::from(self.size.height);
        let x = if p.x.is_nan() { 0.0 } else { p.x.clamp(0.0, w) };
        let y = if p.y.is_nan() { 0.0 } else { p.y.clamp(0.0, h) };
        Point::new(x, y)
    }

    /// Map a pointer position in client space onto the surface.
    ///
    /// `rendered` is the on-screen rectangle the surface occupies; the element may be drawn at a
    /// different size than its pixel dimensions. The result is clamped to the surface bounds.
    pub fn map_client_point(&self, client: Point, rendered: Rect) -> Point {
        let sx = if rendered.width() > 0.0 {
            f64::from(self.size.width) / rendered.width()
        } else {
            1.0
        };
        let sy = if rendered.height() > 0.0 {
            f64::from(self.size.height) / rendered.height()
        } else {
            1.0
        };
        let local = client - rendered.origin();
        self.clamp_point(Point::new(local.x * sx, local.y * sy))
    }

    /// Map a point in native image pixels onto the surface.
    pub fn map_image_point(&self, p: Point) -> Point {
        self.clamp_point(Point::new(p.x * self.scale, p.y * self.scale))
    }

    /// Compose one pixel's coverage. `coverage` is in `0..=255`; zero leaves the pixel untouched.
    pub(crate) fn compose(&mut self, x: u32, y: u32, coverage: u8, mode: BrushMode) {
        if coverage == 0 || x >= self.size.width || y >= self.size.height {
            return;
        }
        let i = self.index(x, y);
        match mode {
            BrushMode::Paint => self.alpha[i] = self.alpha[i].max(coverage),
            BrushMode::Erase => self.alpha[i] = 0,
        }
    }

    /// Encode the current raster as a lossless PNG with alpha preserved.
    ///
    /// Selected pixels carry the mask tint at their alpha; everything else is transparent.
    pub fn export_snapshot(&self) -> StudioResult<EncodedMedia> {
        let mut rgba = Vec::with_capacity(self.alpha.len() * 4);
        for &a in &self.alpha {
            if a == 0 {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                rgba.extend_from_slice(&[MASK_TINT.r, MASK_TINT.g, MASK_TINT.b, a]);
            }
        }
        let img = image::RgbaImage::from_raw(self.size.width, self.size.height, rgba)
            .context("mask buffer does not match surface dimensions")?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode mask snapshot as png")?;
        Ok(EncodedMedia::new(PNG_MIME, buf))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.size.width as usize) + (x as usize)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/surface.rs"]
mod tests;
