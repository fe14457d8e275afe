use crate::foundation::error::{StudioError, StudioResult};

pub use kurbo::{Point, Rect, Vec2};

/// Pixel dimensions of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelSize {
    /// Build a size, rejecting empty rasters.
    pub fn new(width: u32, height: u32) -> StudioResult<Self> {
        if width == 0 || height == 0 {
            return Err(StudioError::validation(format!(
                "raster dimensions must be non-zero (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Bounds as a kurbo rectangle anchored at the origin.
    pub fn to_rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Scale to fit `container_width` without ever upscaling.
    ///
    /// Returns the scale factor `min(1, container_width / width)` and the scaled size.
    /// Scaled dimensions truncate like a canvas assignment would, but never drop below 1.
    pub fn fit_width(self, container_width: u32) -> (f64, PixelSize) {
        let scale = (f64::from(container_width) / f64::from(self.width)).min(1.0);
        let scaled = |v: u32| ((f64::from(v) * scale) as u32).max(1);
        (
            scale,
            PixelSize {
                width: scaled(self.width),
                height: scaled(self.height),
            },
        )
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Build a color from straight components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Tint used for painted mask pixels, `rgba(239, 68, 68, 1)`.
pub const MASK_TINT: Rgba8 = Rgba8::new(239, 68, 68, 255);
