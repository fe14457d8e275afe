use image::imageops::FilterType;
use rayon::prelude::*;

use crate::assets::media::BaseImage;
use crate::foundation::core::{MASK_TINT, Rgba8};
use crate::foundation::error::{StudioError, StudioResult};
use crate::mask::surface::MaskSurface;

/// Composite the mask tint over the base image at the surface's display size.
///
/// `opacity` scales the overlay; the result is straight-alpha RGBA8. Rows are blended in parallel.
pub fn compose_preview(
    base: &BaseImage,
    surface: &MaskSurface,
    opacity: f32,
) -> StudioResult<image::RgbaImage> {
    if base.size != surface.native_size() {
        return Err(StudioError::validation(
            "mask surface was loaded for a different base image",
        ));
    }
    let src = image::RgbaImage::from_raw(base.size.width, base.size.height, base.rgba8.to_vec())
        .ok_or_else(|| StudioError::validation("base image buffer does not match its size"))?;
    let size = surface.size();
    let mut out = if size == base.size {
        src
    } else {
        image::imageops::resize(&src, size.width, size.height, FilterType::Triangle)
    };

    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round()) as u16;
    let row_px = size.width as usize;
    out.par_chunks_mut(row_px * 4)
        .zip(surface.alpha().par_chunks(row_px))
        .for_each(|(dst_row, mask_row)| {
            for (d, &a) in dst_row.chunks_exact_mut(4).zip(mask_row) {
                if a == 0 || op == 0 {
                    continue;
                }
                let tint = MASK_TINT.with_alpha(mul_div255(u16::from(a), op));
                let blended = over_straight([d[0], d[1], d[2], d[3]], tint);
                d.copy_from_slice(&blended);
            }
        });
    Ok(out)
}

/// Source-over for straight-alpha pixels.
fn over_straight(dst: [u8; 4], src: Rgba8) -> [u8; 4] {
    let sa = u32::from(src.a);
    if sa == 0 {
        return dst;
    }
    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // out_a scaled by 255
    let out_a = sa * 255 + da * inv;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    let channel = |s: u8, d: u8| -> u8 {
        let num = u32::from(s) * sa * 255 + u32::from(d) * da * inv;
        ((num + out_a / 2) / out_a) as u8
    };
    [
        channel(src.r, dst[0]),
        channel(src.g, dst[1]),
        channel(src.b, dst[2]),
        ((out_a + 127) / 255) as u8,
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
