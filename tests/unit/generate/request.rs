use std::io::Cursor;

use super::*;
use crate::assets::decode::decode_base_image_bytes;
use crate::foundation::core::Point;
use crate::foundation::error::ErrorCode;
use crate::mask::brush::Brush;
use crate::mask::stroke::StrokeRenderer;

fn base(width: u32, height: u32) -> BaseImage {
    let img = image::RgbaImage::new(width, height);
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    decode_base_image_bytes(buf).unwrap()
}

#[test]
fn image_instruction_folds_in_non_default_style() {
    let plain = ImageRequest::new("a fox", "Default", AspectRatio::Square).unwrap();
    assert_eq!(plain.instruction(), "a fox");

    let styled = ImageRequest::new("a fox", "Ghibli", AspectRatio::Tall).unwrap();
    assert_eq!(styled.instruction(), "a fox, in the style of Ghibli");
    assert_eq!(styled.image_count(), 1);
}

#[test]
fn blank_prompts_are_rejected() {
    let err = ImageRequest::new("   ", "Default", AspectRatio::Square).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Validation);
    assert!(VideoRequest::from_text("\n", "16:9 (Widescreen)").is_err());
}

#[test]
fn video_instruction_carries_aspect_label() {
    let req = VideoRequest::from_text("waves", VIDEO_ASPECT_RATIOS[0]).unwrap();
    assert_eq!(req.instruction(), "waves, aspect ratio 16:9 (Widescreen)");
    assert!(req.source_image().is_none());
}

#[test]
fn image_to_video_requires_a_source() {
    let err = VideoRequest::from_image("waves", "1:1 (Square)", None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Validation);

    let src = base(4, 4).encoded;
    let req = VideoRequest::from_image("waves", "1:1 (Square)", Some(src.clone())).unwrap();
    let generic = GenerationRequest::Video(req);
    assert_eq!(generic.base_image(), Some(&src));
    assert_eq!(generic.operation_kind(), OperationKind::VideoGeneration);
}

#[test]
fn brush_edit_with_empty_mask_is_rejected() {
    let img = base(32, 32);
    let surface = MaskSurface::for_image(&img, 32);
    let err = EditRequest::brush(EditTool::Object, &img, &surface).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Validation);
}

#[test]
fn brush_edit_carries_mask_and_instruction() {
    let img = base(32, 32);
    let mut surface = MaskSurface::for_image(&img, 32);
    StrokeRenderer::new(Brush::paint(6.0))
        .draw_stroke(&mut surface, &[Point::new(10.0, 10.0)])
        .unwrap();

    let req = EditRequest::brush(EditTool::Object, &img, &surface).unwrap();
    assert_eq!(req.mode(), EditMode::Brush);
    assert_eq!(req.mask().unwrap().mime, "image/png");
    assert!(req.instruction().starts_with("Remove the object from the main image"));
    assert!(req.instruction().ends_with(EDIT_OUTPUT_SUFFIX));
}

#[test]
fn tools_reject_unsupported_modes() {
    let img = base(8, 8);
    assert!(EditRequest::auto(EditTool::Object, &img).is_err());

    let mut surface = MaskSurface::for_image(&img, 8);
    StrokeRenderer::new(Brush::paint(4.0))
        .draw_stroke(&mut surface, &[Point::new(4.0, 4.0)])
        .unwrap();
    assert!(EditRequest::brush(EditTool::Enhancer, &img, &surface).is_err());
}

#[test]
fn aspect_ratio_parses_wire_values() {
    assert_eq!(AspectRatio::parse("16:9").unwrap(), AspectRatio::Widescreen);
    assert!(AspectRatio::parse("2.39:1").is_err());
    let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
    assert_eq!(json, "\"3:4\"");
}
