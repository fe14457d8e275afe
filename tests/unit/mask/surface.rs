use std::io::Cursor;

use super::*;
use crate::assets::decode::decode_base_image_bytes;
use crate::mask::brush::Brush;
use crate::mask::stroke::StrokeRenderer;

fn base(width: u32, height: u32) -> BaseImage {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    decode_base_image_bytes(buf).unwrap()
}

#[test]
fn load_scales_down_to_container_but_never_up() {
    let img = base(400, 200);
    let small = MaskSurface::for_image(&img, 100);
    assert_eq!(small.size(), PixelSize { width: 100, height: 50 });
    assert_eq!(small.scale(), 0.25);

    let wide = MaskSurface::for_image(&img, 4000);
    assert_eq!(wide.size(), img.size);
    assert_eq!(wide.scale(), 1.0);
    assert_eq!(wide.native_size(), img.size);
}

#[test]
fn load_resets_an_already_painted_surface() {
    let img = base(64, 64);
    let mut surface = MaskSurface::for_image(&img, 64);
    StrokeRenderer::new(Brush::paint(10.0))
        .draw_stroke(&mut surface, &[Point::new(32.0, 32.0)])
        .unwrap();
    assert!(!surface.is_empty());

    surface.load(&img, 64);
    assert!(surface.is_empty());
}

#[test]
fn clear_keeps_dimensions() {
    let img = base(80, 40);
    let mut surface = MaskSurface::for_image(&img, 40);
    StrokeRenderer::new(Brush::paint(6.0))
        .draw_stroke(&mut surface, &[Point::new(5.0, 5.0), Point::new(30.0, 15.0)])
        .unwrap();
    surface.clear();
    assert!(surface.is_empty());
    assert_eq!(surface.size(), PixelSize { width: 40, height: 20 });
}

#[test]
fn export_is_idempotent_and_preserves_alpha() {
    let img = base(32, 32);
    let mut surface = MaskSurface::for_image(&img, 32);
    StrokeRenderer::new(Brush::paint(8.0))
        .draw_stroke(&mut surface, &[Point::new(16.0, 16.0)])
        .unwrap();

    let a = surface.export_snapshot().unwrap();
    let b = surface.export_snapshot().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.mime, "image/png");

    let decoded = image::load_from_memory(a.bytes.as_slice()).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (32, 32));
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(decoded.get_pixel(16, 16).0, [239, 68, 68, 255]);
}

#[test]
fn client_points_account_for_rendered_size_and_clamp() {
    let img = base(200, 100);
    let surface = MaskSurface::for_image(&img, 200);
    let rendered = Rect::new(10.0, 20.0, 110.0, 70.0);

    let p = surface.map_client_point(Point::new(60.0, 45.0), rendered);
    assert_eq!(p, Point::new(100.0, 50.0));

    let outside = surface.map_client_point(Point::new(-500.0, 900.0), rendered);
    assert_eq!(outside, Point::new(0.0, 100.0));
}

#[test]
fn image_points_follow_display_scale() {
    let img = base(1000, 500);
    let surface = MaskSurface::for_image(&img, 500);
    assert_eq!(
        surface.map_image_point(Point::new(400.0, 100.0)),
        Point::new(200.0, 50.0)
    );
}

#[test]
fn out_of_bounds_queries_are_unselected() {
    let img = base(8, 8);
    let surface = MaskSurface::for_image(&img, 8);
    assert_eq!(surface.alpha_at(8, 0), None);
    assert!(!surface.is_selected(100, 100));
}
