use std::io::Cursor;

use super::*;
use crate::config::MockOpts;
use crate::foundation::error::ErrorCode;
use crate::lifecycle::orchestrator::OrchestratorOpts;
use crate::provider::MockProvider;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 120, 200, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn editor(opts: MockOpts) -> Editor<MockProvider> {
    let orch = Orchestrator::new(MockProvider::new(opts), OrchestratorOpts::default());
    Editor::new(Arc::new(orch), 64, 8.0)
}

#[test]
fn object_remover_starts_in_brush_mode() {
    let mut ed = editor(MockOpts::instant());
    ed.select_tool(EditTool::Object);
    assert_eq!(ed.mode(), EditMode::Brush);
    assert!(ed.set_mode(EditMode::Auto).is_err());

    ed.select_tool(EditTool::Text);
    assert_eq!(ed.mode(), EditMode::Auto);
    ed.set_mode(EditMode::Brush).unwrap();
}

#[tokio::test(start_paused = true)]
async fn enhancer_runs_once_on_upload() {
    let mut ed = editor(MockOpts::default());
    ed.select_tool(EditTool::Enhancer);
    let auto = ed.upload(png(32, 32)).unwrap().expect("enhancer auto-runs");
    assert!(ed.is_pending());

    let result = auto.await.unwrap();
    assert_eq!(ed.edited().map(|r| r.id), Some(result.id));
    assert!(ed.download_name().unwrap().starts_with("edited_enhancer_"));
    assert_eq!(ed.site().stats().submitted, 1);
}

#[tokio::test(start_paused = true)]
async fn upload_for_other_tools_does_not_dispatch() {
    let mut ed = editor(MockOpts::instant());
    ed.select_tool(EditTool::Background);
    assert!(ed.upload(png(32, 32)).unwrap().is_none());
    assert_eq!(ed.state(), LifecycleState::Idle);
}

#[tokio::test(start_paused = true)]
async fn brush_apply_with_empty_mask_is_rejected_locally() {
    let mut ed = editor(MockOpts::instant());
    ed.select_tool(EditTool::Object);
    assert!(ed.upload(png(32, 32)).unwrap().is_none());

    let err = ed.apply_brush().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Validation);
    assert_eq!(ed.state(), LifecycleState::Idle);
    assert_eq!(ed.site().stats().submitted, 0);
}

#[tokio::test(start_paused = true)]
async fn painted_mask_is_sent_with_brush_edit() {
    let mut ed = editor(MockOpts::instant());
    ed.select_tool(EditTool::Object);
    let _ = ed.upload(png(128, 64)).unwrap();
    assert_eq!(ed.surface().unwrap().size().width, 64);

    ed.pointer_down(Point::new(10.0, 10.0));
    ed.pointer_move(Point::new(40.0, 20.0));
    ed.pointer_up().unwrap();
    assert!(ed.mask_snapshot().is_some());
    assert!(!ed.surface().unwrap().is_empty());

    ed.apply().await.unwrap();
    assert!(ed.edited().is_some());
}

#[tokio::test(start_paused = true)]
async fn selecting_a_tool_discards_session_state() {
    let mut ed = editor(MockOpts::instant());
    ed.select_tool(EditTool::Text);
    let _ = ed.upload(png(16, 16)).unwrap();
    ed.pointer_down(Point::new(4.0, 4.0));
    ed.pointer_up().unwrap();
    ed.apply_auto().await.unwrap();
    assert!(ed.edited().is_some());

    ed.select_tool(EditTool::Background);
    assert!(ed.edited().is_none());
    assert!(ed.base_image().is_none());
    assert!(ed.surface().is_none());
    assert!(ed.mask_snapshot().is_none());
}

#[tokio::test(start_paused = true)]
async fn result_from_an_older_session_is_not_shown() {
    let mut ed = editor(MockOpts::default());
    ed.select_tool(EditTool::Background);
    let _ = ed.upload(png(16, 16)).unwrap();
    let in_flight = ed.apply_auto();

    ed.select_tool(EditTool::Text);
    let result = in_flight.await.unwrap();
    assert!(ed.edited().is_none());
    assert_eq!(ed.site().history_len(), 1);
    assert_eq!(ed.site().history()[0].id, result.id);
}

#[test]
fn preview_requires_an_image_and_matches_display_size() {
    let mut ed = editor(MockOpts::instant());
    assert!(ed.preview(0.5).is_err());
    ed.select_tool(EditTool::Object);
    let _ = ed.upload(png(128, 32)).unwrap();
    ed.set_brush_mode(BrushMode::Paint);
    ed.set_brush_diameter(6.0);
    ed.pointer_down(Point::new(5.0, 5.0));
    ed.pointer_up().unwrap();

    let preview = ed.preview(0.5).unwrap();
    assert_eq!(preview.dimensions(), (64, 16));
}
