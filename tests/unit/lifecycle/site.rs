use std::time::Duration;

use super::*;
use crate::assets::media::{EncodedMedia, PNG_MIME};
use crate::foundation::error::ErrorCode;
use crate::generate::request::{AspectRatio, ImageRequest};
use crate::lifecycle::progress::VIDEO_LOADING_MESSAGES;

fn request() -> GenerationRequest {
    GenerationRequest::Image(ImageRequest::new("a lighthouse", "Default", AspectRatio::Square).unwrap())
}

fn output() -> MediaRef {
    MediaRef::Image(EncodedMedia::new(PNG_MIME, vec![1, 2, 3]))
}

#[tokio::test(start_paused = true)]
async fn submit_enters_pending_before_first_poll() {
    let site = Arc::new(ActionSite::new("image"));
    assert_eq!(site.state(), LifecycleState::Idle);

    let fut = site.run(request(), CancellationToken::new(), async { Ok(output()) });
    assert!(site.is_pending());

    let result = fut.await.unwrap();
    assert_eq!(site.state(), LifecycleState::Succeeded(Arc::clone(&result)));
    assert_eq!(site.history_len(), 1);
    assert_eq!(site.history()[0].id, result.id);
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_pending_is_rejected_and_first_unaffected() {
    let site = Arc::new(ActionSite::new("image"));
    let first = site.run(request(), CancellationToken::new(), async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Ok(output())
    });

    let second = site.run(request(), CancellationToken::new(), async { Ok(output()) });
    let err = second.await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Busy);
    assert!(site.is_pending());

    first.await.unwrap();
    assert!(site.state().result().is_some());
    let stats = site.stats();
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.succeeded, 1);
    assert_eq!(stats.rejected_busy, 1);
    assert_eq!(site.history_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failure_uses_override_message_but_keeps_code() {
    let site = Arc::new(
        ActionSite::new("image").with_failure_message("Failed to generate image. Please try again."),
    );
    let err = site
        .run(request(), CancellationToken::new(), async {
            Err(StudioError::transport("connection reset"))
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Transport);

    let failure = site.state().failure().cloned().unwrap();
    assert_eq!(failure.code, ErrorCode::Transport);
    assert_eq!(failure.message, "Failed to generate image. Please try again.");
    assert_eq!(site.history_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn failure_without_override_surfaces_error_text() {
    let site = Arc::new(ActionSite::new("edit"));
    let _ = site
        .run(request(), CancellationToken::new(), async {
            Err(StudioError::decode("Received an invalid format from the API. Please try again."))
        })
        .await;
    assert_eq!(
        site.state().failure().map(|f| f.message.as_str()),
        Some("Received an invalid format from the API. Please try again.")
    );
}

#[tokio::test(start_paused = true)]
async fn failed_site_accepts_a_new_submit() {
    let site = Arc::new(ActionSite::new("image"));
    let _ = site
        .run(request(), CancellationToken::new(), async {
            Err(StudioError::transport("down"))
        })
        .await;
    assert!(site.state().failure().is_some());

    site.run(request(), CancellationToken::new(), async { Ok(output()) })
        .await
        .unwrap();
    assert!(site.state().result().is_some());
}

#[tokio::test(start_paused = true)]
async fn cancellation_fails_site_and_stops_progress() {
    let site = Arc::new(
        ActionSite::new("video").with_progress(ProgressPlan::video(Duration::from_secs(3))),
    );
    let cancel = CancellationToken::new();
    let fut = site.run(request(), cancel.clone(), std::future::pending());
    let handle = tokio::spawn(fut);

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(site.progress().as_deref(), Some(VIDEO_LOADING_MESSAGES[1]));

    cancel.cancel();
    let err = handle.await.unwrap().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Cancelled);
    assert_eq!(site.state().failure().map(|f| f.code), Some(ErrorCode::Cancelled));
    assert_eq!(site.progress(), None);
}

#[tokio::test(start_paused = true)]
async fn dropping_pending_future_never_leaves_site_pending() {
    let site = Arc::new(ActionSite::new("image"));
    let fut = site.run(request(), CancellationToken::new(), std::future::pending());
    assert!(site.is_pending());
    drop(fut);
    assert_eq!(site.state().failure().map(|f| f.code), Some(ErrorCode::Cancelled));
    assert_eq!(site.stats().failed, 1);
}

#[tokio::test(start_paused = true)]
async fn first_progress_message_is_published_with_pending() {
    let site = Arc::new(
        ActionSite::new("video").with_progress(ProgressPlan::video(Duration::from_secs(3))),
    );
    let fut = site.run(request(), CancellationToken::new(), async { Ok(output()) });
    assert!(site.is_pending());
    assert_eq!(site.progress().as_deref(), Some(VIDEO_LOADING_MESSAGES[0]));

    fut.await.unwrap();
    assert_eq!(site.progress(), None);
}

#[test]
fn outside_a_runtime_progress_waits_for_the_first_poll() {
    let site = Arc::new(
        ActionSite::new("video").with_progress(ProgressPlan::video(Duration::from_secs(3))),
    );
    let fut = site.run(request(), CancellationToken::new(), async { Ok(output()) });
    assert!(site.is_pending());
    assert_eq!(site.progress(), None);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    rt.block_on(fut).unwrap();
    assert_eq!(site.progress(), None);
    assert!(site.state().result().is_some());
}

#[tokio::test(start_paused = true)]
async fn progress_clears_on_success() {
    let site = Arc::new(
        ActionSite::new("video").with_progress(ProgressPlan::video(Duration::from_secs(3))),
    );
    let mut rx = site.subscribe_progress();
    let fut = site.run(request(), CancellationToken::new(), async {
        tokio::time::sleep(Duration::from_secs(7)).await;
        Ok(output())
    });
    fut.await.unwrap();
    assert_eq!(site.progress(), None);
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), None);
}
