use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::assets::decode::INVALID_FORMAT_MESSAGE;
use crate::assets::media::{EncodedMedia, PNG_MIME, VideoResource};
use crate::foundation::error::ErrorCode;
use crate::generate::request::AspectRatio;
use crate::lifecycle::state::LifecycleState;
use crate::provider::VideoOperation;

/// Answers from a script; counts every call.
#[derive(Default)]
struct Scripted {
    not_done_polls: usize,
    edit_text: Mutex<String>,
    fail_images: bool,
    polls: AtomicUsize,
    fetches: AtomicUsize,
    edits: AtomicUsize,
}

impl MediaProvider for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_images(
        &self,
        _request: &ImageRequest,
    ) -> StudioResult<Vec<EncodedMedia>> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if self.fail_images {
            return Err(StudioError::transport("503 Service Unavailable"));
        }
        Ok(vec![EncodedMedia::new(PNG_MIME, vec![7; 4])])
    }

    async fn start_video(&self, _request: &VideoRequest) -> StudioResult<crate::provider::VideoOperation> {
        Ok(VideoOperation::running("operations/test"))
    }

    async fn poll_video(&self, operation: &VideoOperation) -> StudioResult<VideoOperation> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.not_done_polls {
            Ok(VideoOperation::running(operation.name.clone()))
        } else {
            Ok(VideoOperation::finished(operation.name.clone(), "https://cdn.test/v.mp4"))
        }
    }

    async fn fetch_video(&self, uri: &str) -> StudioResult<VideoResource> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(VideoResource::Remote { uri: uri.to_string() })
    }

    async fn edit_image(&self, _request: &EditRequest) -> StudioResult<String> {
        self.edits.fetch_add(1, Ordering::SeqCst);
        Ok(self.edit_text.lock().unwrap().clone())
    }
}

fn opts() -> OrchestratorOpts {
    OrchestratorOpts {
        poll: PollSettings {
            interval: Duration::from_secs(10),
            timeout: None,
        },
        video_progress: ProgressPlan::video(Duration::from_secs(3)),
    }
}

fn image_request() -> GenerationRequest {
    GenerationRequest::Image(ImageRequest::new("a koi pond", "Anime", AspectRatio::Widescreen).unwrap())
}

fn video_request() -> GenerationRequest {
    GenerationRequest::Video(VideoRequest::from_text("waves at dusk", "16:9 (Widescreen)").unwrap())
}

fn edit_request() -> GenerationRequest {
    let png = crate::provider::mock::placeholder_png("base", AspectRatio::Square).unwrap();
    let base = crate::assets::decode::decode_base_image(png).unwrap();
    GenerationRequest::Edit(
        EditRequest::auto(crate::generate::tools::EditTool::Background, &base).unwrap(),
    )
}

#[tokio::test(start_paused = true)]
async fn video_polls_until_done_and_succeeds_once() {
    let orch = Orchestrator::new(
        Scripted {
            not_done_polls: 3,
            ..Scripted::default()
        },
        opts(),
    );
    let site = Arc::clone(orch.site(OperationKind::VideoGeneration));
    let mut states = site.subscribe();

    let fut = orch.submit(video_request());
    assert!(site.is_pending());
    assert!(site.progress().is_some());

    let result = fut.await.unwrap();
    assert_eq!(orch.provider().polls.load(Ordering::SeqCst), 4);
    assert_eq!(orch.provider().fetches.load(Ordering::SeqCst), 1);
    assert_eq!(site.stats().succeeded, 1);
    assert_eq!(site.history_len(), 1);
    assert_eq!(site.progress(), None);
    assert!(matches!(
        &result.output,
        MediaRef::Video(VideoResource::Remote { uri }) if uri == "https://cdn.test/v.mp4"
    ));
    assert_eq!(*states.borrow_and_update(), LifecycleState::Succeeded(result));
}

#[tokio::test(start_paused = true)]
async fn video_poll_timeout_fails_with_generic_message() {
    let mut o = opts();
    o.poll.timeout = Some(Duration::from_secs(25));
    let orch = Orchestrator::new(
        Scripted {
            not_done_polls: usize::MAX,
            ..Scripted::default()
        },
        o,
    );
    let err = orch.submit(video_request()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Transport);

    let site = orch.site(OperationKind::VideoGeneration);
    let failure = site.state().failure().cloned().unwrap();
    assert_eq!(failure.message, VIDEO_FAILURE_MESSAGE);
    assert_eq!(site.progress(), None);
    assert_eq!(orch.provider().fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn image_failure_is_reported_with_site_message() {
    let orch = Orchestrator::new(
        Scripted {
            fail_images: true,
            ..Scripted::default()
        },
        opts(),
    );
    assert!(orch.submit(image_request()).await.is_err());
    let state = orch.site(OperationKind::ImageGeneration).state();
    assert_eq!(state.failure().map(|f| f.message.as_str()), Some(IMAGE_FAILURE_MESSAGE));
}

#[tokio::test(start_paused = true)]
async fn malformed_edit_response_fails_with_invalid_format() {
    let provider = Scripted::default();
    *provider.edit_text.lock().unwrap() = "Sure! Here is your image: <binary>".to_string();
    let orch = Orchestrator::new(provider, opts());

    let err = orch.submit(edit_request()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Decode);
    let state = orch.site(OperationKind::ImageEdit).state();
    assert_eq!(state.failure().map(|f| f.message.as_str()), Some(INVALID_FORMAT_MESSAGE));
}

#[tokio::test(start_paused = true)]
async fn base64_text_that_is_not_an_image_never_succeeds() {
    let provider = Scripted::default();
    *provider.edit_text.lock().unwrap() = "SGVsbG8gd29ybGQ=".to_string();
    let orch = Orchestrator::new(provider, opts());

    let err = orch.submit(edit_request()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Decode);
    let site = orch.site(OperationKind::ImageEdit);
    assert_eq!(site.state().failure().map(|f| f.message.as_str()), Some(INVALID_FORMAT_MESSAGE));
    assert_eq!(site.history_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn fenced_edit_response_is_decoded() {
    let provider = Scripted::default();
    let png = crate::provider::mock::placeholder_png("edited", AspectRatio::Square).unwrap();
    *provider.edit_text.lock().unwrap() = format!("```png\n{}\n```", png.to_base64());
    let orch = Orchestrator::new(provider, opts());

    let result = orch.submit(edit_request()).await.unwrap();
    assert_eq!(result.output, MediaRef::Image(png));
}

#[tokio::test(start_paused = true)]
async fn independent_sites_can_be_pending_together() {
    let orch = Orchestrator::new(Scripted::default(), opts());
    let image = orch.submit(image_request());
    let video = orch.submit(video_request());
    assert!(orch.site(OperationKind::ImageGeneration).is_pending());
    assert!(orch.site(OperationKind::VideoGeneration).is_pending());

    let (image, video) = tokio::join!(image, video);
    image.unwrap();
    video.unwrap();
    assert_eq!(orch.site(OperationKind::ImageGeneration).history_len(), 1);
    assert_eq!(orch.site(OperationKind::VideoGeneration).history_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelling_video_abandons_the_poll_loop() {
    let orch = Orchestrator::new(
        Scripted {
            not_done_polls: usize::MAX,
            ..Scripted::default()
        },
        opts(),
    );
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(orch.submit_with_cancel(video_request(), cancel.clone()));

    tokio::time::sleep(Duration::from_secs(35)).await;
    cancel.cancel();
    let err = handle.await.unwrap().unwrap_err();
    assert_eq!(err.code(), ErrorCode::Cancelled);

    let polls = orch.provider().polls.load(Ordering::SeqCst);
    assert_eq!(polls, 3);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(orch.provider().polls.load(Ordering::SeqCst), polls);
    assert_eq!(
        orch.site(OperationKind::VideoGeneration).state().failure().map(|f| f.code),
        Some(ErrorCode::Cancelled)
    );
}
