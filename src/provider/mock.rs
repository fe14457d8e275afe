use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::time::Duration;

use anyhow::Context;

use crate::assets::media::{EncodedMedia, PNG_MIME, VideoResource};
use crate::config::MockOpts;
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::request::{AspectRatio, EditRequest, ImageRequest, VideoRequest};
use crate::provider::{MediaProvider, VideoOperation};

const PLACEHOLDER_LONG_SIDE: u32 = 256;
const MOCK_OPERATION: &str = "operations/mock-video";

/// Offline provider serving deterministic placeholders after a simulated delay.
#[derive(Clone, Debug, Default)]
pub struct MockProvider {
    opts: MockOpts,
}

impl MockProvider {
    /// Create a mock with the given delays and sample video link.
    pub fn new(opts: MockOpts) -> Self {
        Self { opts }
    }

    /// Current behavior settings.
    pub fn opts(&self) -> &MockOpts {
        &self.opts
    }
}

async fn simulate_latency(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

fn placeholder_size(aspect: AspectRatio) -> (u32, u32) {
    let (w, h) = aspect.ratio();
    if w >= h {
        (PLACEHOLDER_LONG_SIDE, (PLACEHOLDER_LONG_SIDE * h / w).max(1))
    } else {
        ((PLACEHOLDER_LONG_SIDE * w / h).max(1), PLACEHOLDER_LONG_SIDE)
    }
}

/// Diagonal two-color gradient whose colors derive from `seed`.
pub(crate) fn placeholder_png(seed: &str, aspect: AspectRatio) -> StudioResult<EncodedMedia> {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let h = hasher.finish().to_le_bytes();
    let from = [h[0], h[1], h[2]];
    let to = [h[3], h[4], h[5]];

    let (width, height) = placeholder_size(aspect);
    let span = (width + height - 2).max(1);
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        let t = (x + y) * 255 / span;
        let mix = |a: u8, b: u8| -> u8 {
            ((u32::from(a) * (255 - t) + u32::from(b) * t) / 255) as u8
        };
        image::Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), 255])
    });

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode placeholder image as png")?;
    Ok(EncodedMedia::new(PNG_MIME, buf))
}

impl MediaProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_images(&self, request: &ImageRequest) -> StudioResult<Vec<EncodedMedia>> {
        simulate_latency(self.opts.image_delay_ms).await;
        let seed = request.instruction();
        (0..request.image_count())
            .map(|i| placeholder_png(&format!("{seed}#{i}"), request.aspect_ratio()))
            .collect()
    }

    async fn start_video(&self, _request: &VideoRequest) -> StudioResult<VideoOperation> {
        simulate_latency(self.opts.video_delay_ms).await;
        Ok(VideoOperation::finished(
            MOCK_OPERATION,
            self.opts.video_url.clone(),
        ))
    }

    async fn poll_video(&self, operation: &VideoOperation) -> StudioResult<VideoOperation> {
        Ok(VideoOperation::finished(
            operation.name.clone(),
            self.opts.video_url.clone(),
        ))
    }

    async fn fetch_video(&self, uri: &str) -> StudioResult<VideoResource> {
        if uri.trim().is_empty() {
            return Err(StudioError::transport("mock video link is empty"));
        }
        Ok(VideoResource::Remote {
            uri: uri.to_string(),
        })
    }

    async fn edit_image(&self, request: &EditRequest) -> StudioResult<String> {
        simulate_latency(self.opts.edit_delay_ms).await;
        Ok(request.image().to_base64())
    }
}
