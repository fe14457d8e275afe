use std::path::Path;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::StudioResult;

/// Default upstream API root.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Sample video served by the mock provider.
pub const MOCK_VIDEO_URL: &str =
    "https://videos.pexels.com/video-files/3209828/3209828-sd_640_360_30fps.mp4";

/// Model names used for each operation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Image synthesis model.
    pub image: String,
    /// Video synthesis model.
    pub video: String,
    /// Image editing model.
    pub edit: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            image: "imagen-3.0-generate-002".to_string(),
            video: "veo-2.0-generate-001".to_string(),
            edit: "gemini-2.5-flash".to_string(),
        }
    }
}

/// Behavior of the offline provider.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MockOpts {
    /// Simulated latency of image synthesis.
    pub image_delay_ms: u64,
    /// Simulated latency of video synthesis.
    pub video_delay_ms: u64,
    /// Simulated latency of image editing.
    pub edit_delay_ms: u64,
    /// Video link returned for every video job.
    pub video_url: String,
}

impl Default for MockOpts {
    fn default() -> Self {
        Self {
            image_delay_ms: 1500,
            video_delay_ms: 5000,
            edit_delay_ms: 2000,
            video_url: MOCK_VIDEO_URL.to_string(),
        }
    }
}

impl MockOpts {
    /// Mock with no simulated latency.
    pub fn instant() -> Self {
        Self {
            image_delay_ms: 0,
            video_delay_ms: 0,
            edit_delay_ms: 0,
            ..Self::default()
        }
    }
}

/// Studio configuration.
///
/// Credential presence decides between the live and the mock provider.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// API credential. Absent means mock mode.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API root URL, without a trailing slash.
    pub api_base: String,
    /// Model names.
    pub models: ModelConfig,
    /// Delay between video status checks.
    pub video_poll_interval_ms: u64,
    /// Give up on a video job after this long. `None` waits indefinitely.
    pub video_poll_timeout_ms: Option<u64>,
    /// Cadence of the cosmetic progress messages.
    pub progress_interval_ms: u64,
    /// Width of the area the editor canvas is fitted into.
    pub container_width: u32,
    /// Initial brush diameter in surface pixels.
    pub default_brush_diameter: f64,
    /// Mock provider behavior.
    pub mock: MockOpts,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            models: ModelConfig::default(),
            video_poll_interval_ms: 10_000,
            video_poll_timeout_ms: None,
            progress_interval_ms: 3_000,
            container_width: 1024,
            default_brush_diameter: 20.0,
            mock: MockOpts::default(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl StudioConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> StudioResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: StudioConfig = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    /// Apply `API_KEY` (or `GEMINI_API_KEY`), `AURAMATIC_API_BASE` and
    /// `AURAMATIC_POLL_INTERVAL_MS` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = non_empty_env("API_KEY").or_else(|| non_empty_env("GEMINI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(base) = non_empty_env("AURAMATIC_API_BASE") {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(ms) = non_empty_env("AURAMATIC_POLL_INTERVAL_MS").and_then(|v| v.parse().ok())
        {
            self.video_poll_interval_ms = ms;
        }
        self
    }

    /// Delay between video status checks.
    pub fn video_poll_interval(&self) -> Duration {
        Duration::from_millis(self.video_poll_interval_ms)
    }

    /// Video job deadline, if any.
    pub fn video_poll_timeout(&self) -> Option<Duration> {
        self.video_poll_timeout_ms.map(Duration::from_millis)
    }

    /// Cadence of the progress messages.
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
