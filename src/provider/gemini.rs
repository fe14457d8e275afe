use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_image_payload;
use crate::assets::media::{EncodedMedia, MP4_MIME, VideoResource};
use crate::config::{ModelConfig, StudioConfig};
use crate::foundation::error::{StudioError, StudioResult};
use crate::generate::request::{EditRequest, ImageRequest, VideoRequest};
use crate::provider::{MediaProvider, VideoOperation};

const ERROR_BODY_LIMIT: usize = 512;

/// HTTP client for the Google generative language API.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    api_base: String,
    api_key: String,
    models: ModelConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineBytes<'a> {
    bytes_base64_encoded: String,
    mime_type: &'a str,
}

#[derive(Serialize)]
struct PredictRequest<I: Serialize, P: Serialize> {
    instances: [I; 1],
    parameters: P,
}

#[derive(Serialize)]
struct ImageInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
    output_mime_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Serialize)]
struct VideoInstance<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<InlineBytes<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    sample_count: u32,
}

#[derive(Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResult>,
    error: Option<OperationError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoFile>,
}

#[derive(Deserialize)]
struct VideoFile {
    uri: Option<String>,
}

#[derive(Deserialize)]
struct OperationError {
    message: Option<String>,
}

impl From<OperationResponse> for VideoOperation {
    fn from(op: OperationResponse) -> Self {
        let video_uri = op
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);
        VideoOperation {
            name: op.name,
            done: op.done,
            video_uri,
            error: op
                .error
                .map(|e| e.message.unwrap_or_else(|| "video job failed".to_string())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(String),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn truncate_text(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

async fn json_or_error<T: serde::de::DeserializeOwned>(
    label: &str,
    response: reqwest::Response,
) -> StudioResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(StudioError::transport(format!(
            "{label} failed ({}): {}",
            status.as_u16(),
            truncate_text(&body, ERROR_BODY_LIMIT)
        )));
    }
    serde_json::from_str(&body)
        .map_err(|e| StudioError::decode(format!("{label} returned malformed JSON: {e}")))
}

impl GeminiProvider {
    /// Build a client for `config` using `api_key`.
    pub fn new(config: &StudioConfig, api_key: &str) -> StudioResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("auramatic/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            models: config.models.clone(),
            http,
        })
    }

    fn model_endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, model, method)
    }
}

impl MediaProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[tracing::instrument(skip_all, fields(model = %self.models.image))]
    async fn generate_images(&self, request: &ImageRequest) -> StudioResult<Vec<EncodedMedia>> {
        let endpoint = self.model_endpoint(&self.models.image, "predict");
        let prompt = request.instruction();
        let body = PredictRequest {
            instances: [ImageInstance { prompt: &prompt }],
            parameters: ImageParameters {
                sample_count: request.image_count(),
                aspect_ratio: request.aspect_ratio().as_str(),
                output_mime_type: "image/png",
            },
        };
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;
        let payload: PredictResponse = json_or_error("image generation", response).await?;
        let images = payload
            .predictions
            .iter()
            .filter_map(|p| {
                p.bytes_base64_encoded
                    .as_deref()
                    .map(|b64| decode_image_payload(b64, p.mime_type.as_deref()))
            })
            .collect::<StudioResult<Vec<_>>>()?;
        if images.is_empty() {
            return Err(StudioError::decode("image generation returned no images"));
        }
        Ok(images)
    }

    #[tracing::instrument(skip_all, fields(model = %self.models.video))]
    async fn start_video(&self, request: &VideoRequest) -> StudioResult<VideoOperation> {
        let endpoint = self.model_endpoint(&self.models.video, "predictLongRunning");
        let prompt = request.instruction();
        let image = request.source_image().map(|img| InlineBytes {
            bytes_base64_encoded: img.to_base64(),
            mime_type: &img.mime,
        });
        let body = PredictRequest {
            instances: [VideoInstance {
                prompt: &prompt,
                image,
            }],
            parameters: VideoParameters { sample_count: 1 },
        };
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;
        let op: OperationResponse = json_or_error("video generation", response).await?;
        tracing::info!(operation = %op.name, "video job started");
        Ok(op.into())
    }

    async fn poll_video(&self, operation: &VideoOperation) -> StudioResult<VideoOperation> {
        let endpoint = format!("{}/{}", self.api_base, operation.name);
        let response = self
            .http
            .get(&endpoint)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;
        let op: OperationResponse = json_or_error("video status", response).await?;
        Ok(op.into())
    }

    async fn fetch_video(&self, uri: &str) -> StudioResult<VideoResource> {
        let response = self
            .http
            .get(uri)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StudioError::transport(format!(
                "video download failed ({})",
                status.as_u16()
            )));
        }
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or(MP4_MIME)
            .to_string();
        let bytes = response.bytes().await?;
        Ok(VideoResource::Inline(EncodedMedia::new(mime, bytes.to_vec())))
    }

    #[tracing::instrument(skip_all, fields(model = %self.models.edit, tool = ?request.tool()))]
    async fn edit_image(&self, request: &EditRequest) -> StudioResult<String> {
        let endpoint = self.model_endpoint(&self.models.edit, "generateContent");
        let mut parts = vec![
            Part::Text(request.instruction()),
            Part::InlineData(InlineData {
                mime_type: &request.image().mime,
                data: request.image().to_base64(),
            }),
        ];
        if let Some(mask) = request.mask() {
            parts.push(Part::InlineData(InlineData {
                mime_type: &mask.mime,
                data: mask.to_base64(),
            }));
        }
        let body = GenerateContentRequest {
            contents: [Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "text/plain",
            },
        };
        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;
        let payload: GenerateContentResponse = json_or_error("image edit", response).await?;
        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text)
    }
}
