use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::assets::media::{BaseImage, EncodedMedia, PNG_MIME};
use crate::foundation::core::PixelSize;
use crate::foundation::error::{StudioError, StudioResult};

/// Message surfaced when an edit response does not contain a usable base64 image.
pub const INVALID_FORMAT_MESSAGE: &str =
    "Received an invalid format from the API. Please try again.";
/// Message surfaced when an edit response is blank after cleanup.
pub const EMPTY_RESPONSE_MESSAGE: &str = "API returned an empty response.";

const FENCE: &str = "```";
const FENCE_LANGS: [&str; 3] = ["json", "plaintext", "png"];

/// Decode an uploaded image into a [`BaseImage`].
pub fn decode_base_image(encoded: EncodedMedia) -> StudioResult<BaseImage> {
    let dyn_img = image::load_from_memory(encoded.bytes.as_slice())
        .context("decode base image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = PixelSize::new(width, height)?;
    Ok(BaseImage {
        encoded,
        size,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

/// Decode raw file bytes into a [`BaseImage`], sniffing the MIME type.
pub fn decode_base_image_bytes(bytes: Vec<u8>) -> StudioResult<BaseImage> {
    decode_base_image(EncodedMedia::sniff_image(bytes)?)
}

/// Strip code-fence markup and line breaks from a text response that should hold base64.
///
/// Fences may carry a `json`, `plaintext` or `png` language tag. Returns the trimmed remainder,
/// which may be empty.
pub fn strip_code_fences(text: &str) -> String {
    let mut rest = text.trim();
    let mut out = String::with_capacity(rest.len());
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if let Some(lang) = FENCE_LANGS.into_iter().find(|lang| rest.starts_with(lang)) {
            rest = &rest[lang.len()..];
        }
    }
    out.push_str(rest);
    out.retain(|c| c != '\r' && c != '\n');
    out.trim().to_string()
}

fn is_base64_alphabet(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

/// Extract the embedded image from an image-edit text response.
///
/// Fails with [`StudioError::Decode`] when the cleaned payload is empty, leaves the base64
/// alphabet, does not decode, or decodes to bytes of no known image format.
pub fn decode_edit_response(text: &str) -> StudioResult<EncodedMedia> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(StudioError::decode(EMPTY_RESPONSE_MESSAGE));
    }
    if !is_base64_alphabet(&cleaned) {
        tracing::error!(len = text.len(), "image edit response is not a base64 string");
        return Err(StudioError::decode(INVALID_FORMAT_MESSAGE));
    }
    let bytes = BASE64.decode(cleaned.as_bytes()).map_err(|e| {
        tracing::error!(error = %e, "image edit response failed base64 decoding");
        StudioError::decode(INVALID_FORMAT_MESSAGE)
    })?;
    let format = image::guess_format(&bytes).map_err(|e| {
        tracing::error!(error = %e, len = bytes.len(), "image edit response is not an image");
        StudioError::decode(INVALID_FORMAT_MESSAGE)
    })?;
    Ok(EncodedMedia::new(format.to_mime_type(), bytes))
}

/// Decode a bare base64 image payload returned by an image synthesis endpoint.
pub fn decode_image_payload(payload: &str, mime: Option<&str>) -> StudioResult<EncodedMedia> {
    let bytes = BASE64
        .decode(payload.trim().as_bytes())
        .map_err(|e| StudioError::decode(format!("generated image is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(StudioError::decode("generated image payload is empty"));
    }
    Ok(EncodedMedia::new(mime.unwrap_or(PNG_MIME), bytes))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
