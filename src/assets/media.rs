use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::foundation::core::PixelSize;
use crate::foundation::error::{StudioError, StudioResult};

/// MIME type used for every mask export and edited image.
pub const PNG_MIME: &str = "image/png";
/// MIME type assumed for downloaded video resources.
pub const MP4_MIME: &str = "video/mp4";

/// Encoded media bytes with their MIME type.
///
/// Cheap to clone; the payload is shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedMedia {
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// Encoded payload.
    pub bytes: Arc<Vec<u8>>,
}

impl EncodedMedia {
    /// Wrap bytes with an explicit MIME type.
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Wrap image bytes, sniffing the MIME type from the content.
    pub fn sniff_image(bytes: Vec<u8>) -> StudioResult<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| StudioError::validation(format!("unrecognized image format: {e}")))?;
        Ok(Self::new(format.to_mime_type(), bytes))
    }

    /// Parse a `data:{mime};base64,{payload}` URL.
    pub fn from_data_url(url: &str) -> StudioResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| StudioError::validation("data URL must start with 'data:'"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::validation("data URL is missing its payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| StudioError::validation("only base64 data URLs are supported"))?;
        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| StudioError::validation(format!("data URL payload is not base64: {e}")))?;
        Ok(Self::new(mime, bytes))
    }

    /// Base64 payload without any data URL framing.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes.as_slice())
    }

    /// Display-ready `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.to_base64())
    }

    /// Size of the encoded payload in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// An immutable user-supplied source image.
///
/// Replaced wholesale on upload, never mutated in place.
#[derive(Clone, Debug)]
pub struct BaseImage {
    /// The bytes exactly as supplied.
    pub encoded: EncodedMedia,
    /// Native pixel dimensions.
    pub size: PixelSize,
    /// Decoded straight-alpha RGBA8 pixels, row-major.
    pub rgba8: Arc<Vec<u8>>,
}

impl BaseImage {
    /// Encoded form as a data URL, the transport representation for uploads.
    pub fn to_data_url(&self) -> String {
        self.encoded.to_data_url()
    }
}

/// Where a generated video can be retrieved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoResource {
    /// A link the viewer streams from directly.
    Remote {
        /// Resource URI.
        uri: String,
    },
    /// Video bytes downloaded into memory.
    Inline(EncodedMedia),
}

/// A display-ready reference to a generated asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaRef {
    /// An encoded image.
    Image(EncodedMedia),
    /// A video resource.
    Video(VideoResource),
}

impl MediaRef {
    /// URL a viewer can load: a `data:` URL for in-memory content, the URI otherwise.
    pub fn display_url(&self) -> String {
        match self {
            MediaRef::Image(media) => media.to_data_url(),
            MediaRef::Video(VideoResource::Inline(media)) => media.to_data_url(),
            MediaRef::Video(VideoResource::Remote { uri }) => uri.clone(),
        }
    }

    /// In-memory bytes, if the asset is held locally.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            MediaRef::Image(media) | MediaRef::Video(VideoResource::Inline(media)) => {
                Some(media.bytes.as_slice())
            }
            MediaRef::Video(VideoResource::Remote { .. }) => None,
        }
    }
}

/// File name offered when downloading a generated asset.
///
/// The first 20 characters of the prompt, whitespace runs collapsed to `_`.
pub fn download_file_name(prompt: &str, extension: &str) -> String {
    let head: String = prompt.chars().take(20).collect();
    let mut out = String::with_capacity(head.len() + extension.len() + 1);
    let mut in_space = false;
    for c in head.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out.push('.');
    out.push_str(extension);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
