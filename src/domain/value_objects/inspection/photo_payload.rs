use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhotoPayloadError {
    #[error("Photo payload is empty")]
    Empty,

    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),

    #[error("Unsupported data URL encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),
}

/// Image bytes carried inline as a `data:<mime>;base64,<data>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    mime_type: String,
    data: String,
}

impl InlineImage {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn parse(value: &str) -> Result<Self, PhotoPayloadError> {
        let rest = value
            .strip_prefix("data:")
            .ok_or_else(|| PhotoPayloadError::MalformedDataUrl("missing data: prefix".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| PhotoPayloadError::MalformedDataUrl("missing ',' separator".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| PhotoPayloadError::UnsupportedEncoding(header.to_string()))?;

        Ok(Self {
            mime_type: if mime_type.is_empty() {
                "application/octet-stream".to_string()
            } else {
                mime_type.to_string()
            },
            data: data.to_string(),
        })
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn decode(&self) -> Result<Vec<u8>, PhotoPayloadError> {
        STANDARD
            .decode(self.data.trim())
            .map_err(|err| PhotoPayloadError::InvalidBase64(err.to_string()))
    }

    pub fn file_extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/heic" => "heic",
            _ => "bin",
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One photo slot's content: bytes awaiting upload, or an address already
/// held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PhotoPayload {
    Inline(InlineImage),
    Remote(String),
}

impl PhotoPayload {
    pub fn parse(value: &str) -> Result<Self, PhotoPayloadError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PhotoPayloadError::Empty);
        }
        if value.starts_with("data:") {
            return InlineImage::parse(value).map(PhotoPayload::Inline);
        }
        Ok(PhotoPayload::Remote(value.to_string()))
    }

    pub fn inline(mime_type: &str, bytes: &[u8]) -> Self {
        PhotoPayload::Inline(InlineImage::from_bytes(mime_type, bytes))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, PhotoPayload::Inline(_))
    }

    pub fn remote_url(&self) -> Option<&str> {
        match self {
            PhotoPayload::Remote(url) => Some(url),
            PhotoPayload::Inline(_) => None,
        }
    }
}

impl fmt::Display for PhotoPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoPayload::Inline(image) => write!(f, "<inline {}>", image.mime_type),
            PhotoPayload::Remote(url) => write!(f, "{url}"),
        }
    }
}

impl TryFrom<String> for PhotoPayload {
    type Error = PhotoPayloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhotoPayload> for String {
    fn from(payload: PhotoPayload) -> Self {
        match payload {
            PhotoPayload::Inline(image) => image.to_data_url(),
            PhotoPayload::Remote(url) => url,
        }
    }
}
