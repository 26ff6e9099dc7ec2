use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons a single asset could not become a [`super::NormalizedImage`].
///
/// Always non-fatal for a search: the candidate is scored on text alone.
pub enum ImageError {
    /// The bytes are a known non-image format (PDF, ZIP/Office, HTML, JSON).
    #[error("not an image: {reason}")]
    NotAnImage { reason: String },

    /// Raster decoding failed.
    #[error("failed to decode image: {reason}")]
    Decode { reason: String },

    /// SVG parsing or rasterization failed.
    #[error("failed to render SVG: {reason}")]
    SvgRender { reason: String },

    /// JPEG encoding failed.
    #[error("failed to encode JPEG: {reason}")]
    Encode { reason: String },

    /// No strategy produced an image.
    #[error("no image available for {id}")]
    Unavailable { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Base64 payload errors.
pub enum DecodeError {
    #[error("base64 payload is empty")]
    Empty,

    #[error("malformed data URL: missing ',' separator")]
    MalformedDataUrl,

    #[error("invalid base64: {reason}")]
    InvalidBase64 { reason: String },

    /// Decoded payload is too small to be a real logo.
    #[error("decoded payload is {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    /// The caller passed a placeholder instead of image data.
    #[error("logo payload is a placeholder, not image data")]
    Placeholder,
}
