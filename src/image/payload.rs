//! Lenient base64 decoding for registry payloads and caller-supplied logos.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::error::DecodeError;
use crate::constants::MIN_LOGO_BYTES;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

const LOGO_PLACEHOLDER: &str = "logo_b64";

/// Decodes a data URL (`data:image/png;base64,...`) or bare base64 string.
///
/// Tolerates surrounding quotes, line breaks, spaces that replaced `+`, missing
/// padding and the URL-safe alphabet. Returns the bytes and the MIME type from the
/// data-URL header, if any.
pub fn decode_any_base64(input: &str) -> Result<(Vec<u8>, Option<String>), DecodeError> {
    let trimmed = input.trim().trim_matches(|c| c == '"' || c == '\'');

    let (payload, mime) = match trimmed.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or(DecodeError::MalformedDataUrl)?;
            let mime = header
                .split(';')
                .next()
                .map(|m| m.trim().to_ascii_lowercase())
                .filter(|m| !m.is_empty());
            (payload, mime)
        }
        None => (trimmed, None),
    };

    let cleaned: String = payload
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            c if c.is_whitespace() => None,
            c => Some(c),
        })
        .collect();

    if cleaned.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = match STANDARD_LENIENT.decode(&cleaned) {
        Ok(bytes) => bytes,
        Err(_) => {
            let remapped: String = cleaned
                .chars()
                .map(|c| match c {
                    '-' => '+',
                    '_' => '/',
                    c => c,
                })
                .collect();
            STANDARD_LENIENT
                .decode(&remapped)
                .map_err(|e| DecodeError::InvalidBase64 {
                    reason: e.to_string(),
                })?
        }
    };

    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok((bytes, mime))
}

/// Decodes a caller-supplied logo, rejecting placeholders and tiny payloads.
pub fn decode_user_logo(input: &str) -> Result<Vec<u8>, DecodeError> {
    if input
        .trim()
        .to_ascii_lowercase()
        .starts_with(LOGO_PLACEHOLDER)
    {
        return Err(DecodeError::Placeholder);
    }

    let (bytes, _) = decode_any_base64(input)?;
    if bytes.len() < MIN_LOGO_BYTES {
        return Err(DecodeError::TooShort {
            len: bytes.len(),
            min: MIN_LOGO_BYTES,
        });
    }
    Ok(bytes)
}
