//! Cross-cutting, shared constants.
//!
//! Defaults live here so the config layer, the engine and the tests agree on them.
//! Every value is overridable through [`crate::config::Config`].

use std::time::Duration;

/// Minimum combined score a candidate needs to be reported.
pub const DEFAULT_THRESHOLD: f32 = 0.85;

/// Number of ranked results returned per search.
pub const DEFAULT_TOP_K: usize = 5;

/// Text share of the combined score when an image score exists.
pub const DEFAULT_TEXT_WEIGHT: f32 = 0.5;

/// Image share of the combined score when an image score exists.
pub const DEFAULT_IMAGE_WEIGHT: f32 = 0.5;

/// Tolerance used when checking that score weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f32 = 1e-6;

/// Records requested from the registry per search stream (single page).
pub const DEFAULT_PAGE_SIZE: u32 = 75;

/// Seconds shaved off a token's advertised lifetime before it is treated as expired.
pub const TOKEN_SAFETY_MARGIN_SECS: u64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Advertised token lifetimes are capped at one day.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 86_400;

pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_DETAIL_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Whole-search deadline when the caller does not supply one.
pub const DEFAULT_SEARCH_DEADLINE: Duration = Duration::from_secs(60);

/// Longest edge of a normalized image, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 512;

/// JPEG quality used for the canonical encoding.
pub const JPEG_QUALITY: u8 = 85;

/// Concurrent in-flight image resolutions per search.
pub const DEFAULT_IMAGE_CONCURRENCY: usize = 6;

/// Upper bound accepted for the image concurrency setting.
pub const MAX_IMAGE_CONCURRENCY: usize = 16;

/// Consecutive image misses after which image fetching stops for the search.
pub const DEFAULT_MAX_IMAGE_MISSES: usize = 20;

/// Node budget for the last-resort structural walk over a registry record.
pub const MAX_WALK_NODES: usize = 5_000;

/// Inline payload strings shorter than this are not treated as image data.
pub const MIN_INLINE_PAYLOAD_CHARS: usize = 100;

/// Caller-supplied logos must decode to at least this many bytes.
pub const MIN_LOGO_BYTES: usize = 64;

/// Registry error bodies are truncated to this many characters.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Response header carrying the search outcome (`ranked`, `no_match`, `error`).
pub const MARKWATCH_STATUS_HEADER: &str = "x-markwatch-status";
