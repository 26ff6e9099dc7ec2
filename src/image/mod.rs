//! Candidate image resolution and normalization.
//!
//! Registry records carry mark images in many shapes: inline base64 under varying
//! keys, URLs, or nothing at all (served from dedicated endpoints). [`ImageResolver`]
//! tries each source in order of cost and hands back a [`NormalizedImage`].

pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod payload;
pub mod resolver;


pub use config::ImageConfig;
pub use error::{DecodeError, ImageError};
pub use extract::{ImageRef, find_image_refs};
pub use normalize::{ImageEncoding, NormalizedImage, normalize};
pub use payload::{decode_any_base64, decode_user_logo};
pub use resolver::{ImageResolver, normalize_blocking};
