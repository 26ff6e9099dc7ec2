//! Canonical image form: RGB JPEG (quality 85), longer edge at most 512 px.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage, RgbaImage};
use resvg::{tiny_skia, usvg};

use super::error::ImageError;
use crate::constants::{JPEG_QUALITY, MAX_IMAGE_DIMENSION};

const SNIFF_LEN: usize = 256;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output encoding of a [`NormalizedImage`]. Only JPEG is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg,
}

/// An image in canonical form, ready for embedding.
#[derive(Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for NormalizedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedImage")
            .field("len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl NormalizedImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> ImageEncoding {
        ImageEncoding::Jpeg
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Decodes the canonical JPEG back to pixels.
    pub fn to_rgb(&self) -> Result<RgbImage, ImageError> {
        image::load_from_memory_with_format(&self.bytes, image::ImageFormat::Jpeg)
            .map(|img| img.to_rgb8())
            .map_err(|e| ImageError::Decode {
                reason: e.to_string(),
            })
    }
}

/// Coarse classification of raw bytes before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sniffed {
    Svg,
    Raster,
}

fn sniff(bytes: &[u8], content_type: Option<&str>) -> Result<Sniffed, ImageError> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let head = head.strip_prefix(UTF8_BOM).unwrap_or(head);

    if head.starts_with(b"%PDF") {
        return Err(ImageError::NotAnImage {
            reason: "PDF document".to_string(),
        });
    }
    if head.starts_with(b"PK\x03\x04") {
        return Err(ImageError::NotAnImage {
            reason: "ZIP/Office archive".to_string(),
        });
    }

    let text = head.trim_ascii_start().to_ascii_lowercase();
    if text.starts_with(b"<!doctype html") || text.starts_with(b"<html") {
        return Err(ImageError::NotAnImage {
            reason: "HTML document".to_string(),
        });
    }
    if text.starts_with(b"{") || text.starts_with(b"[") {
        return Err(ImageError::NotAnImage {
            reason: "JSON document".to_string(),
        });
    }

    let declared_svg = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("image/svg+xml"));
    let looks_svg = text.starts_with(b"<?xml") || text.windows(4).any(|w| w == b"<svg");
    if declared_svg || looks_svg {
        Ok(Sniffed::Svg)
    } else {
        Ok(Sniffed::Raster)
    }
}

/// Converts arbitrary image bytes to the canonical form.
///
/// CPU-bound; callers on the async runtime should wrap it in `spawn_blocking`.
pub fn normalize(bytes: &[u8], content_type: Option<&str>) -> Result<NormalizedImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Decode {
            reason: "empty payload".to_string(),
        });
    }

    let rgb = match sniff(bytes, content_type)? {
        Sniffed::Svg => rasterize_svg(bytes)?,
        Sniffed::Raster => flatten_to_rgb(decode_raster(bytes)?),
    };

    let rgb = downscale(rgb);
    let (width, height) = rgb.dimensions();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Encode {
            reason: e.to_string(),
        })?;

    Ok(NormalizedImage {
        bytes: out,
        width,
        height,
    })
}

/// Decodes the first frame and applies embedded EXIF orientation.
fn decode_raster(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let decode_err = |e: &dyn std::fmt::Display| ImageError::Decode {
        reason: e.to_string(),
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(&e))?;
    let mut decoder = reader.into_decoder().map_err(|e| decode_err(&e))?;
    let orientation = decoder.orientation().ok();
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_err(&e))?;
    if let Some(orientation) = orientation {
        img.apply_orientation(orientation);
    }
    Ok(img)
}

/// Composites any alpha channel onto white and drops it.
fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba: RgbaImage = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = u16::from(a);
        let over_white = |c: u8| ((u16::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

/// Renders an SVG onto a white canvas whose longer edge is 512 px.
fn rasterize_svg(bytes: &[u8]) -> Result<RgbImage, ImageError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default()).map_err(|e| {
        ImageError::SvgRender {
            reason: e.to_string(),
        }
    })?;

    let size = tree.size();
    let longest = size.width().max(size.height());
    if !(longest.is_finite() && longest > 0.0) {
        return Err(ImageError::SvgRender {
            reason: "SVG has no drawable size".to_string(),
        });
    }

    let scale = MAX_IMAGE_DIMENSION as f32 / longest;
    let width = ((size.width() * scale).round() as u32).clamp(1, MAX_IMAGE_DIMENSION);
    let height = ((size.height() * scale).round() as u32).clamp(1, MAX_IMAGE_DIMENSION);

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| ImageError::SvgRender {
        reason: format!("cannot allocate {width}x{height} canvas"),
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // Opaque canvas, so premultiplied RGBA equals straight RGB.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    RgbImage::from_raw(width, height, rgb).ok_or_else(|| ImageError::SvgRender {
        reason: "rasterized buffer size mismatch".to_string(),
    })
}

/// Shrinks so the longer edge is at most 512 px. Never upscales.
fn downscale(rgb: RgbImage) -> RgbImage {
    let (w, h) = rgb.dimensions();
    if w.max(h) <= MAX_IMAGE_DIMENSION {
        return rgb;
    }
    DynamicImage::ImageRgb8(rgb)
        .thumbnail(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION)
        .to_rgb8()
}
