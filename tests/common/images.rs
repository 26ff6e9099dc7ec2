//! Small deterministic test images.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode test image");
    out.into_inner()
}

/// Dark-to-light from left to right.
pub fn horizontal_gradient_png() -> Vec<u8> {
    encode(
        RgbImage::from_fn(96, 96, |x, _| {
            let v = (x * 255 / 95) as u8;
            Rgb([v, v, v])
        }),
        ImageFormat::Png,
    )
}

/// Dark-to-light from top to bottom.
pub fn vertical_gradient_png() -> Vec<u8> {
    encode(
        RgbImage::from_fn(96, 96, |_, y| {
            let v = (y * 255 / 95) as u8;
            Rgb([v, v, v])
        }),
        ImageFormat::Png,
    )
}

pub fn horizontal_gradient_jpeg() -> Vec<u8> {
    encode(
        RgbImage::from_fn(96, 96, |x, _| {
            let v = (x * 255 / 95) as u8;
            Rgb([v, v, v])
        }),
        ImageFormat::Jpeg,
    )
}
