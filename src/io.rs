use anyhow::Context;

use crate::foundation::error::DrapeResult;
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Decode an encoded raster image (PNG, JPEG, ...) into an RGBA buffer.
pub fn decode_image(bytes: &[u8]) -> DrapeResult<ImageBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageBuffer::from_rgba8(width, height, rgba.into_raw())
}

/// Decode an encoded raster image into a single-channel mask/depth buffer.
pub fn decode_mask(bytes: &[u8]) -> DrapeResult<GrayBuffer> {
    let dyn_img = image::load_from_memory(bytes).context("decode mask from memory")?;
    let gray = dyn_img.to_luma8();
    let (width, height) = gray.dimensions();
    GrayBuffer::from_raw(width, height, gray.into_raw())
}

/// Encode an RGBA buffer as PNG bytes.
pub fn encode_png(image: &ImageBuffer) -> DrapeResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(image.width(), image.height(), image.data().to_vec())
        .context("rgba buffer does not match its dimensions")?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_preserves_pixels() {
        let src = ImageBuffer::from_rgba8(2, 1, vec![10, 20, 30, 255, 200, 150, 100, 255]).unwrap();
        let png = encode_png(&src).unwrap();
        let back = decode_image(&png).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn decode_mask_converts_to_luma() {
        let src = ImageBuffer::from_rgba8(1, 1, vec![255, 255, 255, 255]).unwrap();
        let png = encode_png(&src).unwrap();
        let mask = decode_mask(&png).unwrap();
        assert_eq!(mask.data(), &[255]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_image(b"not an image").is_err());
    }
}
