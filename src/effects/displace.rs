use crate::foundation::error::{DrapeError, DrapeResult};
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Warp `source` by per-pixel depth intensity.
///
/// The depth buffer is stretch-resized to the source dimensions, then each
/// output pixel samples the source offset by `strength * (2*d/255 - 1)` in
/// both axes: 50% gray leaves a pixel in place, white pulls by `+strength`,
/// black by `-strength`. Sampling is bilinear and edge-clamped.
///
/// `strength == 0` is an exact identity. Negative strength reverses the
/// displacement direction.
pub fn displace(source: &ImageBuffer, depth: &GrayBuffer, strength: f32) -> DrapeResult<ImageBuffer> {
    if !strength.is_finite() {
        return Err(DrapeError::invalid_input(
            "displacement strength must be finite",
        ));
    }
    if strength == 0.0 {
        return Ok(source.clone());
    }

    let (width, height) = source.dimensions();
    let depth = depth.resized(width, height)?;

    let mut data = Vec::with_capacity(source.data().len());
    for y in 0..height {
        for x in 0..width {
            let d = f32::from(depth.value(x, y)) / 255.0;
            let offset = strength * (2.0 * d - 1.0);
            let px = sample_bilinear(source, x as f32 + offset, y as f32 + offset);
            data.extend_from_slice(&px);
        }
    }
    ImageBuffer::from_rgba8(width, height, data)
}

fn sample_bilinear(src: &ImageBuffer, x: f32, y: f32) -> [u8; 4] {
    let (w, h) = src.dimensions();
    let max_x = (w - 1) as f32;
    let max_y = (h - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as u32;
    let y0 = y0 as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let p00 = src.pixel(x0, y0);
    let p10 = src.pixel(x1, y0);
    let p01 = src.pixel(x0, y1);
    let p11 = src.pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) * (1.0 - fx) + f32::from(p10[c]) * fx;
        let bottom = f32::from(p01[c]) * (1.0 - fx) + f32::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
