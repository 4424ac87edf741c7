use crate::foundation::error::{DrapeError, DrapeResult};
use crate::raster::buffer::ImageBuffer;

/// Tile `texture` to exactly `target_width x target_height`.
///
/// The texture is first scaled by `scale_factor` (rounded to whole pixels,
/// minimum 1x1), then stamped on a grid large enough to cover the target and
/// cropped top-left anchored. The output dimensions are always exactly the
/// target dimensions, regardless of `scale_factor`; a texture scaled beyond
/// the target produces a single stamp cropped inward.
pub fn tile_texture(
    texture: &ImageBuffer,
    target_width: u32,
    target_height: u32,
    scale_factor: f32,
) -> DrapeResult<ImageBuffer> {
    if target_width == 0 || target_height == 0 {
        return Err(DrapeError::invalid_input("tile target must be non-zero"));
    }
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(DrapeError::invalid_input(
            "tile scale_factor must be finite and > 0",
        ));
    }

    let scaled_w = ((texture.width() as f32) * scale_factor).round().max(1.0) as u32;
    let scaled_h = ((texture.height() as f32) * scale_factor).round().max(1.0) as u32;
    let scaled = texture.resized(scaled_w, scaled_h)?;

    let cols = target_width.div_ceil(scaled_w);
    let rows = target_height.div_ceil(scaled_h);
    let canvas_w = cols
        .checked_mul(scaled_w)
        .ok_or_else(|| DrapeError::stage("tile canvas width overflow"))?;
    let canvas_h = rows
        .checked_mul(scaled_h)
        .ok_or_else(|| DrapeError::stage("tile canvas height overflow"))?;

    let mut data = vec![0u8; canvas_w as usize * canvas_h as usize * 4];
    let stamp = scaled.data();
    let stamp_stride = scaled_w as usize * 4;
    let canvas_stride = canvas_w as usize * 4;
    for row in 0..rows {
        for col in 0..cols {
            let origin_x = col as usize * stamp_stride;
            let origin_y = row as usize * scaled_h as usize;
            for y in 0..scaled_h as usize {
                let src = &stamp[y * stamp_stride..(y + 1) * stamp_stride];
                let dst_start = (origin_y + y) * canvas_stride + origin_x;
                data[dst_start..dst_start + stamp_stride].copy_from_slice(src);
            }
        }
    }

    let canvas = ImageBuffer::from_rgba8(canvas_w, canvas_h, data)?;
    canvas.cropped(target_width, target_height)
}
