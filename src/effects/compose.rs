use crate::effects::detail::{DEFAULT_DETAIL_SIGMA, extract_detail};
use crate::effects::levels::adjust_levels;
use crate::effects::tile::tile_texture;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::params::EffectParameters;
use crate::raster::blend::{BlendMode, blend, clip_to_mask};
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Basic masked composite: clip the texture to the mask and multiply it onto
/// the background.
///
/// The mask is resized to the background; the texture is tiled (scale 1.0) or
/// resized to the background dimensions. Output matches the background.
pub fn composite_masked(
    texture: &ImageBuffer,
    background: &ImageBuffer,
    mask: &GrayBuffer,
    tile: bool,
) -> DrapeResult<ImageBuffer> {
    let (width, height) = background.dimensions();
    let mask = mask.resized(width, height)?;
    let texture = if tile {
        tile_texture(texture, width, height, 1.0)?
    } else {
        texture.resized(width, height)?
    };
    let clipped = clip_to_mask(&texture, &mask)?;
    blend(background, &clipped, BlendMode::Multiply)
}

/// Lit composite with detail preservation.
///
/// The blend operators and step order are load-bearing; reordering them or
/// swapping a mode changes the visual output:
/// 1. high-frequency detail is taken from the untouched background;
/// 2. the masked region is tinted (grayscale + levels, `over` the original);
/// 3. the texture is clipped to the mask;
/// 4. the lighting layer, with opacity scaled by `lighting_strength`, is
///    `hard-light` blended on;
/// 5. the masked texture is `multiply` blended on;
/// 6. with `detail_strength > 0`, the detail layer is intensity-scaled and
///    `overlay` blended on (it already carries the mask in its alpha). At 0
///    the step is skipped entirely.
pub fn composite_with_lighting(
    texture: &ImageBuffer,
    background: &ImageBuffer,
    mask: &GrayBuffer,
    lighting: &ImageBuffer,
    params: &EffectParameters,
) -> DrapeResult<ImageBuffer> {
    let (width, height) = background.dimensions();
    if texture.dimensions() != (width, height) {
        return Err(DrapeError::stage(format!(
            "texture {}x{} does not match background {width}x{height}",
            texture.width(),
            texture.height()
        )));
    }
    if lighting.dimensions() != (width, height) {
        return Err(DrapeError::stage(format!(
            "lighting layer {}x{} does not match background {width}x{height}",
            lighting.width(),
            lighting.height()
        )));
    }
    let mask = mask.resized(width, height)?;

    // Detail must come from the original background, before any tonal change.
    let detail = extract_detail(background, &mask, DEFAULT_DETAIL_SIGMA)?;

    let tinted = tint_masked_area(background, &mask, params)?;
    let masked_texture = clip_to_mask(texture, &mask)?;

    let adjusted_lighting = lighting.opacity_scaled(params.lighting_strength);
    let mut result = blend(&tinted, &adjusted_lighting, BlendMode::HardLight)?;
    result = blend(&result, &masked_texture, BlendMode::Multiply)?;

    if params.detail_strength > 0.0 {
        let scaled = detail.intensity_scaled(params.detail_strength);
        result = blend(&result, &scaled, BlendMode::Overlay)?;
    }

    Ok(result)
}

/// Tone the masked region of the background: grayscale it, run it through the
/// level adjuster, and lay it back over the original so everything outside the
/// mask keeps its color.
fn tint_masked_area(
    background: &ImageBuffer,
    mask: &GrayBuffer,
    params: &EffectParameters,
) -> DrapeResult<ImageBuffer> {
    let bw = background.to_gray().to_rgba();
    let adjusted = adjust_levels(
        &bw,
        params.black_point,
        params.white_point,
        params.gamma,
        params.contrast,
        params.lightness,
    )?;
    let clipped = clip_to_mask(&adjusted, mask)?;
    blend(background, &clipped, BlendMode::Over)
}
