use crate::foundation::error::DrapeResult;
use crate::raster::blend::clip_to_mask;
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Default light color: 48% gray.
pub const DEFAULT_LIGHT_COLOR: [u8; 3] = [122, 122, 122];

/// Synthesize the lighting layer that visually glues the texture to the
/// background's apparent depth.
///
/// This is a stylized 2.5D approximation, not physically accurate
/// illumination: the depth map is darkened by the background's own normalized
/// luminance, biased down by `lighting_strength`, and used to modulate a solid
/// `light_color` canvas. The mask confines the layer; everything outside it is
/// fully transparent.
pub fn synthesize_lighting(
    depth: &GrayBuffer,
    background: &ImageBuffer,
    mask: &GrayBuffer,
    lighting_strength: f32,
    light_color: [u8; 3],
) -> DrapeResult<ImageBuffer> {
    let (width, height) = background.dimensions();
    let depth = depth.resized(width, height)?;
    let mask = mask.resized(width, height)?;

    // Background luminance, stretched to full range so lighting responds to
    // relative shading rather than absolute exposure.
    let luminance = background.to_gray().normalized();

    let lighting = depth
        .multiplied(&luminance)?
        .subtracted_scalar(lighting_strength.clamp(0.0, 1.0));

    let canvas = ImageBuffer::solid(width, height, light_color)?;
    let lit = canvas.multiplied_gray(&lighting)?;
    clip_to_mask(&lit, &mask)
}
