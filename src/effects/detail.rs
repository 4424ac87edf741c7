use crate::foundation::error::DrapeResult;
use crate::raster::blend::{BlendMode, blend, clip_to_mask};
use crate::raster::blur::blur_gray;
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Default gaussian sigma for detail extraction.
pub const DEFAULT_DETAIL_SIGMA: f32 = 0.5;

/// Extract the high-frequency detail of `image`, confined to `mask`.
///
/// Blur-difference: grayscale the image, subtract a gaussian-blurred copy,
/// stretch the residual for visibility, then overlay it onto a 50% gray canvas
/// so detail reads as surface relief rather than raw difference noise. The
/// mask becomes the layer's opacity, so everything outside it is transparent.
pub fn extract_detail(
    image: &ImageBuffer,
    mask: &GrayBuffer,
    blur_sigma: f32,
) -> DrapeResult<ImageBuffer> {
    let (width, height) = image.dimensions();
    let mask = mask.resized(width, height)?;

    let gray = image.to_gray();
    let blurred = blur_gray(&gray, blur_sigma)?;
    let residual = gray.difference(&blurred)?.normalized();

    let canvas = ImageBuffer::solid(width, height, [128, 128, 128])?;
    let relief = blend(&canvas, &residual.to_rgba(), BlendMode::Overlay)?;
    clip_to_mask(&relief, &mask)
}
