use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::unit_to_u8;
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Closed set of pointwise blend operators.
///
/// Exhaustive matching below guarantees no unsupported mode can silently no-op.
/// The two non-pointwise Wand operators are typed functions instead:
/// copy-opacity is [`clip_to_mask`], displace is [`crate::effects::displace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Multiply,
    Overlay,
    HardLight,
    Over,
    Difference,
}

/// Blend `src` onto `dst`, returning a new buffer of `dst`'s dimensions.
///
/// Channels follow the separable-blend compositing equations on straight
/// alpha: a fully transparent source pixel leaves the destination pixel
/// bit-identical, which the pipeline relies on for mask-confined layers.
pub fn blend(dst: &ImageBuffer, src: &ImageBuffer, mode: BlendMode) -> DrapeResult<ImageBuffer> {
    if dst.dimensions() != src.dimensions() {
        return Err(DrapeError::stage(format!(
            "blend dimension mismatch: {}x{} vs {}x{}",
            dst.width(),
            dst.height(),
            src.width(),
            src.height()
        )));
    }

    let mut out = Vec::with_capacity(dst.data().len());
    for (d, s) in dst.data().chunks_exact(4).zip(src.data().chunks_exact(4)) {
        let px = blend_px([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], mode);
        out.extend_from_slice(&px);
    }
    ImageBuffer::from_rgba8(dst.width(), dst.height(), out)
}

fn blend_px(dst: [u8; 4], src: [u8; 4], mode: BlendMode) -> [u8; 4] {
    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    if sa <= 0.0 {
        return dst;
    }

    let ao = sa + da * (1.0 - sa);
    if ao <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = unit_to_u8(ao);
    for c in 0..3 {
        let cs = f32::from(src[c]) / 255.0;
        let cd = f32::from(dst[c]) / 255.0;
        let f = match mode {
            BlendMode::Multiply => cd * cs,
            BlendMode::Overlay => hard_light(cd, cs),
            BlendMode::HardLight => hard_light(cs, cd),
            BlendMode::Over => cs,
            BlendMode::Difference => (cd - cs).abs(),
        };
        let co = cs * sa * (1.0 - da) + cd * da * (1.0 - sa) + f * sa * da;
        out[c] = unit_to_u8(co / ao);
    }
    out
}

// hard_light(selector, other): the selector channel picks between the
// multiply and screen halves. Overlay is hard-light with the roles swapped.
fn hard_light(selector: f32, other: f32) -> f32 {
    if selector <= 0.5 {
        2.0 * selector * other
    } else {
        1.0 - 2.0 * (1.0 - selector) * (1.0 - other)
    }
}

/// Replace `src`'s alpha channel with the mask values (Wand's copy-opacity).
///
/// Regions where the mask is 0 become fully transparent; color channels are
/// left untouched. Dimensions must already match.
pub fn clip_to_mask(src: &ImageBuffer, mask: &GrayBuffer) -> DrapeResult<ImageBuffer> {
    if src.dimensions() != mask.dimensions() {
        return Err(DrapeError::stage(format!(
            "mask dimension mismatch: {}x{} vs {}x{}",
            src.width(),
            src.height(),
            mask.width(),
            mask.height()
        )));
    }
    let mut out = src.data().to_vec();
    for (px, &m) in out.chunks_exact_mut(4).zip(mask.data().iter()) {
        px[3] = m;
    }
    ImageBuffer::from_rgba8(src.width(), src.height(), out)
}
