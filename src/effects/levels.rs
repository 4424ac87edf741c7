use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::unit_to_u8;
use crate::raster::buffer::ImageBuffer;

/// Tone-map a buffer: level remap with gamma, then sigmoidal contrast, then
/// brightness modulation, in that fixed order.
///
/// Parameter ranges: `black_point`/`white_point` in 0-100 with
/// `white_point > black_point`, `gamma` 0.1-5.0, `contrast` 0.1-5.0,
/// `lightness` -100..100. Steps with neutral values (`contrast == 1.0`,
/// `lightness == 0`) are skipped exactly, and an all-neutral call is a
/// pixel-exact no-op.
///
/// The three steps compose into a single 256-entry LUT applied to the color
/// channels; alpha is untouched.
pub fn adjust_levels(
    img: &ImageBuffer,
    black_point: f32,
    white_point: f32,
    gamma: f32,
    contrast: f32,
    lightness: f32,
) -> DrapeResult<ImageBuffer> {
    validate_level_params(black_point, white_point, gamma, contrast, lightness)?;

    let mut lut = level_lut(black_point / 100.0, white_point / 100.0, gamma);
    if contrast != 1.0 {
        let sig = sigmoidal_lut(contrast * 3.0, 0.5);
        lut = compose_luts(&lut, &sig);
    }
    if lightness != 0.0 {
        let bright = brightness_lut((100.0 + lightness) / 100.0);
        lut = compose_luts(&lut, &bright);
    }

    let mut out = img.data().to_vec();
    for px in out.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = lut[usize::from(*c)];
        }
    }
    ImageBuffer::from_rgba8(img.width(), img.height(), out)
}

pub(crate) fn validate_level_params(
    black_point: f32,
    white_point: f32,
    gamma: f32,
    contrast: f32,
    lightness: f32,
) -> DrapeResult<()> {
    if !(0.0..=100.0).contains(&black_point) || !(0.0..=100.0).contains(&white_point) {
        return Err(DrapeError::invalid_input(
            "black_point and white_point must be in 0..=100",
        ));
    }
    if white_point <= black_point {
        return Err(DrapeError::invalid_input(
            "white_point must be greater than black_point",
        ));
    }
    if !(0.1..=5.0).contains(&gamma) {
        return Err(DrapeError::invalid_input("gamma must be in 0.1..=5.0"));
    }
    if !(0.1..=5.0).contains(&contrast) {
        return Err(DrapeError::invalid_input("contrast must be in 0.1..=5.0"));
    }
    if !(-100.0..=100.0).contains(&lightness) {
        return Err(DrapeError::invalid_input("lightness must be in -100..=100"));
    }
    Ok(())
}

// Map [black, white] to [0, 1] with gamma correction applied as t^(1/gamma).
fn level_lut(black: f32, white: f32, gamma: f32) -> [u8; 256] {
    let span = white - black;
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let v = i as f32 / 255.0;
        let t = ((v - black) / span).clamp(0.0, 1.0);
        let t = if gamma == 1.0 { t } else { t.powf(1.0 / gamma) };
        *slot = unit_to_u8(t);
    }
    lut
}

// Scaled logistic curve centered at `midpoint`, rescaled so 0 and 1 are fixed points.
fn sigmoidal_lut(strength: f32, midpoint: f32) -> [u8; 256] {
    let logistic = |v: f32| 1.0 / (1.0 + (strength * (midpoint - v)).exp());
    let lo = logistic(0.0);
    let hi = logistic(1.0);
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let v = i as f32 / 255.0;
        *slot = unit_to_u8((logistic(v) - lo) / (hi - lo));
    }
    lut
}

fn brightness_lut(factor: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = (i as f32 * factor).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

fn compose_luts(first: &[u8; 256], second: &[u8; 256]) -> [u8; 256] {
    let mut out = [0u8; 256];
    for i in 0..256 {
        out[i] = second[usize::from(first[i])];
    }
    out
}
