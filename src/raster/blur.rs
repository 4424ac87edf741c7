use crate::foundation::error::{DrapeError, DrapeResult};
use crate::raster::buffer::GrayBuffer;

/// Separable gaussian blur of a gray buffer.
///
/// `sigma <= 0` is an exact identity (returns a clone). The kernel radius is
/// derived as `ceil(3 * sigma)` and weights are Q16 fixed point, normalized so
/// a constant image stays bit-identical.
pub fn blur_gray(src: &GrayBuffer, sigma: f32) -> DrapeResult<GrayBuffer> {
    if !sigma.is_finite() {
        return Err(DrapeError::invalid_input("blur sigma must be finite"));
    }
    if sigma <= 0.0 {
        return Ok(src.clone());
    }

    let radius = (3.0 * sigma).ceil().max(1.0) as u32;
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let (width, height) = src.dimensions();
    let mut tmp = vec![0u8; src.data().len()];
    let mut out = vec![0u8; src.data().len()];
    horizontal_pass(src.data(), &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    GrayBuffer::from_raw(width, height, out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> DrapeResult<Vec<u32>> {
    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(DrapeError::stage("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push the rounding residue into the center tap so the weights sum to exactly 1.0 in Q16.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                acc += u64::from(kw) * u64::from(src[(y * w + sx) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u64;
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                acc += u64::from(kw) * u64::from(src[(sy * w + x) as usize]);
            }
            dst[(y * w + x) as usize] = q16_to_u8(acc);
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    (((acc + 32768) >> 16).min(255)) as u8
}
