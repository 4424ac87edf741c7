use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};

/// Straight-alpha RGBA8 raster buffer, row-major, tightly packed.
///
/// Every transform returns a new buffer; pipeline stages never mutate shared
/// state. A stage owns its output exclusively until it hands it downstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Single-channel 8-bit raster buffer.
///
/// Doubles as the mask type (values are opacity) and the depth type (brighter
/// is nearer, by convention of the depth model).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

fn checked_len(width: u32, height: u32, channels: usize) -> DrapeResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| DrapeError::stage("buffer size overflow"))
}

impl ImageBuffer {
    /// Wrap raw RGBA8 bytes. The byte length must be exactly `width*height*4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> DrapeResult<Self> {
        let expected = checked_len(width, height, 4)?;
        if data.len() != expected {
            return Err(DrapeError::stage(format!(
                "rgba buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid opaque canvas of the given color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DrapeResult<Self> {
        let len = checked_len(width, height, 4)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..(len / 4) {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize * self.width as usize) + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Resample to exact `width x height` with no aspect preservation.
    ///
    /// Matching dimensions return a clone, bit for bit.
    pub fn resized(&self, width: u32, height: u32) -> DrapeResult<Self> {
        if width == 0 || height == 0 {
            return Err(DrapeError::stage("resize target must be non-zero"));
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| DrapeError::stage("rgba buffer does not match its dimensions"))?;
        let out = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Ok(Self {
            width,
            height,
            data: out.into_raw(),
        })
    }

    /// Crop to `width x height`, anchored at the top-left corner.
    pub fn cropped(&self, width: u32, height: u32) -> DrapeResult<Self> {
        if width == 0 || height == 0 || width > self.width || height > self.height {
            return Err(DrapeError::stage(format!(
                "cannot crop {}x{} buffer to {width}x{height}",
                self.width, self.height
            )));
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let mut data = Vec::with_capacity(checked_len(width, height, 4)?);
        let src_stride = self.width as usize * 4;
        let row_bytes = width as usize * 4;
        for y in 0..height as usize {
            let start = y * src_stride;
            data.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Convert to single-channel luminance using Rec.601 weights.
    pub fn to_gray(&self) -> GrayBuffer {
        let mut data = Vec::with_capacity(self.data.len() / 4);
        for px in self.data.chunks_exact(4) {
            let lum = (299 * u32::from(px[0]) + 587 * u32::from(px[1]) + 114 * u32::from(px[2])
                + 500)
                / 1000;
            data.push(lum as u8);
        }
        GrayBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Scale the alpha channel by `factor`, color channels untouched.
    pub fn opacity_scaled(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(4) {
            px[3] = unit_to_u8(f32::from(px[3]) / 255.0 * factor);
        }
        out
    }

    /// Scale the color channels by `factor`, alpha untouched.
    pub fn intensity_scaled(&self, factor: f32) -> Self {
        let factor = factor.max(0.0);
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(4) {
            for c in &mut px[..3] {
                *c = (f32::from(*c) * factor).round().clamp(0.0, 255.0) as u8;
            }
        }
        out
    }

    /// Pointwise multiply of the color channels by a gray buffer of equal dimensions.
    pub fn multiplied_gray(&self, gray: &GrayBuffer) -> DrapeResult<Self> {
        if self.dimensions() != gray.dimensions() {
            return Err(DrapeError::stage(format!(
                "multiply dimension mismatch: {}x{} vs {}x{}",
                self.width, self.height, gray.width, gray.height
            )));
        }
        let mut out = self.clone();
        for (px, &g) in out.data.chunks_exact_mut(4).zip(gray.data.iter()) {
            for c in &mut px[..3] {
                *c = mul_div255_u8(u16::from(*c), u16::from(g));
            }
        }
        Ok(out)
    }
}

impl GrayBuffer {
    /// Wrap raw single-channel bytes. The length must be exactly `width*height`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> DrapeResult<Self> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(DrapeError::stage(format!(
                "gray buffer length {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Solid canvas of a single gray value.
    pub fn solid(width: u32, height: u32, value: u8) -> DrapeResult<Self> {
        let len = checked_len(width, height, 1)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn value(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Resample to exact `width x height` (direct stretch, no aspect preservation).
    ///
    /// Matching dimensions return a clone; the source is never resized in place.
    pub fn resized(&self, width: u32, height: u32) -> DrapeResult<Self> {
        if width == 0 || height == 0 {
            return Err(DrapeError::stage("resize target must be non-zero"));
        }
        if (width, height) == (self.width, self.height) {
            return Ok(self.clone());
        }
        let img = image::GrayImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| DrapeError::stage("gray buffer does not match its dimensions"))?;
        let out = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);
        Ok(Self {
            width,
            height,
            data: out.into_raw(),
        })
    }

    /// Stretch the value range so the darkest pixel maps to 0 and the brightest to 255.
    ///
    /// A constant buffer is returned unchanged.
    pub fn normalized(&self) -> Self {
        let (mut min, mut max) = (u8::MAX, u8::MIN);
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
        }
        if min >= max {
            return self.clone();
        }
        let span = f32::from(max - min);
        let mut out = self.clone();
        for v in &mut out.data {
            *v = ((f32::from(*v - min) / span) * 255.0).round() as u8;
        }
        out
    }

    /// Pointwise multiply with another gray buffer of equal dimensions.
    pub fn multiplied(&self, other: &GrayBuffer) -> DrapeResult<Self> {
        if self.dimensions() != other.dimensions() {
            return Err(DrapeError::stage(format!(
                "multiply dimension mismatch: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        let mut out = self.clone();
        for (v, &o) in out.data.iter_mut().zip(other.data.iter()) {
            *v = mul_div255_u8(u16::from(*v), u16::from(o));
        }
        Ok(out)
    }

    /// Uniformly subtract a normalized [0, 1] amount, saturating at 0.
    pub fn subtracted_scalar(&self, amount: f32) -> Self {
        let sub = unit_to_u8(amount.clamp(0.0, 1.0));
        let mut out = self.clone();
        for v in &mut out.data {
            *v = v.saturating_sub(sub);
        }
        out
    }

    /// Pointwise absolute difference against another gray buffer of equal dimensions.
    pub fn difference(&self, other: &GrayBuffer) -> DrapeResult<Self> {
        if self.dimensions() != other.dimensions() {
            return Err(DrapeError::stage(format!(
                "difference dimension mismatch: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        let mut out = self.clone();
        for (v, &o) in out.data.iter_mut().zip(other.data.iter()) {
            *v = v.abs_diff(o);
        }
        Ok(out)
    }

    /// Expand to an opaque RGBA buffer with all color channels set to the gray value.
    pub fn to_rgba(&self) -> ImageBuffer {
        let mut data = Vec::with_capacity(self.data.len() * 4);
        for &v in &self.data {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        ImageBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }
}
