use xxhash_rust::xxh3::Xxh3;

use crate::foundation::error::DrapeResult;
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

const DIGEST_SEED: u64 = 0x6d72_4170_6544_7053;

/// Stable 128-bit content digest of an image's dimensions and pixel bytes.
///
/// Collision resistance is a correctness convenience here, not a security
/// property; xxh3-128 is more than strong enough to key the depth cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Digest the raw pixel content of a background image.
pub fn digest_pixels(image: &ImageBuffer) -> ContentDigest {
    let mut h = Xxh3::with_seed(DIGEST_SEED);
    h.update(&image.width().to_le_bytes());
    h.update(&image.height().to_le_bytes());
    h.update(image.data());
    let d = h.digest128();
    ContentDigest {
        hi: (d >> 64) as u64,
        lo: d as u64,
    }
}

/// Opaque depth-estimation collaborator: color image in, grayscale depth out.
///
/// Implementations must be deterministic for identical pixel content and free
/// of side effects visible to the pipeline. The call may be slow (model
/// inference); the orchestrator treats it as a synchronous external call and
/// never retries a failure automatically.
pub trait DepthProvider: Send + Sync {
    /// Estimate a per-pixel depth buffer for `image` (brighter = nearer).
    ///
    /// The returned buffer may have any non-zero resolution; the pipeline
    /// resizes it at each use site.
    fn estimate_depth(&self, image: &ImageBuffer) -> DrapeResult<GrayBuffer>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_for_identical_pixels() {
        let a = ImageBuffer::solid(4, 4, [1, 2, 3]).unwrap();
        let b = ImageBuffer::solid(4, 4, [1, 2, 3]).unwrap();
        assert_eq!(digest_pixels(&a), digest_pixels(&b));
    }

    #[test]
    fn digest_changes_with_pixel_content_and_dimensions() {
        let a = ImageBuffer::solid(4, 4, [1, 2, 3]).unwrap();
        let b = ImageBuffer::solid(4, 4, [1, 2, 4]).unwrap();
        let c = ImageBuffer::solid(2, 8, [1, 2, 3]).unwrap();
        assert_ne!(digest_pixels(&a), digest_pixels(&b));
        assert_ne!(digest_pixels(&a), digest_pixels(&c));
    }

    #[test]
    fn display_is_32_hex_chars() {
        let d = digest_pixels(&ImageBuffer::solid(1, 1, [0, 0, 0]).unwrap());
        assert_eq!(d.to_string().len(), 32);
    }
}
