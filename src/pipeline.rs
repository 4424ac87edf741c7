use crate::depth::{DepthCache, DepthProvider, digest_pixels};
use crate::effects::compose::composite_with_lighting;
use crate::effects::displace::displace;
use crate::effects::lighting::{DEFAULT_LIGHT_COLOR, synthesize_lighting};
use crate::effects::tile::tile_texture;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::params::EffectParameters;
use crate::raster::blur::blur_gray;
use crate::raster::buffer::{GrayBuffer, ImageBuffer};

/// Run the full combined-effects pipeline for one parameter set.
///
/// Sequence: depth (cached by background content) -> optional depth blur ->
/// texture tiling or stretch -> depth displacement -> lighting synthesis ->
/// lit composite. Every stage returns a fresh buffer; nothing upstream is
/// mutated.
///
/// Errors carry the failing checkpoint in their message: depth generation,
/// displacement, or composition. Cache failures are logged and treated as a
/// miss.
#[tracing::instrument(skip_all, fields(bg_w = background.width(), bg_h = background.height()))]
pub fn run_combined_effects(
    texture: &ImageBuffer,
    background: &ImageBuffer,
    mask: &GrayBuffer,
    params: &EffectParameters,
    provider: &dyn DepthProvider,
    cache: &dyn DepthCache,
) -> DrapeResult<ImageBuffer> {
    validate_inputs(texture, background, mask)?;
    params.validate()?;

    let mut depth = depth_for(background, provider, cache)
        .map_err(|e| DrapeError::depth(format!("depth generation failed: {e}")))?;
    if params.blur_radius > 0.0 {
        depth = blur_gray(&depth, params.blur_radius)
            .map_err(|e| DrapeError::depth(format!("depth generation failed: {e}")))?;
    }

    let (width, height) = background.dimensions();
    let displaced = prepare_texture(texture, width, height, params)
        .and_then(|tex| displace(&tex, &depth, params.displacement_strength))
        .map_err(|e| DrapeError::stage(format!("displacement failed: {e}")))?;

    let result = synthesize_lighting(
        &depth,
        background,
        mask,
        params.lighting_strength,
        DEFAULT_LIGHT_COLOR,
    )
    .and_then(|lighting| composite_with_lighting(&displaced, background, mask, &lighting, params))
    .map_err(|e| DrapeError::stage(format!("composition failed: {e}")))?;

    tracing::debug!("combined effects pipeline complete");
    Ok(result)
}

/// Run two independent parameter sets against the same source images.
///
/// The sides run in parallel over independently cloned inputs and are
/// failure-isolated: one side erroring never aborts the other. Only the
/// injected provider and cache are shared.
pub fn run_comparison(
    texture: &ImageBuffer,
    background: &ImageBuffer,
    mask: &GrayBuffer,
    params_a: &EffectParameters,
    params_b: &EffectParameters,
    provider: &dyn DepthProvider,
    cache: &dyn DepthCache,
) -> (DrapeResult<ImageBuffer>, DrapeResult<ImageBuffer>) {
    let (tex_a, bg_a, mask_a) = (texture.clone(), background.clone(), mask.clone());
    let (tex_b, bg_b, mask_b) = (texture.clone(), background.clone(), mask.clone());
    rayon::join(
        || run_combined_effects(&tex_a, &bg_a, &mask_a, params_a, provider, cache),
        || run_combined_effects(&tex_b, &bg_b, &mask_b, params_b, provider, cache),
    )
}

fn validate_inputs(
    texture: &ImageBuffer,
    background: &ImageBuffer,
    mask: &GrayBuffer,
) -> DrapeResult<()> {
    for (name, (w, h)) in [
        ("texture", texture.dimensions()),
        ("background", background.dimensions()),
        ("mask", mask.dimensions()),
    ] {
        if w == 0 || h == 0 {
            return Err(DrapeError::invalid_input(format!(
                "{name} must be non-zero sized"
            )));
        }
    }
    Ok(())
}

/// Fetch the depth buffer for `background`, consulting the cache first.
///
/// Cache read/write failures downgrade to a recompute; only the provider
/// itself can fail the run.
fn depth_for(
    background: &ImageBuffer,
    provider: &dyn DepthProvider,
    cache: &dyn DepthCache,
) -> DrapeResult<GrayBuffer> {
    let key = digest_pixels(background);

    match cache.lookup(key) {
        Ok(Some(depth)) => {
            tracing::info!(%key, "using cached depth map");
            return Ok(depth);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(%key, "depth cache lookup failed, recomputing: {e}"),
    }

    let depth = provider.estimate_depth(background)?;
    if depth.width() == 0 || depth.height() == 0 {
        return Err(DrapeError::depth("provider returned an empty depth buffer"));
    }

    if let Err(e) = cache.store(key, &depth) {
        tracing::warn!(%key, "depth cache store failed: {e}");
    } else {
        tracing::info!(%key, "stored depth map in cache");
    }
    Ok(depth)
}

fn prepare_texture(
    texture: &ImageBuffer,
    width: u32,
    height: u32,
    params: &EffectParameters,
) -> DrapeResult<ImageBuffer> {
    if params.tile {
        tile_texture(texture, width, height, params.texture_scale)
    } else {
        texture.resized(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::MemoryDepthCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic stand-in for the depth model: luminance as depth.
    pub(crate) struct LuminanceDepth {
        pub(crate) calls: AtomicUsize,
    }

    impl LuminanceDepth {
        pub(crate) fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DepthProvider for LuminanceDepth {
        fn estimate_depth(&self, image: &ImageBuffer) -> DrapeResult<GrayBuffer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(image.to_gray())
        }
    }

    struct FailingProvider;

    impl DepthProvider for FailingProvider {
        fn estimate_depth(&self, _image: &ImageBuffer) -> DrapeResult<GrayBuffer> {
            Err(DrapeError::depth("model exploded"))
        }
    }

    struct BrokenCache;

    impl DepthCache for BrokenCache {
        fn lookup(
            &self,
            _key: crate::depth::ContentDigest,
        ) -> DrapeResult<Option<GrayBuffer>> {
            Err(DrapeError::cache("disk on fire"))
        }

        fn store(
            &self,
            _key: crate::depth::ContentDigest,
            _depth: &GrayBuffer,
        ) -> DrapeResult<()> {
            Err(DrapeError::cache("disk on fire"))
        }
    }

    fn photo(w: u32, h: u32) -> ImageBuffer {
        let mut data = Vec::new();
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[(x * 13 % 256) as u8, (y * 17 % 256) as u8, 120, 255]);
            }
        }
        ImageBuffer::from_rgba8(w, h, data).unwrap()
    }

    #[test]
    fn second_run_hits_the_cache_with_identical_depth() {
        let tex = ImageBuffer::solid(10, 10, [250, 250, 250]).unwrap();
        let bg = photo(24, 24);
        let mask = GrayBuffer::solid(24, 24, 255).unwrap();
        let provider = LuminanceDepth::new();
        let cache = MemoryDepthCache::unbounded();
        let params = EffectParameters::default();

        let first = run_combined_effects(&tex, &bg, &mask, &params, &provider, &cache).unwrap();
        let second = run_combined_effects(&tex, &bg, &mask, &params, &provider, &cache).unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn cache_failure_downgrades_to_recompute() {
        let tex = ImageBuffer::solid(6, 6, [250, 250, 250]).unwrap();
        let bg = photo(12, 12);
        let mask = GrayBuffer::solid(12, 12, 255).unwrap();
        let provider = LuminanceDepth::new();
        let params = EffectParameters::default();

        run_combined_effects(&tex, &bg, &mask, &params, &provider, &BrokenCache).unwrap();
        run_combined_effects(&tex, &bg, &mask, &params, &provider, &BrokenCache).unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn depth_failure_names_the_checkpoint() {
        let tex = ImageBuffer::solid(6, 6, [1, 1, 1]).unwrap();
        let bg = photo(12, 12);
        let mask = GrayBuffer::solid(12, 12, 255).unwrap();
        let cache = MemoryDepthCache::unbounded();

        let err = run_combined_effects(
            &tex,
            &bg,
            &mask,
            &EffectParameters::default(),
            &FailingProvider,
            &cache,
        )
        .unwrap_err();
        assert!(err.to_string().contains("depth generation failed"));
    }

    #[test]
    fn zero_sized_input_never_starts_the_pipeline() {
        let tex = ImageBuffer::solid(6, 6, [1, 1, 1]).unwrap();
        let bg = photo(12, 12);
        let empty_mask = GrayBuffer::from_raw(0, 0, vec![]).unwrap();
        let provider = LuminanceDepth::new();
        let cache = MemoryDepthCache::unbounded();

        let err = run_combined_effects(
            &tex,
            &bg,
            &empty_mask,
            &EffectParameters::default(),
            &provider,
            &cache,
        )
        .unwrap_err();
        assert!(matches!(err, DrapeError::InvalidInput(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn comparison_sides_are_failure_isolated() {
        let tex = ImageBuffer::solid(8, 8, [200, 200, 200]).unwrap();
        let bg = photo(16, 16);
        let mask = GrayBuffer::solid(16, 16, 255).unwrap();
        let provider = LuminanceDepth::new();
        let cache = MemoryDepthCache::unbounded();

        let good = EffectParameters::default();
        let bad = EffectParameters {
            gamma: 50.0,
            ..Default::default()
        };

        let (a, b) = run_comparison(&tex, &bg, &mask, &good, &bad, &provider, &cache);
        assert!(a.is_ok());
        assert!(b.is_err());
    }
}
