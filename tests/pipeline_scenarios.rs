use std::sync::atomic::{AtomicUsize, Ordering};

use drape::{
    DepthProvider, DrapeResult, EffectParameters, GrayBuffer, ImageBuffer, MemoryDepthCache,
    run_combined_effects, run_comparison,
};

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Deterministic depth stand-in: the background's own luminance.
struct LuminanceDepth {
    calls: AtomicUsize,
}

impl LuminanceDepth {
    fn new() -> Self {
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

fn photo(w: u32, h: u32) -> ImageBuffer {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[
                (60 + x * 3 % 180) as u8,
                (80 + y * 5 % 160) as u8,
                (100 + (x + y) % 120) as u8,
                255,
            ]);
        }
    }
    ImageBuffer::from_rgba8(w, h, data).unwrap()
}

#[test]
fn solid_red_texture_tiles_edge_to_edge_over_the_full_mask() {
    init_tracing();
    let texture = ImageBuffer::solid(50, 50, [255, 0, 0]).unwrap();
    let background = photo(200, 200);
    let mask = GrayBuffer::solid(200, 200, 255).unwrap();
    let provider = LuminanceDepth::new();
    let cache = MemoryDepthCache::default();

    let params = EffectParameters {
        tile: true,
        texture_scale: 1.0,
        detail_strength: 0.0,
        ..Default::default()
    };
    let out =
        run_combined_effects(&texture, &background, &mask, &params, &provider, &cache).unwrap();

    assert_eq!(out.dimensions(), (200, 200));
    // A pure red texture multiplied over the whole mask must zero the green
    // and blue channels of every single pixel: any tiling gap would leak the
    // tinted background through.
    for (i, px) in out.data().chunks_exact(4).enumerate() {
        assert_eq!((px[1], px[2]), (0, 0), "gap at pixel {i}");
        assert_eq!(px[3], 255);
    }
}

#[test]
fn all_zero_mask_yields_the_untouched_background() {
    init_tracing();
    let texture = ImageBuffer::solid(50, 50, [255, 0, 0]).unwrap();
    let background = photo(64, 64);
    let mask = GrayBuffer::solid(64, 64, 0).unwrap();
    let provider = LuminanceDepth::new();
    let cache = MemoryDepthCache::default();

    let out = run_combined_effects(
        &texture,
        &background,
        &mask,
        &EffectParameters::default(),
        &provider,
        &cache,
    )
    .unwrap();

    // With zero mask opacity every texture/lighting/detail contribution is a
    // no-op and the tint carries no alpha, so the composite is the background
    // bit for bit.
    assert_eq!(out, background);
}

#[test]
fn byte_identical_backgrounds_share_one_depth_estimate() {
    init_tracing();
    let texture = ImageBuffer::solid(20, 20, [220, 220, 220]).unwrap();
    let background = photo(48, 48);
    let mask = GrayBuffer::solid(48, 48, 255).unwrap();
    let provider = LuminanceDepth::new();
    let cache = MemoryDepthCache::default();
    let params = EffectParameters::default();

    let first =
        run_combined_effects(&texture, &background, &mask, &params, &provider, &cache).unwrap();
    let second =
        run_combined_effects(&texture, &background, &mask, &params, &provider, &cache).unwrap();

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
}

#[test]
fn ab_comparison_runs_both_sides_against_shared_collaborators() {
    init_tracing();
    let texture = ImageBuffer::solid(16, 16, [240, 200, 180]).unwrap();
    let background = photo(40, 40);
    let mask = GrayBuffer::solid(40, 40, 255).unwrap();
    let provider = LuminanceDepth::new();
    let cache = MemoryDepthCache::default();

    // Warm the cache so both sides hit it.
    let params_a = EffectParameters::default();
    run_combined_effects(&texture, &background, &mask, &params_a, &provider, &cache).unwrap();

    let params_b = EffectParameters {
        lightness: 40.0,
        contrast: 2.0,
        ..Default::default()
    };
    let (a, b) = run_comparison(
        &texture,
        &background,
        &mask,
        &params_a,
        &params_b,
        &provider,
        &cache,
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.dimensions(), (40, 40));
    assert_eq!(b.dimensions(), (40, 40));
    // Different tone parameters must produce a different composite.
    assert_ne!(a, b);

    // Each side matches its own standalone run: no cross-talk between sides.
    let solo_b =
        run_combined_effects(&texture, &background, &mask, &params_b, &provider, &cache).unwrap();
    assert_eq!(b, solo_b);
}
