//! Drape paints a texture onto the depth-varying surface of a photograph.
//!
//! Given a texture, a background photo, a binary mask, and a depth estimate,
//! the pipeline tiles and warps the texture along the scene depth, synthesizes
//! a stylized lighting layer, tone-maps the masked region, and layers
//! everything back together so the texture reads as physically applied to the
//! surface (fabric, skin, walls) visible through the mask.
//!
//! The externally callable operation is [`run_combined_effects`]; an A/B
//! comparison over two parameter sets is [`run_comparison`]. Depth estimation
//! itself is an injected [`DepthProvider`] collaborator whose results are
//! content-addressed in a [`DepthCache`].
#![forbid(unsafe_code)]

pub mod depth;
pub mod effects;
pub mod foundation;
pub mod io;
pub mod params;
pub mod pipeline;
pub mod raster;

pub use crate::depth::{ContentDigest, DepthCache, DepthProvider, MemoryDepthCache, digest_pixels};
pub use crate::effects::{
    DEFAULT_LIGHT_COLOR, adjust_levels, composite_masked, composite_with_lighting, displace,
    extract_detail, synthesize_lighting, tile_texture,
};
pub use crate::foundation::error::{DrapeError, DrapeResult};
pub use crate::params::EffectParameters;
pub use crate::pipeline::{run_combined_effects, run_comparison};
pub use crate::raster::blend::{BlendMode, blend, clip_to_mask};
pub use crate::raster::blur::blur_gray;
pub use crate::raster::buffer::{GrayBuffer, ImageBuffer};
