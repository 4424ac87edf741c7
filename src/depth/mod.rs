pub mod cache;
pub mod provider;

pub use cache::{DepthCache, MemoryDepthCache};
pub use provider::{ContentDigest, DepthProvider, digest_pixels};
