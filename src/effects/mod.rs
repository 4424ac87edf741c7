pub mod compose;
pub mod detail;
pub mod displace;
pub mod levels;
pub mod lighting;
pub mod tile;

pub use compose::{composite_masked, composite_with_lighting};
pub use detail::extract_detail;
pub use displace::displace;
pub use levels::adjust_levels;
pub use lighting::{DEFAULT_LIGHT_COLOR, synthesize_lighting};
pub use tile::tile_texture;
