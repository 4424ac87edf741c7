pub mod blend;
pub mod blur;
pub mod buffer;
