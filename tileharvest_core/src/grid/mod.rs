//! The Web Mercator tile grid: which tiles of a matrix cover an extent.

mod calculator;
pub use calculator::*;

mod tile_range;
pub use tile_range::*;
