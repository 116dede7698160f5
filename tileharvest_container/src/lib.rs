//! Tile stores that harvested tiles are written into.

pub mod mbtiles;
pub use mbtiles::*;
