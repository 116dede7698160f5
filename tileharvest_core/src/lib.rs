//! Contains the data model of a tile harvest: extents, tile coordinates, matrix limits,
//! the tile grid, reprojection, progress reporting and cancellation.

pub mod error;
pub use error::*;

pub mod grid;
pub use grid::*;

pub mod progress;
pub use progress::*;

pub mod projection;
pub use projection::*;

pub mod types;
pub use types::*;
