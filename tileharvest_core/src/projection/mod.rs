//! Reprojection of extents between spatial reference systems.

mod reprojector;
pub use reprojector::*;

pub mod web_mercator;
