//! Contains the value types of a harvest: extents, coordinates, limits, capabilities, requests and estimates.

mod blob;
pub use blob::*;

mod bounding_extent;
pub use bounding_extent::*;

mod harvest_request;
pub use harvest_request::*;

mod layer_capabilities;
pub use layer_capabilities::*;

mod size_estimate;
pub use size_estimate::*;

mod srs;
pub use srs::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_matrix_limits;
pub use tile_matrix_limits::*;
