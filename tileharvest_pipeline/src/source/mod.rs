//! Pluggable tile sources, selected by the `type` tag of a map service.

mod registry;
pub use registry::*;

mod traits;
pub use traits::*;
