//! OGC WMTS: capabilities documents, tile requests and the WMTS source strategy.

mod capabilities;
pub use capabilities::*;

mod fetcher;
pub use fetcher::*;

mod strategy;
pub use strategy::*;

mod urls;
pub use urls::*;

#[cfg(any(test, feature = "test"))]
pub mod fixtures;
