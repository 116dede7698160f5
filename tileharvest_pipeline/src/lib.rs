//! The harvest pipeline: resolving what a tile source offers, fetching tiles, merging them
//! into a tile store, and estimating the size of a harvest beforehand.

pub mod client;
pub use client::*;

mod estimator;
pub use estimator::*;

mod harvester;
pub use harvester::*;

pub mod source;
pub use source::*;

pub mod wmts;
