//! Image handling for harvested tiles: decoding source payloads, encoding PNG for the store,
//! and compositing a new tile over an existing one.

mod composite;
pub use composite::*;

pub mod format;
pub use format::{blob2image, decode_any, image2blob};

#[cfg(any(test, feature = "test"))]
pub mod test_images;
