//! Encoded tile formats.

mod any;
pub use any::decode_any;

pub mod png;
pub use png::{blob2image, image2blob};
