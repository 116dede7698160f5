//! Shared progress counters and cooperative cancellation.

mod cancellation;
pub use cancellation::*;

mod registry;
pub use registry::*;
