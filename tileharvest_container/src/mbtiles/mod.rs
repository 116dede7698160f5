mod metadata;
pub use metadata::*;

mod store;
pub use store::*;
