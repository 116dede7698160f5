pub mod estimate;
pub mod harvest;
mod progress_bar;
mod request_args;
