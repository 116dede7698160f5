//! Configuration of the harvest service, read from a YAML file (`--config`).
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```yaml
//! workers: 2                 # harvest jobs running at the same time
//! fetch_concurrency: 4       # tile requests in flight per job
//! matrix_set: "EPSG:3857"    # tile matrix set requested from every service
//! http:
//!   timeout_seconds: 30
//!   retries: 1
//!   user_agent: "tileharvest/0.3.0"
//! ```

mod http;
mod main;

pub use http::HttpConfig;
pub use main::Config;
