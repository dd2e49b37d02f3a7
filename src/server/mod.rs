pub mod config;
mod errors;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
mod songs;
pub mod state;

pub use config::{LimiterConfig, ServerConfig};
pub use http_layers::*;
pub use server::{make_app, run_server};
