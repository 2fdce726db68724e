//! CLI command handlers. Each command is in its own file.

mod cached;
mod config;
mod fetch;
mod render;

pub use cached::run_cached;
pub use config::run_config;
pub use fetch::run_fetch;
