//! Service configuration.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `ENGINE_SUPPORT_CONFIG` environment variable (path to TOML file)
//! 3. `engine_support.toml` in the current working directory
//! 4. Built-in defaults
//!
//! `ENGINE_SUPPORT_SERVER_ADDR` overrides `server.addr` after loading.
//!
//! ```toml
//! [server]
//! addr = "127.0.0.1:8080"
//!
//! [logging]
//! level = "info"
//! format = "pretty"          # or "json"
//! audit_file = "engine_agent.log"
//! ```

mod app_config;
pub mod validation;

pub use app_config::*;
