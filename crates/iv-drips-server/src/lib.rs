//! IV Drips Server
//!
//! Registry API for ward IV drip monitors, built on
//! [`iv_drips_core`]. Patient records are persisted through the configured
//! store backend; users and tokens live in memory.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod log;

pub use cli::Args;
pub use config::IvDripsConfig;
pub use http::{build_router, AppState};
