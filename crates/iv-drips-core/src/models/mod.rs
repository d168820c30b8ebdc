//! Domain models for the IV drip monitor.

mod patient;
mod saline;

pub use patient::*;
pub use saline::*;
