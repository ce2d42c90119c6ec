//! Utility functions and data structures.
//!
//! - [`app_data`] - User configuration file
//! - [`bitset`] - Fixed-size bit set for per-byte masks
//! - [`logging`] - Tracing subscriber setup

pub mod app_data;
pub mod bitset;
pub mod logging;

pub use app_data::*;
pub use logging::init_tracing;
