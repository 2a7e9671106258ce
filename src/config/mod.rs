//! Application configuration module
//!
//! Environment-driven settings plus the constants shared by handlers
//! and views (flash messages, upload limits).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
