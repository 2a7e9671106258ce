//! SL Shopping admin - Administration console for the online shop
//!
//! Server-rendered CRUD screens for products, brands, categories and
//! administrator users, built on Axum, SeaORM and Tera.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Catalogue and administrator entities
//! - **services**: Use cases per entity, plus product image storage
//! - **infra**: Database, migrations and SeaORM repositories
//! - **api**: HTTP handlers, views, extractors and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Brand, Category, Password, Product, Role, User};
pub use errors::{AppError, AppResult};
