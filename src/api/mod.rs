//! API layer - HTTP handlers and middleware
//!
//! This module contains all HTTP-related concerns:
//! - Request handlers, one module per managed entity
//! - View rendering and flash messages
//! - Custom extractors for the admin forms
//! - Route definitions

pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod view;

pub use routes::create_router;
pub use state::AppState;
pub use view::{Flash, FlashRedirect, View};
