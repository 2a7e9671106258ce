//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod brand;
pub mod category;
pub mod product;
pub mod role;
pub mod user;
pub mod users_role;
