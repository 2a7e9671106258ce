//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connection and migrations
//! - SeaORM repositories for the catalogue and administrator tables

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{
    BrandRepository, BrandStore, CategoryRepository, CategoryStore, ProductRepository,
    ProductStore, RoleRepository, RoleStore, UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockBrandRepository, MockCategoryRepository, MockProductRepository, MockRoleRepository,
    MockUserRepository,
};
