//! Repository layer - Data access abstraction
//!
//! One repository trait per entity (`*Repository`) with a SeaORM
//! implementation (`*Store`). Services depend on the traits only.

mod brand_repository;
mod category_repository;
pub(crate) mod entities;
mod product_repository;
mod role_repository;
mod user_repository;

pub use brand_repository::{BrandRepository, BrandStore};
pub use category_repository::{CategoryRepository, CategoryStore};
pub use product_repository::{ProductRepository, ProductStore};
pub use role_repository::{RoleRepository, RoleStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use brand_repository::MockBrandRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use category_repository::MockCategoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

#[cfg(test)]
pub(crate) mod testing {
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    use crate::infra::db::Migrator;

    /// In-memory SQLite database with every migration applied
    pub async fn migrated_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }
}
