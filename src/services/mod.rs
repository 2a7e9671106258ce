//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod brand_service;
mod category_service;
pub mod container;
mod product_image_service;
mod product_service;
mod user_service;

// Service Container
pub use container::Services;

// Service traits and implementations
pub use brand_service::{BrandManager, BrandService};
pub use category_service::{CategoryManager, CategoryService};
pub use product_image_service::{ImageStore, ProductImageService, UploadedImage};
pub use product_service::{ProductManager, ProductService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use brand_service::MockBrandService;
#[cfg(any(test, feature = "test-utils"))]
pub use category_service::MockCategoryService;
#[cfg(any(test, feature = "test-utils"))]
pub use product_image_service::MockProductImageService;
#[cfg(any(test, feature = "test-utils"))]
pub use product_service::MockProductService;
#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;

/// A keyword narrows a listing only when it is non-empty.
pub(crate) fn keyword_filter(keyword: Option<&str>) -> Option<&str> {
    keyword.filter(|k| !k.is_empty())
}
