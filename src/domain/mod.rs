//! Domain layer - Shop catalogue and administrator entities.
//!
//! Plain data types shared by the repositories, services and views.
//! They carry no persistence concerns; the SeaORM models live in
//! `infra::repositories::entities`.

pub mod brand;
pub mod category;
pub mod password;
pub mod product;
pub mod user;

pub use brand::Brand;
pub use category::Category;
pub use password::Password;
pub use product::Product;
pub use user::{Role, User};
