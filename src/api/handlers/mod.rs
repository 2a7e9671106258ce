//! HTTP request handlers, one module per managed entity.

pub mod brand_handler;
pub mod category_handler;
pub mod product_handler;
pub mod user_handler;

pub use brand_handler::brand_routes;
pub use category_handler::category_routes;
pub use product_handler::product_routes;
pub use user_handler::user_routes;

use serde::Deserialize;

/// `?keyword=` of the list pages
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub keyword: Option<String>,
}
