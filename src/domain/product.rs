//! Product domain entity.

use serde::{Deserialize, Serialize};

use super::{Brand, Category};

/// A product offered by the shop.
///
/// `name` is unique across products. The brand and category are loaded
/// alongside the product so list and detail views can show their names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    /// Units in stock
    pub stock: i32,
    /// Stored file name of the product image, if one was uploaded
    pub image: Option<String>,
    /// Selling price
    pub price: f64,
    /// Price paid to the supplier
    pub purchase_price: f64,
    pub shipping_cost: f64,
    /// Tax rate in percent
    pub tax_rate: f64,
    pub category: Option<Category>,
    pub brand: Option<Brand>,
}

impl Product {
    /// Whether saving this product inserts a new row
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Id of the referenced category
    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().and_then(|c| c.id)
    }

    /// Id of the referenced brand
    pub fn brand_id(&self) -> Option<i64> {
        self.brand.as_ref().and_then(|b| b.id)
    }
}
