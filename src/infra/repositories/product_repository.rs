//! Product repository.
//!
//! Products are stored with foreign keys to their brand and category;
//! the store loads both references in batch so every returned
//! `Product` carries the brand and category names.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::brand::{self, Entity as BrandEntity};
use super::entities::category::{self, Entity as CategoryEntity};
use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::domain::{Brand, Category, Product};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products ordered by id
    async fn find_all(&self) -> AppResult<Vec<Product>>;

    /// Products whose name contains `keyword`
    async fn search(&self, keyword: &str) -> AppResult<Vec<Product>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>>;

    /// Insert when `id` is unset, update otherwise
    async fn save(&self, product: Product) -> AppResult<Product>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// SeaORM-backed product repository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach brand and category to each row, preserving row order.
    async fn with_references(&self, models: Vec<product::Model>) -> AppResult<Vec<Product>> {
        let category_ids: Vec<i64> = models.iter().filter_map(|m| m.category_id).collect();
        let brand_ids: Vec<i64> = models.iter().filter_map(|m| m.brand_id).collect();

        let categories: HashMap<i64, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, Category::from(m)))
                .collect()
        };

        let brands: HashMap<i64, Brand> = if brand_ids.is_empty() {
            HashMap::new()
        } else {
            BrandEntity::find()
                .filter(brand::Column::Id.is_in(brand_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|m| (m.id, Brand::from(m)))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|m| Product {
                id: Some(m.id),
                name: m.name,
                description: m.description,
                stock: m.stock,
                image: m.image,
                price: m.price,
                purchase_price: m.purchase_price,
                shipping_cost: m.shipping_cost,
                tax_rate: m.tax_rate,
                category: m.category_id.and_then(|id| categories.get(&id).cloned()),
                brand: m.brand_id.and_then(|id| brands.get(&id).cloned()),
            })
            .collect())
    }

    async fn single(&self, model: Option<product::Model>) -> AppResult<Option<Product>> {
        match model {
            Some(model) => Ok(self.with_references(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn find_all(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        self.with_references(models).await
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Name.contains(keyword))
            .order_by_asc(product::Column::Id)
            .all(&self.db)
            .await?;

        self.with_references(models).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Product>> {
        let model = ProductEntity::find()
            .filter(product::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        self.single(model).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Product>> {
        let model = ProductEntity::find_by_id(id).one(&self.db).await?;
        self.single(model).await
    }

    async fn save(&self, product: Product) -> AppResult<Product> {
        let is_new = product.is_new();
        let active = ActiveModel {
            id: product.id.map_or(NotSet, Set),
            name: Set(product.name.clone()),
            description: Set(product.description.clone()),
            stock: Set(product.stock),
            image: Set(product.image.clone()),
            price: Set(product.price),
            purchase_price: Set(product.purchase_price),
            shipping_cost: Set(product.shipping_cost),
            tax_rate: Set(product.tax_rate),
            category_id: Set(product.category_id()),
            brand_id: Set(product.brand_id()),
        };

        let saved = if is_new {
            active.insert(&self.db).await
        } else {
            active.update(&self.db).await
        }
        .map_err(|e| AppError::from_write("Product", e))?;

        self.single(Some(saved))
            .await?
            .ok_or_else(|| AppError::internal("saved product vanished"))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        ProductEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
