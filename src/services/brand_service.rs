//! Brand service - Brand maintenance use cases.

use async_trait::async_trait;
use std::sync::Arc;

use super::keyword_filter;
use crate::domain::Brand;
use crate::errors::{AppResult, OptionExt};
use crate::infra::BrandRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Brand service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BrandService: Send + Sync {
    /// All brands, or those whose name contains `keyword` when it is non-empty
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<Brand>>;

    /// `true` when no brand is stored under the candidate's name.
    /// The candidate's own row counts as a clash.
    async fn check_unique(&self, brand: &Brand) -> AppResult<bool>;

    /// Brand by id, `NotFound` when absent
    async fn get(&self, id: i64) -> AppResult<Brand>;

    async fn save(&self, brand: Brand) -> AppResult<Brand>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of BrandService.
pub struct BrandManager {
    repo: Arc<dyn BrandRepository>,
}

impl BrandManager {
    pub fn new(repo: Arc<dyn BrandRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl BrandService for BrandManager {
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<Brand>> {
        match keyword_filter(keyword.as_deref()) {
            Some(keyword) => self.repo.search(keyword).await,
            None => self.repo.find_all().await,
        }
    }

    async fn check_unique(&self, brand: &Brand) -> AppResult<bool> {
        Ok(self.repo.find_by_name(&brand.name).await?.is_none())
    }

    async fn get(&self, id: i64) -> AppResult<Brand> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_not_found(format!("Brand {} not found", id))
    }

    async fn save(&self, brand: Brand) -> AppResult<Brand> {
        self.repo.save(brand).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.repo.delete(id).await
    }
}
