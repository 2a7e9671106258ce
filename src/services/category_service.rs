//! Category service - Category maintenance use cases.

use async_trait::async_trait;
use std::sync::Arc;

use super::keyword_filter;
use crate::domain::Category;
use crate::errors::{AppResult, OptionExt};
use crate::infra::CategoryRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Category service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<Category>>;

    /// `true` when no category is stored under the candidate's name
    async fn check_unique(&self, category: &Category) -> AppResult<bool>;

    async fn get(&self, id: i64) -> AppResult<Category>;

    async fn save(&self, category: Category) -> AppResult<Category>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

pub struct CategoryManager {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryManager {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CategoryService for CategoryManager {
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<Category>> {
        match keyword_filter(keyword.as_deref()) {
            Some(keyword) => self.repo.search(keyword).await,
            None => self.repo.find_all().await,
        }
    }

    async fn check_unique(&self, category: &Category) -> AppResult<bool> {
        Ok(self.repo.find_by_name(&category.name).await?.is_none())
    }

    async fn get(&self, id: i64) -> AppResult<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_not_found(format!("Category {} not found", id))
    }

    async fn save(&self, category: Category) -> AppResult<Category> {
        self.repo.save(category).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.repo.delete(id).await
    }
}
