//! Category repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::category::{self, ActiveModel, Entity as CategoryEntity};
use crate::domain::Category;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Category repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by id
    async fn find_all(&self) -> AppResult<Vec<Category>>;

    /// Categories whose name contains `keyword`
    async fn search(&self, keyword: &str) -> AppResult<Vec<Category>>;

    /// Exact name match
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Category>>;

    /// Insert when `id` is unset, update otherwise
    async fn save(&self, category: Category) -> AppResult<Category>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// SeaORM-backed category repository
pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn find_all(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .filter(category::Column::Name.contains(keyword))
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(result.map(Category::from))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn save(&self, category: Category) -> AppResult<Category> {
        let is_new = category.is_new();
        let active = ActiveModel {
            id: category.id.map_or(NotSet, Set),
            name: Set(category.name),
        };

        let saved = if is_new {
            active.insert(&self.db).await
        } else {
            active.update(&self.db).await
        }
        .map_err(|e| AppError::from_write("Category", e))?;

        Ok(Category::from(saved))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        CategoryEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::testing::migrated_db;

    #[tokio::test]
    async fn test_search_and_lookup() {
        let store = CategoryStore::new(migrated_db().await);
        for name in ["categoryA", "categoryB", "toys"] {
            store.save(Category::unsaved(name)).await.unwrap();
        }

        assert_eq!(store.search("category").await.unwrap().len(), 2);
        assert_eq!(store.search("oy").await.unwrap()[0].name, "toys");
        assert_eq!(
            store.find_by_name("toys").await.unwrap().unwrap().id,
            Some(3)
        );
        assert!(store.find_by_id(1000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_is_conflict() {
        let store = CategoryStore::new(migrated_db().await);
        store.save(Category::unsaved("categoryA")).await.unwrap();
        let b = store.save(Category::unsaved("categoryB")).await.unwrap();

        let err = store
            .save(Category::new(b.id.unwrap(), "categoryA"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_and_delete_of_missing_row() {
        let store = CategoryStore::new(migrated_db().await);

        let err = store.save(Category::new(1000, "categoryA")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        store.delete(1000).await.unwrap();
    }
}
