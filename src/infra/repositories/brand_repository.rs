//! Brand repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::brand::{self, ActiveModel, Entity as BrandEntity};
use crate::domain::Brand;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Brand repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// All brands ordered by id
    async fn find_all(&self) -> AppResult<Vec<Brand>>;

    /// Brands whose name contains `keyword`
    async fn search(&self, keyword: &str) -> AppResult<Vec<Brand>>;

    /// Brand with exactly this name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Brand>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Brand>>;

    /// Insert when `id` is unset, update otherwise
    async fn save(&self, brand: Brand) -> AppResult<Brand>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// SeaORM-backed brand repository
pub struct BrandStore {
    db: DatabaseConnection,
}

impl BrandStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BrandRepository for BrandStore {
    async fn find_all(&self) -> AppResult<Vec<Brand>> {
        let models = BrandEntity::find()
            .order_by_asc(brand::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Brand::from).collect())
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<Brand>> {
        let models = BrandEntity::find()
            .filter(brand::Column::Name.contains(keyword))
            .order_by_asc(brand::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Brand::from).collect())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Brand>> {
        let result = BrandEntity::find()
            .filter(brand::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(result.map(Brand::from))
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Brand>> {
        let result = BrandEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Brand::from))
    }

    async fn save(&self, brand: Brand) -> AppResult<Brand> {
        let is_new = brand.is_new();
        let active = ActiveModel {
            id: brand.id.map_or(NotSet, Set),
            name: Set(brand.name),
        };

        let saved = if is_new {
            active.insert(&self.db).await
        } else {
            active.update(&self.db).await
        }
        .map_err(|e| AppError::from_write("Brand", e))?;

        Ok(Brand::from(saved))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        BrandEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::testing::migrated_db;

    async fn store_with(names: &[&str]) -> BrandStore {
        let store = BrandStore::new(migrated_db().await);
        for name in names {
            store.save(Brand::unsaved(*name)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_find_all_in_id_order() {
        let store = store_with(&["brandB", "brandA"]).await;

        let names: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();

        assert_eq!(names, vec!["brandB", "brandA"]);
    }

    #[tokio::test]
    async fn test_search_matches_substring() {
        let store = store_with(&["brandA", "brandB", "makerC"]).await;

        let found = store.search("brand").await.unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|b| b.name.starts_with("brand")));
        assert!(store.search("zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_name_is_exact() {
        let store = store_with(&["brandA"]).await;

        assert!(store.find_by_name("brandA").await.unwrap().is_some());
        assert!(store.find_by_name("brand").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        let store = store_with(&[]).await;

        let inserted = store.save(Brand::unsaved("brandA")).await.unwrap();
        let id = inserted.id.unwrap();
        let updated = store.save(Brand::new(id, "brandB")).await.unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(store.find_all().await.unwrap().len(), 1);
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().name, "brandB");
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let store = store_with(&[]).await;

        let err = store.save(Brand::new(1000, "brandA")).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let store = store_with(&["brandA"]).await;

        let err = store.save(Brand::unsaved("brandA")).await.unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_ok() {
        let store = store_with(&["brandA"]).await;

        store.delete(1000).await.unwrap();

        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }
}
