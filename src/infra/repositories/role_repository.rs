//! Role repository. Roles are seeded by migration and only read here.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use super::entities::role::{self, Entity as RoleEntity};
use crate::domain::Role;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// All roles ordered by id
    async fn find_all(&self) -> AppResult<Vec<Role>>;

    /// Roles with the given ids; unknown ids are skipped
    async fn find_by_ids(&self, ids: Vec<i64>) -> AppResult<Vec<Role>>;
}

pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_all(&self) -> AppResult<Vec<Role>> {
        let models = RoleEntity::find()
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn find_by_ids(&self, ids: Vec<i64>) -> AppResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = RoleEntity::find()
            .filter(role::Column::Id.is_in(ids))
            .order_by_asc(role::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Role::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::testing::migrated_db;

    #[tokio::test]
    async fn test_seeded_roles() {
        let store = RoleStore::new(migrated_db().await);

        let roles = store.find_all().await.unwrap();

        assert_eq!(
            roles,
            vec![Role::new(1, "Admin", "管理者"), Role::new(2, "Editor", "編集者")]
        );
    }

    #[tokio::test]
    async fn test_find_by_ids_skips_unknown_ids() {
        let store = RoleStore::new(migrated_db().await);

        let roles = store.find_by_ids(vec![2, 1000]).await.unwrap();

        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Editor");
        assert!(store.find_by_ids(Vec::new()).await.unwrap().is_empty());
    }
}
