//! User repository.
//!
//! Role grants live in the `users_roles` join table; a save rewrites
//! the grants of the user in the same transaction as the user row.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::entities::role::{self, Entity as RoleEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::entities::users_role::{self, Entity as UsersRoleEntity};
use crate::domain::{Role, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users ordered by id
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Users whose email or display name contains `keyword`
    async fn search(&self, keyword: &str) -> AppResult<Vec<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Insert when `id` is unset, update otherwise; role grants are replaced
    async fn save(&self, user: User) -> AppResult<User>;

    async fn delete(&self, id: i64) -> AppResult<()>;
}

/// SeaORM-backed user repository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load role grants for the given rows, preserving row order.
    async fn with_roles<C: ConnectionTrait>(
        conn: &C,
        models: Vec<user::Model>,
    ) -> AppResult<Vec<User>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let grants = UsersRoleEntity::find()
            .filter(users_role::Column::UserId.is_in(user_ids))
            .all(conn)
            .await?;

        let role_ids: Vec<i64> = grants.iter().map(|g| g.role_id).collect();
        let roles: HashMap<i64, Role> = if role_ids.is_empty() {
            HashMap::new()
        } else {
            RoleEntity::find()
                .filter(role::Column::Id.is_in(role_ids))
                .all(conn)
                .await?
                .into_iter()
                .map(|m| (m.id, Role::from(m)))
                .collect()
        };

        let mut granted: HashMap<i64, Vec<Role>> = HashMap::new();
        for grant in grants {
            if let Some(role) = roles.get(&grant.role_id) {
                granted.entry(grant.user_id).or_default().push(role.clone());
            }
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let mut user = User {
                    id: Some(m.id),
                    email: m.email,
                    password: m.password,
                    name: m.name,
                    disabled: m.disabled,
                    roles: Vec::new(),
                };
                user.set_roles(granted.remove(&m.id).unwrap_or_default());
                user
            })
            .collect())
    }

    async fn single(&self, model: Option<user::Model>) -> AppResult<Option<User>> {
        match model {
            Some(model) => Ok(Self::with_roles(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        Self::with_roles(&self.db, models).await
    }

    async fn search(&self, keyword: &str) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Email.contains(keyword))
                    .add(user::Column::Name.contains(keyword)),
            )
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        Self::with_roles(&self.db, models).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        self.single(model).await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let model = UserEntity::find_by_id(id).one(&self.db).await?;
        self.single(model).await
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let role_ids = user.role_ids();
        let is_new = user.is_new();
        let active = ActiveModel {
            id: user.id.map_or(NotSet, Set),
            email: Set(user.email),
            password: Set(user.password),
            name: Set(user.name),
            disabled: Set(user.disabled),
        };

        let txn = self.db.begin().await?;

        let saved = if is_new {
            active.insert(&txn).await
        } else {
            active.update(&txn).await
        }
        .map_err(|e| AppError::from_write("User", e))?;

        UsersRoleEntity::delete_many()
            .filter(users_role::Column::UserId.eq(saved.id))
            .exec(&txn)
            .await?;

        if !role_ids.is_empty() {
            let grants = role_ids.into_iter().map(|role_id| users_role::ActiveModel {
                user_id: Set(saved.id),
                role_id: Set(role_id),
            });
            UsersRoleEntity::insert_many(grants).exec(&txn).await?;
        }

        let mut users = Self::with_roles(&txn, vec![saved]).await?;
        txn.commit().await?;

        users
            .pop()
            .ok_or_else(|| AppError::internal("saved user vanished"))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        // users_roles rows go with the user (ON DELETE CASCADE)
        UserEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
