//! User service - Administrator account use cases.
//!
//! Passwords arrive already hashed; see `domain::Password`.

use async_trait::async_trait;
use std::sync::Arc;

use super::keyword_filter;
use crate::domain::{Role, User};
use crate::errors::{AppResult, OptionExt};
use crate::infra::{RoleRepository, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// All users, or those whose email or name contains `keyword`
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<User>>;

    /// `true` when no user is registered under the candidate's email.
    /// The candidate's own row counts as a clash.
    async fn check_unique(&self, user: &User) -> AppResult<bool>;

    /// User by id, `NotFound` when absent
    async fn get(&self, id: i64) -> AppResult<User>;

    async fn save(&self, user: User) -> AppResult<User>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Every role, for the user form
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Resolve submitted role ids; unknown ids are dropped
    async fn roles_by_ids(&self, ids: Vec<i64>) -> AppResult<Vec<Role>>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { users, roles }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_all(&self, keyword: Option<String>) -> AppResult<Vec<User>> {
        match keyword_filter(keyword.as_deref()) {
            Some(keyword) => self.users.search(keyword).await,
            None => self.users.find_all().await,
        }
    }

    async fn check_unique(&self, user: &User) -> AppResult<bool> {
        Ok(self.users.find_by_email(&user.email).await?.is_none())
    }

    async fn get(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_not_found(format!("User {} not found", id))
    }

    async fn save(&self, user: User) -> AppResult<User> {
        self.users.save(user).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.users.delete(id).await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.find_all().await
    }

    async fn roles_by_ids(&self, ids: Vec<i64>) -> AppResult<Vec<Role>> {
        self.roles.find_by_ids(ids).await
    }
}
