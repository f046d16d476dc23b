use async_trait::async_trait;

use super::RepositoryResult;
use crate::domain::user::{NewUser, User};

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    ///
    /// Fails with `Constraint::UniqueUsername` when the name is taken.
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;

    /// Find a user by exact username
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// Update user's last login timestamp
    async fn update_last_login(&self, user_id: i64) -> RepositoryResult<()>;
}
