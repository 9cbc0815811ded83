use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserDto, User};
use crate::shared::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    /// Look up by hashed reset token, only while it has not expired at `now`.
    async fn get_user_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>>;

    /// Store or clear (`None`) the hashed reset token and its expiry.
    async fn set_reset_token(
        &self,
        id: &str,
        token: Option<(String, DateTime<Utc>)>,
    ) -> DomainResult<()>;
    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()>;

    async fn count_users(&self) -> DomainResult<u64>;
    async fn delete_all_users(&self) -> DomainResult<u64>;
}
