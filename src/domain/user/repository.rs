use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CreateUserDto, GetUserDto, UpdateUserDto, User};
use crate::domain::DomainResult;
use crate::shared::PaginatedResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    async fn count_users(&self) -> DomainResult<u64>;

    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>>;
    async fn get_user_by_login(&self, login: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_reset_token(&self, token_hash: &str) -> DomainResult<Option<User>>;

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    /// Replace the credential and clear any pending reset token.
    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()>;
    async fn set_reset_token(
        &self,
        id: &str,
        token_hash: &str,
        sent_at: DateTime<Utc>,
    ) -> DomainResult<()>;
    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()>;
    async fn delete_user(&self, id: &str) -> DomainResult<()>;
}
