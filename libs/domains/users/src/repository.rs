use async_trait::async_trait;
use axum_helpers::Pagination;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{AdminRequest, AdminRequestStatus, User, UserFilter};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken email yields `DuplicateEmail`
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Lookup by (already normalized) email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// One page of users, newest first
    async fn list(&self, filter: UserFilter, page: Pagination) -> UserResult<Vec<User>>;

    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Replace the stored user
    async fn update(&self, user: User) -> UserResult<User>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> UserResult<()>;
}

/// Repository trait for admin request persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRequestRepository: Send + Sync {
    /// Insert a request; a second pending one for the same user yields
    /// `PendingRequestExists`
    async fn create(&self, request: AdminRequest) -> UserResult<AdminRequest>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<AdminRequest>>;

    /// Newest first
    async fn list(&self, status: Option<AdminRequestStatus>) -> UserResult<Vec<AdminRequest>>;

    async fn list_for_user(&self, user_id: Uuid) -> UserResult<Vec<AdminRequest>>;

    async fn has_pending(&self, user_id: Uuid) -> UserResult<bool>;

    /// Store a review decision, only while the stored request is still
    /// pending. `false` when another review was stored first.
    async fn review(&self, request: &AdminRequest) -> UserResult<bool>;
}
