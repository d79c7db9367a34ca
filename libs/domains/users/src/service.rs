use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::{Paginated, Pagination, pagination::DEFAULT_LIMIT};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    AdminRequest, AdminRequestFilter, AdminRequestStatus, AdminUpdateUser, CreateAdminRequest,
    RegisterRequest, ReviewAdminRequest, Role, UpdateProfile, User, UserFilter, UserResponse,
    normalize_email,
};
use crate::repository::{AdminRequestRepository, UserRepository};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Service layer for accounts, profiles and admin user management
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a customer account
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<UserResponse> {
        self.create_account(input, Role::Customer).await
    }

    /// Create an account with the given role (operator CLI)
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_account(
        &self,
        input: RegisterRequest,
        role: Role,
    ) -> UserResult<UserResponse> {
        validate_password(&input.password)?;

        let email = normalize_email(&input.email);
        if self.repository.email_exists(&email).await? {
            return Err(UserError::DuplicateEmail(email));
        }

        let password_hash = hash_password(&input.password)?;
        let mut user = User::new(input, password_hash);
        user.role = role;

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    /// Check credentials and record the login.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Failed login attempt");
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(UserError::AccountInactive);
        }

        let now = Utc::now();
        self.repository.record_login(user.id, now).await?;
        user.last_login_at = Some(now);

        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        Ok(self.find(id).await?.into())
    }

    /// Profile of the authenticated caller; deactivated accounts are refused
    #[instrument(skip(self))]
    pub async fn profile(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self.find(id).await?;
        if !user.is_active {
            return Err(UserError::AccountInactive);
        }
        Ok(user.into())
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> UserResult<UserResponse> {
        let mut user = self.find(id).await?;
        if !user.is_active {
            return Err(UserError::AccountInactive);
        }

        user.apply_profile_update(input);
        Ok(self.repository.update(user).await?.into())
    }

    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> UserResult<()> {
        let mut user = self.find(id).await?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(UserError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(new_password)?;

        user.password_hash = hash_password(new_password)?;
        user.updated_at = Utc::now();
        self.repository.update(user).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<Paginated<UserResponse>> {
        let page = Pagination::new(filter.page, filter.limit, DEFAULT_LIMIT);
        let total = self.repository.count(filter.clone()).await?;
        let users = self.repository.list(filter, page).await?;

        Ok(Paginated::new(users, total, page).map(UserResponse::from))
    }

    /// Admin update of another account (or their own, short of deactivating it)
    #[instrument(skip(self, input))]
    pub async fn admin_update_user(
        &self,
        actor: Uuid,
        id: Uuid,
        input: AdminUpdateUser,
    ) -> UserResult<UserResponse> {
        if actor == id && input.is_active == Some(false) {
            return Err(UserError::CannotDeactivateSelf);
        }

        let mut user = self.find(id).await?;
        user.apply_admin_update(input);
        Ok(self.repository.update(user).await?.into())
    }

    /// Soft delete
    #[instrument(skip(self))]
    pub async fn deactivate_user(&self, actor: Uuid, id: Uuid) -> UserResult<UserResponse> {
        self.admin_update_user(
            actor,
            id,
            AdminUpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn promote_to_admin(&self, id: Uuid) -> UserResult<UserResponse> {
        let mut user = self.find(id).await?;
        user.role = Role::Admin;
        user.updated_at = Utc::now();
        Ok(self.repository.update(user).await?.into())
    }

    async fn find(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Customers asking for admin rights, reviewed by existing admins
pub struct AdminRequestService<A: AdminRequestRepository, R: UserRepository> {
    requests: Arc<A>,
    users: UserService<R>,
}

impl<A: AdminRequestRepository, R: UserRepository> AdminRequestService<A, R> {
    pub fn new(requests: A, users: UserService<R>) -> Self {
        Self {
            requests: Arc::new(requests),
            users,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn submit(&self, user_id: Uuid, input: CreateAdminRequest) -> UserResult<AdminRequest> {
        let user = self.users.find(user_id).await?;
        if user.is_admin() {
            return Err(UserError::AlreadyAdmin);
        }
        if self.requests.has_pending(user_id).await? {
            return Err(UserError::PendingRequestExists);
        }

        let request = AdminRequest::new(&user, input.reason);
        self.requests.create(request).await
    }

    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Uuid) -> UserResult<Vec<AdminRequest>> {
        self.requests.list_for_user(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: AdminRequestFilter) -> UserResult<Vec<AdminRequest>> {
        self.requests.list(filter.status).await
    }

    /// Approve and promote the requester
    #[instrument(skip(self, input))]
    pub async fn approve(
        &self,
        reviewer: Uuid,
        id: Uuid,
        input: ReviewAdminRequest,
    ) -> UserResult<AdminRequest> {
        let mut request = self.pending(id).await?;
        request.review(AdminRequestStatus::Approved, reviewer, input.note);
        self.store_review(&request).await?;

        self.users.promote_to_admin(request.user_id).await?;
        tracing::info!(request_id = %id, user_id = %request.user_id, "Admin request approved");
        Ok(request)
    }

    #[instrument(skip(self, input))]
    pub async fn reject(
        &self,
        reviewer: Uuid,
        id: Uuid,
        input: ReviewAdminRequest,
    ) -> UserResult<AdminRequest> {
        let mut request = self.pending(id).await?;
        request.review(AdminRequestStatus::Rejected, reviewer, input.note);
        self.store_review(&request).await?;

        tracing::info!(request_id = %id, "Admin request rejected");
        Ok(request)
    }

    /// Another admin may have reviewed the request since it was read
    async fn store_review(&self, request: &AdminRequest) -> UserResult<()> {
        if self.requests.review(request).await? {
            Ok(())
        } else {
            tracing::warn!(request_id = %request.id, "Admin request was reviewed concurrently");
            Err(UserError::AlreadyReviewed)
        }
    }

    async fn pending(&self, id: Uuid) -> UserResult<AdminRequest> {
        let request = self
            .requests
            .get_by_id(id)
            .await?
            .ok_or(UserError::AdminRequestNotFound(id))?;

        if !request.is_pending() {
            return Err(UserError::AlreadyReviewed);
        }
        Ok(request)
    }
}

impl<A: AdminRequestRepository, R: UserRepository> Clone for AdminRequestService<A, R> {
    fn clone(&self) -> Self {
        Self {
            requests: Arc::clone(&self.requests),
            users: self.users.clone(),
        }
    }
}

/// 8 to 128 characters with at least one letter and one digit.
pub fn validate_password(password: &str) -> UserResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(UserError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(UserError::Validation(format!(
            "Password cannot exceed {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(UserError::Validation(
            "Password must contain at least one letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
