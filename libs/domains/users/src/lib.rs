//! Users Domain
//!
//! Customer accounts, authentication and the admin access workflow.
//!
//! # Features
//!
//! - Registration and login with Argon2 password hashes
//! - JWT session issued as bearer token and `access_token` cookie
//! - Profile and password management for the caller
//! - User administration (list, edit, role changes, deactivation)
//! - Admin requests: customers ask, admins approve or reject
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (auth, users, admin requests)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, password hashing, validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{MongoUserRepository, UserService, handlers};
//!
//! let repository = MongoUserRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = UserService::new(repository);
//!
//! let admin_routes = handlers::admin_router(service);
//! ```

pub mod auth_handlers;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth_handlers::AuthState;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    AdminRequest, AdminRequestStatus, LoginRequest, RegisterRequest, Role, User, UserFilter,
    UserResponse,
};
pub use mongodb::{MongoAdminRequestRepository, MongoUserRepository};
pub use repository::{AdminRequestRepository, UserRepository};
pub use service::{AdminRequestService, UserService};
