//! MongoDB implementations of the user repositories

use async_trait::async_trait;
use axum_helpers::Pagination;
use chrono::{DateTime, Utc};
use database::mongodb::{contains_ci, date_bson, id_bson, id_filter, is_duplicate_key, value_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{AdminRequest, AdminRequestStatus, User, UserFilter};
use crate::repository::{AdminRequestRepository, UserRepository};

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
        }
    }

    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "role": 1, "is_active": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_role_active".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &UserFilter) -> Document {
        let mut doc = doc! {};

        if let Some(role) = filter.role {
            doc.insert("role", value_bson(&role));
        }
        if let Some(is_active) = filter.is_active {
            doc.insert("is_active", is_active);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            doc.insert(
                "$or",
                vec![
                    doc! { "first_name": contains_ci(search) },
                    doc! { "last_name": contains_ci(search) },
                    doc! { "email": contains_ci(search) },
                ],
            );
        }

        doc
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: User) -> UserResult<User> {
        self.collection.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                UserError::DuplicateEmail(user.email.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(id_filter(&id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter, page: Pagination) -> UserResult<Vec<User>> {
        let users = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "created_at": -1 })
            .skip(page.skip())
            .limit(page.limit as i64)
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: User) -> UserResult<User> {
        let result = self
            .collection
            .replace_one(id_filter(&user.id), &user)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    UserError::DuplicateEmail(user.email.clone())
                } else {
                    e.into()
                }
            })?;

        if result.matched_count == 0 {
            return Err(UserError::NotFound(user.id));
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> UserResult<()> {
        self.collection
            .update_one(
                id_filter(&id),
                doc! { "$set": { "last_login_at": date_bson(&at) } },
            )
            .await?;
        Ok(())
    }
}

pub struct MongoAdminRequestRepository {
    collection: Collection<AdminRequest>,
}

impl MongoAdminRequestRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<AdminRequest>("admin_requests"),
        }
    }

    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            // At most one pending request per user
            IndexModel::builder()
                .keys(doc! { "user_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "status": "pending" })
                        .name("idx_user_pending_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_status_created".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Admin request indexes created successfully");
        Ok(())
    }

    async fn find_sorted(&self, filter: Document) -> UserResult<Vec<AdminRequest>> {
        let requests = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(requests)
    }
}

#[async_trait]
impl AdminRequestRepository for MongoAdminRequestRepository {
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    async fn create(&self, request: AdminRequest) -> UserResult<AdminRequest> {
        self.collection.insert_one(&request).await.map_err(|e| {
            if is_duplicate_key(&e) {
                UserError::PendingRequestExists
            } else {
                e.into()
            }
        })?;

        tracing::info!(request_id = %request.id, "Admin request created");
        Ok(request)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<AdminRequest>> {
        Ok(self.collection.find_one(id_filter(&id)).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, status: Option<AdminRequestStatus>) -> UserResult<Vec<AdminRequest>> {
        let filter = match status {
            Some(status) => doc! { "status": value_bson(&status) },
            None => doc! {},
        };
        self.find_sorted(filter).await
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Uuid) -> UserResult<Vec<AdminRequest>> {
        self.find_sorted(doc! { "user_id": id_bson(&user_id) }).await
    }

    #[instrument(skip(self))]
    async fn has_pending(&self, user_id: Uuid) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! {
                "user_id": id_bson(&user_id),
                "status": value_bson(&AdminRequestStatus::Pending),
            })
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn review(&self, request: &AdminRequest) -> UserResult<bool> {
        let mut filter = id_filter(&request.id);
        filter.insert("status", value_bson(&AdminRequestStatus::Pending));

        let result = self.collection.replace_one(filter, request).await?;
        Ok(result.matched_count == 1)
    }
}
