use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BannerResult;
use crate::models::{Banner, BannerQuery};

/// Repository trait for Banner persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn create(&self, banner: Banner) -> BannerResult<Banner>;

    async fn get_by_id(&self, id: Uuid) -> BannerResult<Option<Banner>>;

    /// Sorted by `sort_order`, then newest first
    async fn list(&self, query: BannerQuery) -> BannerResult<Vec<Banner>>;

    async fn update(&self, banner: Banner) -> BannerResult<Banner>;

    /// `false` when nothing was deleted
    async fn delete(&self, id: Uuid) -> BannerResult<bool>;
}
