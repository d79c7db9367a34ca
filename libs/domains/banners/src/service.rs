//! Banner Service - Business logic layer

use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{BannerError, BannerResult};
use crate::models::{Banner, BannerFilter, BannerQuery, CreateBanner, LiveBannerQuery, UpdateBanner};
use crate::repository::BannerRepository;

pub struct BannerService<R: BannerRepository> {
    repository: Arc<R>,
}

impl<R: BannerRepository> BannerService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Active banners whose window contains the current time
    #[instrument(skip(self))]
    pub async fn live(&self, query: LiveBannerQuery) -> BannerResult<Vec<Banner>> {
        self.repository
            .list(BannerQuery {
                placement: query.placement,
                is_active: Some(true),
                live_at: Some(Utc::now()),
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: BannerFilter) -> BannerResult<Vec<Banner>> {
        self.repository
            .list(BannerQuery {
                placement: filter.placement,
                is_active: filter.is_active,
                live_at: None,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> BannerResult<Banner> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(BannerError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateBanner) -> BannerResult<Banner> {
        let banner = Banner::new(input);
        if !banner.has_valid_window() {
            return Err(BannerError::InvalidWindow);
        }
        self.repository.create(banner).await
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateBanner) -> BannerResult<Banner> {
        let mut banner = self.get(id).await?;
        banner.apply_update(input);
        if !banner.has_valid_window() {
            return Err(BannerError::InvalidWindow);
        }
        self.repository.update(banner).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> BannerResult<()> {
        if !self.repository.delete(id).await? {
            return Err(BannerError::NotFound(id));
        }
        tracing::info!(banner_id = %id, "Banner deleted");
        Ok(())
    }
}

impl<R: BannerRepository> Clone for BannerService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BannerPlacement;
    use crate::repository::MockBannerRepository;
    use chrono::Duration;

    fn input() -> CreateBanner {
        CreateBanner {
            title: "New In".to_string(),
            subtitle: None,
            image: "/uploads/new-in.jpg".to_string(),
            link: None,
            button_text: Some("Shop now".to_string()),
            placement: BannerPlacement::Hero,
            sort_order: 0,
            is_active: true,
            starts_at: None,
            ends_at: None,
        }
    }

    #[tokio::test]
    async fn test_live_asks_for_active_banners_at_current_time() {
        let mut mock = MockBannerRepository::new();
        mock.expect_list()
            .withf(|q| {
                q.is_active == Some(true)
                    && q.placement == Some(BannerPlacement::Promo)
                    && q.live_at.is_some()
            })
            .returning(|_| Ok(vec![]));

        let service = BannerService::new(mock);
        let banners = service
            .live(LiveBannerQuery {
                placement: Some(BannerPlacement::Promo),
            })
            .await
            .unwrap();

        assert!(banners.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_window_ending_before_start() {
        let mock = MockBannerRepository::new();
        let service = BannerService::new(mock);

        let now = Utc::now();
        let result = service
            .create(CreateBanner {
                starts_at: Some(now),
                ends_at: Some(now - Duration::hours(1)),
                ..input()
            })
            .await;

        assert!(matches!(result, Err(BannerError::InvalidWindow)));
    }

    #[tokio::test]
    async fn test_update_checks_window_against_stored_start() {
        let now = Utc::now();
        let mut stored = Banner::new(input());
        stored.starts_at = Some(now);
        let id = stored.id;

        let mut mock = MockBannerRepository::new();
        mock.expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = BannerService::new(mock);
        let result = service
            .update(
                id,
                UpdateBanner {
                    ends_at: Some(Some(now - Duration::days(1))),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(BannerError::InvalidWindow)));
    }

    #[tokio::test]
    async fn test_delete_missing_banner() {
        let mut mock = MockBannerRepository::new();
        mock.expect_delete().returning(|_| Ok(false));

        let service = BannerService::new(mock);
        let result = service.delete(Uuid::now_v7()).await;

        assert!(matches!(result, Err(BannerError::NotFound(_))));
    }
}
