//! MongoDB implementation of BannerRepository

use async_trait::async_trait;
use database::mongodb::{date_bson, id_filter, value_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{BannerError, BannerResult};
use crate::models::{Banner, BannerQuery};
use crate::repository::BannerRepository;

pub struct MongoBannerRepository {
    collection: Collection<Banner>,
}

impl MongoBannerRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Banner>("banners"),
        }
    }

    pub async fn init_indexes(&self) -> BannerResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "is_active": 1, "placement": 1, "sort_order": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_active_placement_order".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Banner indexes created successfully");
        Ok(())
    }

    fn build_filter(query: &BannerQuery) -> Document {
        let mut doc = doc! {};

        if let Some(placement) = query.placement {
            doc.insert("placement", value_bson(&placement));
        }
        if let Some(is_active) = query.is_active {
            doc.insert("is_active", is_active);
        }

        // `null` also matches documents without the field
        if let Some(now) = query.live_at {
            let now = date_bson(&now);
            doc.insert(
                "$and",
                vec![
                    doc! { "$or": [{ "starts_at": null }, { "starts_at": { "$lte": now.clone() } }] },
                    doc! { "$or": [{ "ends_at": null }, { "ends_at": { "$gt": now } }] },
                ],
            );
        }

        doc
    }
}

#[async_trait]
impl BannerRepository for MongoBannerRepository {
    #[instrument(skip(self, banner), fields(title = %banner.title))]
    async fn create(&self, banner: Banner) -> BannerResult<Banner> {
        self.collection.insert_one(&banner).await?;
        tracing::info!(banner_id = %banner.id, "Banner created");
        Ok(banner)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> BannerResult<Option<Banner>> {
        Ok(self.collection.find_one(id_filter(&id)).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: BannerQuery) -> BannerResult<Vec<Banner>> {
        let banners = self
            .collection
            .find(Self::build_filter(&query))
            .sort(doc! { "sort_order": 1, "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(banners)
    }

    #[instrument(skip(self, banner), fields(banner_id = %banner.id))]
    async fn update(&self, banner: Banner) -> BannerResult<Banner> {
        let result = self
            .collection
            .replace_one(id_filter(&banner.id), &banner)
            .await?;

        if result.matched_count == 0 {
            return Err(BannerError::NotFound(banner.id));
        }
        Ok(banner)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> BannerResult<bool> {
        let result = self.collection.delete_one(id_filter(&id)).await?;
        Ok(result.deleted_count == 1)
    }
}
