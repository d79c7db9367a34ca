//! MongoDB implementation of CategoryRepository

use async_trait::async_trait;
use database::mongodb::{id_bson, id_filter, is_duplicate_key};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CategoryError, CategoryResult};
use crate::models::{Category, CategoryFilter};
use crate::repository::CategoryRepository;

pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Category>("categories"),
        }
    }

    pub async fn init_indexes(&self) -> CategoryResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "slug": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_slug_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "parent_id": 1, "is_active": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_parent_active".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Category indexes created successfully");
        Ok(())
    }

    fn build_filter(filter: &CategoryFilter) -> Document {
        let mut doc = doc! {};

        if let Some(parent_id) = filter.parent_id {
            doc.insert("parent_id", id_bson(&parent_id));
        }
        if let Some(is_active) = filter.is_active {
            doc.insert("is_active", is_active);
        }

        doc
    }

    fn map_write_error(err: mongodb::error::Error, slug: &str) -> CategoryError {
        if is_duplicate_key(&err) {
            CategoryError::DuplicateSlug(slug.to_string())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    #[instrument(skip(self, category), fields(slug = %category.slug))]
    async fn create(&self, category: Category) -> CategoryResult<Category> {
        self.collection
            .insert_one(&category)
            .await
            .map_err(|e| Self::map_write_error(e, &category.slug))?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        Ok(self.collection.find_one(id_filter(&id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_slug(&self, slug: &str) -> CategoryResult<Option<Category>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>> {
        let categories = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "sort_order": 1, "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(categories)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn update(&self, category: Category) -> CategoryResult<Category> {
        let result = self
            .collection
            .replace_one(id_filter(&category.id), &category)
            .await
            .map_err(|e| Self::map_write_error(e, &category.slug))?;

        if result.matched_count == 0 {
            return Err(CategoryError::NotFound(category.id));
        }
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn slug_exists(&self, slug: &str) -> CategoryResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "slug": slug })
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn count_active_children(&self, parent_id: Uuid) -> CategoryResult<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "parent_id": id_bson(&parent_id), "is_active": true })
            .await?)
    }
}
