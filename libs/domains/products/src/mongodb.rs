//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use axum_helpers::Pagination;
use chrono::Utc;
use database::mongodb::{
    contains_ci, date_bson, id_bson, id_filter, ids_bson, is_duplicate_key, value_bson,
};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductQuery, ProductSort, StockLine};
use crate::repository::ProductRepository;

/// Fields owned by the stock operations
const STOCK_FIELDS: [&str; 4] = ["variants", "total_stock", "sizes", "colors"];

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>("products"),
        }
    }

    /// `$set` for an admin edit: every stored field except the id,
    /// `created_at`, `sold_count` and, unless `replace_variants`, the stock
    /// fields.
    fn edit_set(product: &Product, replace_variants: bool) -> ProductResult<Document> {
        let Bson::Document(mut fields) = value_bson(product) else {
            return Err(ProductError::Internal(format!(
                "product {} did not serialize to a document",
                product.id
            )));
        };

        for key in ["_id", "created_at", "sold_count"] {
            fields.remove(key);
        }
        if !replace_variants {
            for key in STOCK_FIELDS {
                fields.remove(key);
            }
        }

        Ok(doc! { "$set": fields })
    }

    /// Initialize indexes for optimal query performance
    pub async fn init_indexes(&self) -> ProductResult<()> {
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
            // Category listings
            IndexModel::builder()
                .keys(doc! { "category_id": 1, "is_active": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_active".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "is_featured": 1, "is_active": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_featured_active".to_string())
                        .build(),
                )
                .build(),
            // Price range queries
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_price".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "sold_count": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_sold_count".to_string())
                        .build(),
                )
                .build(),
            // Low-stock queries
            IndexModel::builder()
                .keys(doc! { "total_stock": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_total_stock".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "tags": 1 })
                .options(IndexOptions::builder().name("idx_tags".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from a resolved query
    fn build_filter(query: &ProductQuery) -> Document {
        let mut doc = doc! {};

        if let Some(is_active) = query.is_active {
            doc.insert("is_active", is_active);
        }

        if let Some(ref ids) = query.category_ids {
            doc.insert("category_id", doc! { "$in": ids_bson(ids) });
        }

        if let Some(featured) = query.featured {
            doc.insert("is_featured", featured);
        }

        // Price range
        if query.min_price.is_some() || query.max_price.is_some() {
            let mut price_filter = doc! {};
            if let Some(min) = query.min_price {
                price_filter.insert("$gte", min);
            }
            if let Some(max) = query.max_price {
                price_filter.insert("$lte", max);
            }
            doc.insert("price", price_filter);
        }

        if let Some(ref size) = query.size {
            doc.insert("sizes", size);
        }

        if let Some(ref color) = query.color {
            doc.insert("colors", color);
        }

        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            doc.insert(
                "$or",
                vec![
                    doc! { "name": contains_ci(search) },
                    doc! { "description": contains_ci(search) },
                    doc! { "tags": contains_ci(search) },
                ],
            );
        }

        doc
    }

    fn sort_doc(sort: ProductSort) -> Document {
        match sort {
            ProductSort::Newest => doc! { "created_at": -1 },
            ProductSort::PriceAsc => doc! { "price": 1, "created_at": -1 },
            ProductSort::PriceDesc => doc! { "price": -1, "created_at": -1 },
            ProductSort::Popular => doc! { "sold_count": -1, "created_at": -1 },
            ProductSort::Name => doc! { "name": 1 },
        }
    }

    /// Matches the variant of `line` only while it holds enough units
    fn reserve_filter(line: &StockLine) -> Document {
        doc! {
            "_id": id_bson(&line.product_id),
            "is_active": true,
            "variants": {
                "$elemMatch": {
                    "size": &line.size,
                    "color": &line.color,
                    "stock": { "$gte": line.quantity },
                }
            },
        }
    }

    fn variant_filter(id: &Uuid, size: &str, color: &str) -> Document {
        doc! {
            "_id": id_bson(id),
            "variants": { "$elemMatch": { "size": size, "color": color } },
        }
    }

    /// `$inc` on the matched variant plus the derived counters
    fn stock_delta(quantity: i32) -> Document {
        doc! {
            "$inc": {
                "variants.$.stock": quantity,
                "total_stock": quantity,
                "sold_count": -(quantity as i64),
            },
            "$set": { "updated_at": date_bson(&Utc::now()) },
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(slug = %product.slug))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await.map_err(|e| {
            if is_duplicate_key(&e) {
                ProductError::DuplicateSlug(product.slug.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.collection.find_one(id_filter(&id)).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_slug(&self, slug: &str) -> ProductResult<Option<Product>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: ProductQuery, page: Pagination) -> ProductResult<Vec<Product>> {
        let products = self
            .collection
            .find(Self::build_filter(&query))
            .sort(Self::sort_doc(query.sort))
            .skip(page.skip())
            .limit(page.limit as i64)
            .await?
            .try_collect()
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: ProductQuery) -> ProductResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&query))
            .await?)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: Product, replace_variants: bool) -> ProductResult<Product> {
        let result = self
            .collection
            .update_one(
                id_filter(&product.id),
                Self::edit_set(&product, replace_variants)?,
            )
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    ProductError::DuplicateSlug(product.slug.clone())
                } else {
                    e.into()
                }
            })?;

        if result.matched_count == 0 {
            return Err(ProductError::NotFound(product.id));
        }

        tracing::info!(product_id = %product.id, replace_variants, "Product updated successfully");
        self.get_by_id(product.id)
            .await?
            .ok_or(ProductError::NotFound(product.id))
    }

    #[instrument(skip(self))]
    async fn related(
        &self,
        category_id: Uuid,
        exclude: Uuid,
        limit: u64,
    ) -> ProductResult<Vec<Product>> {
        let filter = doc! {
            "category_id": id_bson(&category_id),
            "_id": { "$ne": id_bson(&exclude) },
            "is_active": true,
        };
        let products = self
            .collection
            .find(filter)
            .sort(doc! { "sold_count": -1, "created_at": -1 })
            .limit(limit as i64)
            .await?
            .try_collect()
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn low_stock(&self, threshold: i32, limit: u64) -> ProductResult<Vec<Product>> {
        let filter = doc! {
            "total_stock": { "$lte": threshold },
            "is_active": true,
        };
        let products = self
            .collection
            .find(filter)
            .sort(doc! { "total_stock": 1, "name": 1 })
            .limit(limit as i64)
            .await?
            .try_collect()
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn set_variant_stock(
        &self,
        id: Uuid,
        size: &str,
        color: &str,
        stock: i32,
    ) -> ProductResult<Option<Product>> {
        // Pipeline update so total_stock is recomputed from the stored
        // variants in the same write
        let pipeline = vec![
            doc! {
                "$set": {
                    "variants": {
                        "$map": {
                            "input": "$variants",
                            "as": "v",
                            "in": {
                                "$cond": [
                                    { "$and": [
                                        { "$eq": ["$$v.size", size] },
                                        { "$eq": ["$$v.color", color] },
                                    ] },
                                    { "$mergeObjects": ["$$v", { "stock": stock }] },
                                    "$$v",
                                ]
                            }
                        }
                    }
                }
            },
            doc! {
                "$set": {
                    "total_stock": { "$sum": "$variants.stock" },
                    "updated_at": date_bson(&Utc::now()),
                }
            },
        ];

        let result = self
            .collection
            .update_one(Self::variant_filter(&id, size, color), pipeline)
            .await?;
        if result.matched_count == 0 {
            return Ok(None);
        }

        tracing::info!(product_id = %id, size, color, stock, "Variant stock set");
        self.get_by_id(id).await
    }

    #[instrument(skip(self), fields(product_id = %line.product_id))]
    async fn decrement_stock(&self, line: &StockLine) -> ProductResult<bool> {
        let result = self
            .collection
            .update_one(Self::reserve_filter(line), Self::stock_delta(-line.quantity))
            .await?;
        Ok(result.modified_count == 1)
    }

    #[instrument(skip(self), fields(product_id = %line.product_id))]
    async fn increment_stock(&self, line: &StockLine) -> ProductResult<bool> {
        let result = self
            .collection
            .update_one(
                Self::variant_filter(&line.product_id, &line.size, &line.color),
                Self::stock_delta(line.quantity),
            )
            .await?;
        Ok(result.modified_count == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> StockLine {
        StockLine {
            product_id: Uuid::now_v7(),
            size: "M".to_string(),
            color: "Indigo".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoProductRepository::build_filter(&ProductQuery::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_price_range() {
        let query = ProductQuery {
            min_price: Some(1000),
            max_price: Some(5000),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&query);
        let price = doc.get_document("price").unwrap();
        assert_eq!(price.get_i64("$gte").unwrap(), 1000);
        assert_eq!(price.get_i64("$lte").unwrap(), 5000);
    }

    #[test]
    fn test_build_filter_with_search_and_variants() {
        let query = ProductQuery {
            search: Some("ankara".to_string()),
            size: Some("M".to_string()),
            color: Some("Indigo".to_string()),
            is_active: Some(true),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&query);
        assert_eq!(doc.get_array("$or").unwrap().len(), 3);
        assert_eq!(doc.get_str("sizes").unwrap(), "M");
        assert_eq!(doc.get_str("colors").unwrap(), "Indigo");
        assert!(doc.get_bool("is_active").unwrap());
    }

    #[test]
    fn test_build_filter_with_categories() {
        let query = ProductQuery {
            category_ids: Some(vec![Uuid::now_v7(), Uuid::now_v7()]),
            ..Default::default()
        };
        let doc = MongoProductRepository::build_filter(&query);
        let ids = doc
            .get_document("category_id")
            .unwrap()
            .get_array("$in")
            .unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_reserve_filter_requires_enough_stock() {
        let doc = MongoProductRepository::reserve_filter(&line(3));
        let matcher = doc
            .get_document("variants")
            .unwrap()
            .get_document("$elemMatch")
            .unwrap();
        assert_eq!(
            matcher.get_document("stock").unwrap().get_i32("$gte").unwrap(),
            3
        );
        assert!(doc.get_bool("is_active").unwrap());
    }

    #[test]
    fn test_stock_delta_moves_sold_count_inversely() {
        let update = MongoProductRepository::stock_delta(-2);
        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.get_i32("variants.$.stock").unwrap(), -2);
        assert_eq!(inc.get_i32("total_stock").unwrap(), -2);
        assert_eq!(inc.get_i64("sold_count").unwrap(), 2);
    }

    fn stored_product() -> Product {
        Product::new(
            crate::models::CreateProduct {
                name: "Robe Wax".to_string(),
                description: "Coton".to_string(),
                price: 24_900,
                compare_at_price: None,
                category_id: Uuid::now_v7(),
                images: Vec::new(),
                variants: vec![crate::models::Variant {
                    size: "M".to_string(),
                    color: "Indigo".to_string(),
                    stock: 5,
                    sku: None,
                }],
                tags: Vec::new(),
                is_featured: false,
                is_active: true,
            },
            "robe-wax".to_string(),
        )
    }

    #[test]
    fn test_edit_set_leaves_stock_fields_alone() {
        let update = MongoProductRepository::edit_set(&stored_product(), false).unwrap();
        let fields = update.get_document("$set").unwrap();

        assert_eq!(fields.get_i64("price").unwrap(), 24_900);
        assert_eq!(fields.get_str("slug").unwrap(), "robe-wax");
        assert!(fields.contains_key("updated_at"));
        for key in ["_id", "created_at", "sold_count", "variants", "total_stock", "sizes", "colors"] {
            assert!(!fields.contains_key(key), "{key} must not be written");
        }
    }

    #[test]
    fn test_edit_set_writes_variants_when_replaced() {
        let update = MongoProductRepository::edit_set(&stored_product(), true).unwrap();
        let fields = update.get_document("$set").unwrap();

        assert_eq!(fields.get_array("variants").unwrap().len(), 1);
        assert_eq!(fields.get_i32("total_stock").unwrap(), 5);
        assert!(!fields.contains_key("sold_count"));
        assert!(!fields.contains_key("_id"));
    }

    #[test]
    fn test_sort_docs() {
        let doc = MongoProductRepository::sort_doc(ProductSort::PriceAsc);
        assert_eq!(doc.get_i32("price").unwrap(), 1);
        let doc = MongoProductRepository::sort_doc(ProductSort::Popular);
        assert_eq!(doc.get_i32("sold_count").unwrap(), -1);
    }
}
