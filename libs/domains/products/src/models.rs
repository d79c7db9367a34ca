use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Listing order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    /// Best sellers first
    Popular,
    Name,
}

/// A (size, color) stock-keeping unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Variant {
    #[validate(length(min = 1, max = 20))]
    pub size: String,
    #[validate(length(min = 1, max = 40))]
    pub color: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[validate(length(max = 64))]
    #[serde(default)]
    pub sku: Option<String>,
}

/// Product entity - stored in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Unique, derived from the name
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Minor units
    pub price: i64,
    /// Struck-through "was" price, always above `price`
    #[serde(default)]
    pub compare_at_price: Option<i64>,
    pub category_id: Uuid,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Sum of variant stock
    #[serde(default)]
    pub total_stock: i32,
    /// Distinct sizes in variant order
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Distinct colors in variant order
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    pub is_active: bool,
    #[serde(default)]
    pub sold_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub compare_at_price: Option<i64>,
    pub category_id: Uuid,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(length(min = 1, max = 100), nested)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// DTO for updating a product. `compare_at_price: null` removes the
/// "was" price.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i64>)]
    pub compare_at_price: Option<Option<i64>>,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 20))]
    pub images: Option<Vec<String>>,
    #[validate(length(min = 1, max = 100), nested)]
    pub variants: Option<Vec<Variant>>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
}

/// Set the stock of one variant
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetVariantStock {
    #[validate(length(min = 1))]
    pub size: String,
    #[validate(length(min = 1))]
    pub color: String,
    #[validate(range(min = 0))]
    pub stock: i32,
}

/// Query parameters for product listings
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    /// Category id or slug; subcategories are included
    pub category: Option<String>,
    /// Matches name, description and tags, case-insensitive
    pub search: Option<String>,
    /// Minor units
    pub min_price: Option<i64>,
    /// Minor units
    pub max_price: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub featured: Option<bool>,
    /// Admin listings only
    pub is_active: Option<bool>,
    pub sort: Option<ProductSort>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Resolved listing criteria handed to the repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// `None` means any category; an empty list matches nothing
    pub category_ids: Option<Vec<Uuid>>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub featured: Option<bool>,
    pub is_active: Option<bool>,
    pub sort: ProductSort,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct LowStockQuery {
    /// Defaults to the configured low-stock threshold
    pub threshold: Option<i32>,
    pub limit: Option<u64>,
}

/// One unit of stock movement: `quantity` of a product variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StockLine {
    pub product_id: Uuid,
    pub size: String,
    pub color: String,
    pub quantity: i32,
}

fn default_true() -> bool {
    true
}

/// Distinguishes an explicit `null` from a missing field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Product {
    /// New product; slug assigned by the service
    pub fn new(input: CreateProduct, slug: String) -> Self {
        let now = Utc::now();
        let mut product = Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            slug,
            description: input.description,
            price: input.price,
            compare_at_price: input.compare_at_price,
            category_id: input.category_id,
            images: input.images,
            variants: input.variants,
            total_stock: 0,
            sizes: Vec::new(),
            colors: Vec::new(),
            tags: normalize_tags(input.tags),
            is_featured: input.is_featured,
            is_active: input.is_active,
            sold_count: 0,
            created_at: now,
            updated_at: now,
        };
        product.recompute_derived();
        product
    }

    /// Apply everything except the name, which goes through slug assignment
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(compare_at_price) = update.compare_at_price {
            self.compare_at_price = compare_at_price;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(variants) = update.variants {
            self.variants = variants;
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(is_featured) = update.is_featured {
            self.is_featured = is_featured;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.recompute_derived();
        self.updated_at = Utc::now();
    }

    /// Refresh `total_stock`, `sizes` and `colors` from the variants
    pub fn recompute_derived(&mut self) {
        self.total_stock = self.variants.iter().map(|v| v.stock.max(0)).sum();

        self.sizes.clear();
        self.colors.clear();
        for variant in &self.variants {
            if !self.sizes.contains(&variant.size) {
                self.sizes.push(variant.size.clone());
            }
            if !self.colors.contains(&variant.color) {
                self.colors.push(variant.color.clone());
            }
        }
    }

    /// Rules spanning several fields: the "was" price sits above the price
    /// and each (size, color) appears once.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.price < 0 {
            return Err("price must not be negative".to_string());
        }
        if self.compare_at_price.is_some_and(|c| c <= self.price) {
            return Err("compare_at_price must be greater than price".to_string());
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            if variant.stock < 0 {
                return Err(format!(
                    "stock for {}/{} must not be negative",
                    variant.size, variant.color
                ));
            }
            let key = (variant.size.to_lowercase(), variant.color.to_lowercase());
            if !seen.insert(key) {
                return Err(format!(
                    "duplicate variant {}/{}",
                    variant.size, variant.color
                ));
            }
        }
        Ok(())
    }

    pub fn variant(&self, size: &str, color: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.size == size && v.color == color)
    }

    pub fn in_stock(&self) -> bool {
        self.total_stock > 0
    }
}

/// Trimmed, lowercased, deduplicated
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
