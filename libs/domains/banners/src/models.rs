use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Where on the storefront a banner is shown
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BannerPlacement {
    #[default]
    Hero,
    Promo,
    Category,
}

/// Banner entity - stored in the `banners` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Banner {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default)]
    pub placement: BannerPlacement,
    #[serde(default)]
    pub sort_order: i32,
    pub is_active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a banner
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBanner {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(length(max = 250))]
    pub subtitle: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub image: String,
    #[validate(length(max = 500))]
    pub link: Option<String>,
    #[validate(length(max = 40))]
    pub button_text: Option<String>,
    #[serde(default)]
    pub placement: BannerPlacement,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// DTO for updating a banner; `null` clears an optional field
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBanner {
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub subtitle: Option<Option<String>>,
    #[validate(length(min = 1, max = 500))]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub button_text: Option<Option<String>>,
    pub placement: Option<BannerPlacement>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub ends_at: Option<Option<DateTime<Utc>>>,
}

/// Public listing parameters
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct LiveBannerQuery {
    pub placement: Option<BannerPlacement>,
}

/// Admin listing parameters
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct BannerFilter {
    pub placement: Option<BannerPlacement>,
    pub is_active: Option<bool>,
}

/// Resolved listing criteria handed to the repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BannerQuery {
    pub placement: Option<BannerPlacement>,
    pub is_active: Option<bool>,
    /// Only banners whose window contains this instant
    pub live_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank strings are stored as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Banner {
    pub fn new(input: CreateBanner) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title.trim().to_string(),
            subtitle: non_blank(input.subtitle),
            image: input.image,
            link: non_blank(input.link),
            button_text: non_blank(input.button_text),
            placement: input.placement,
            sort_order: input.sort_order,
            is_active: input.is_active,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateBanner) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(subtitle) = update.subtitle {
            self.subtitle = non_blank(subtitle);
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(link) = update.link {
            self.link = non_blank(link);
        }
        if let Some(button_text) = update.button_text {
            self.button_text = non_blank(button_text);
        }
        if let Some(placement) = update.placement {
            self.placement = placement;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(starts_at) = update.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = update.ends_at {
            self.ends_at = ends_at;
        }
        self.updated_at = Utc::now();
    }

    /// `ends_at` must come after `starts_at` when both are set
    pub fn has_valid_window(&self) -> bool {
        match (self.starts_at, self.ends_at) {
            (Some(start), Some(end)) => end > start,
            _ => true,
        }
    }

    /// Active, started (or no start) and not yet ended (or no end)
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| end > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn banner() -> Banner {
        Banner::new(CreateBanner {
            title: " Summer Sale ".to_string(),
            subtitle: Some("  ".to_string()),
            image: "/uploads/summer.jpg".to_string(),
            link: Some("/products?category=summer".to_string()),
            button_text: None,
            placement: BannerPlacement::Hero,
            sort_order: 1,
            is_active: true,
            starts_at: None,
            ends_at: None,
        })
    }

    #[test]
    fn test_new_trims_and_drops_blank_text() {
        let banner = banner();
        assert_eq!(banner.title, "Summer Sale");
        assert_eq!(banner.subtitle, None);
        assert_eq!(banner.link.as_deref(), Some("/products?category=summer"));
    }

    #[test]
    fn test_window_must_end_after_start() {
        let now = Utc::now();
        let mut banner = banner();
        assert!(banner.has_valid_window());

        banner.starts_at = Some(now);
        banner.ends_at = Some(now);
        assert!(!banner.has_valid_window());

        banner.ends_at = Some(now + Duration::days(1));
        assert!(banner.has_valid_window());
    }

    #[test]
    fn test_is_live_respects_window_and_active_flag() {
        let now = Utc::now();
        let mut banner = banner();
        assert!(banner.is_live(now));

        banner.starts_at = Some(now + Duration::hours(1));
        assert!(!banner.is_live(now));

        banner.starts_at = Some(now - Duration::days(2));
        banner.ends_at = Some(now - Duration::days(1));
        assert!(!banner.is_live(now));

        banner.ends_at = Some(now + Duration::days(1));
        assert!(banner.is_live(now));

        banner.is_active = false;
        assert!(!banner.is_live(now));
    }

    #[test]
    fn test_update_clears_optional_fields_with_null() {
        let mut banner = banner();
        let update: UpdateBanner =
            serde_json::from_str(r#"{"link": null, "sort_order": 4}"#).unwrap();
        banner.apply_update(update);

        assert_eq!(banner.link, None);
        assert_eq!(banner.sort_order, 4);
        assert_eq!(banner.title, "Summer Sale");
    }
}
