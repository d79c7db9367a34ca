//! Handler tests for the banners domain, over an in-memory repository

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use domain_banners::models::BannerQuery;
use domain_banners::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Clone, Default)]
struct InMemoryBanners(Arc<Mutex<Vec<Banner>>>);

#[async_trait]
impl BannerRepository for InMemoryBanners {
    async fn create(&self, banner: Banner) -> BannerResult<Banner> {
        self.0.lock().unwrap().push(banner.clone());
        Ok(banner)
    }

    async fn get_by_id(&self, id: Uuid) -> BannerResult<Option<Banner>> {
        Ok(self.0.lock().unwrap().iter().find(|b| b.id == id).cloned())
    }

    async fn list(&self, query: BannerQuery) -> BannerResult<Vec<Banner>> {
        let mut list: Vec<Banner> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|b| query.placement.is_none_or(|p| b.placement == p))
            .filter(|b| query.is_active.is_none_or(|a| b.is_active == a))
            .filter(|b| query.live_at.is_none_or(|now| b.is_live(now)))
            .cloned()
            .collect();
        list.sort_by_key(|b| b.sort_order);
        Ok(list)
    }

    async fn update(&self, banner: Banner) -> BannerResult<Banner> {
        let mut all = self.0.lock().unwrap();
        let slot = all
            .iter_mut()
            .find(|b| b.id == banner.id)
            .ok_or(BannerError::NotFound(banner.id))?;
        *slot = banner.clone();
        Ok(banner)
    }

    async fn delete(&self, id: Uuid) -> BannerResult<bool> {
        let mut all = self.0.lock().unwrap();
        let before = all.len();
        all.retain(|b| b.id != id);
        Ok(all.len() < before)
    }
}

fn app() -> Router {
    let service = BannerService::new(InMemoryBanners::default());
    Router::new()
        .merge(handlers::router(service.clone()))
        .nest("/admin", handlers::admin_router(service))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn titles(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_public_listing_shows_only_live_banners_in_order() {
    let app = app();
    let now = Utc::now();

    for body in [
        json!({ "title": "Second", "image": "/uploads/2.jpg", "sort_order": 2 }),
        json!({ "title": "First", "image": "/uploads/1.jpg", "sort_order": 1 }),
        json!({ "title": "Hidden", "image": "/uploads/h.jpg", "is_active": false }),
        json!({
            "title": "Upcoming",
            "image": "/uploads/u.jpg",
            "starts_at": now + Duration::days(3),
        }),
        json!({
            "title": "Expired",
            "image": "/uploads/e.jpg",
            "starts_at": now - Duration::days(10),
            "ends_at": now - Duration::days(1),
        }),
        json!({
            "title": "Promo",
            "image": "/uploads/p.jpg",
            "placement": "promo",
            "sort_order": 0,
        }),
    ] {
        let (status, _) = send(&app, "POST", "/admin/banners", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, live) = send(&app, "GET", "/banners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&live), vec!["Promo", "First", "Second"]);

    let (_, hero) = send(&app, "GET", "/banners?placement=hero", None).await;
    assert_eq!(titles(&hero), vec!["First", "Second"]);

    let (_, all) = send(&app, "GET", "/admin/banners", None).await;
    assert_eq!(all.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_create_rejects_inverted_window() {
    let app = app();
    let now = Utc::now();

    let (status, _) = send(
        &app,
        "POST",
        "/admin/banners",
        Some(json!({
            "title": "Broken",
            "image": "/uploads/b.jpg",
            "starts_at": now,
            "ends_at": now - Duration::hours(2),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/admin/banners",
        Some(json!({ "title": "", "image": "/uploads/b.jpg" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = app();
    let (_, created) = send(
        &app,
        "POST",
        "/admin/banners",
        Some(json!({ "title": "Sale", "image": "/uploads/s.jpg", "link": "/sale" })),
    )
    .await;
    let id = created["_id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/admin/banners/{id}"),
        Some(json!({ "title": "Big Sale", "link": null, "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Big Sale");
    assert!(updated["link"].is_null());

    let (_, live) = send(&app, "GET", "/banners", None).await;
    assert!(live.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &format!("/admin/banners/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/admin/banners/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/banners/{}", Uuid::now_v7()),
        Some(json!({ "title": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
