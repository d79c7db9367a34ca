//! Handler tests for the categories domain, over an in-memory repository

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use domain_categories::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Clone, Default)]
struct InMemoryCategories(Arc<Mutex<Vec<Category>>>);

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn create(&self, category: Category) -> CategoryResult<Category> {
        let mut all = self.0.lock().unwrap();
        if all.iter().any(|c| c.slug == category.slug) {
            return Err(CategoryError::DuplicateSlug(category.slug));
        }
        all.push(category.clone());
        Ok(category)
    }

    async fn get_by_id(&self, id: Uuid) -> CategoryResult<Option<Category>> {
        Ok(self.0.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> CategoryResult<Option<Category>> {
        Ok(self.0.lock().unwrap().iter().find(|c| c.slug == slug).cloned())
    }

    async fn list(&self, filter: CategoryFilter) -> CategoryResult<Vec<Category>> {
        let mut list: Vec<Category> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.is_active.is_none_or(|a| c.is_active == a))
            .filter(|c| filter.parent_id.is_none_or(|p| c.parent_id == Some(p)))
            .cloned()
            .collect();
        list.sort_by(|a, b| (a.sort_order, &a.name).cmp(&(b.sort_order, &b.name)));
        Ok(list)
    }

    async fn update(&self, category: Category) -> CategoryResult<Category> {
        let mut all = self.0.lock().unwrap();
        let slot = all
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(CategoryError::NotFound(category.id))?;
        *slot = category.clone();
        Ok(category)
    }

    async fn slug_exists(&self, slug: &str) -> CategoryResult<bool> {
        Ok(self.0.lock().unwrap().iter().any(|c| c.slug == slug))
    }

    async fn count_active_children(&self, parent_id: Uuid) -> CategoryResult<u64> {
        let all = self.0.lock().unwrap();
        Ok(all
            .iter()
            .filter(|c| c.parent_id == Some(parent_id) && c.is_active)
            .count() as u64)
    }
}

fn app() -> Router {
    let service = CategoryService::new(InMemoryCategories::default());
    Router::new()
        .merge(handlers::router(service.clone()))
        .nest("/admin", handlers::admin_router(service))
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
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

#[tokio::test]
async fn test_create_and_fetch_by_slug() {
    let app = app();

    let (status, created) = send(
        &app,
        "POST",
        "/admin/categories",
        Some(json!({ "name": "Robes de Soirée", "description": "Evening wear" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "robes-de-soiree");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/categories/slug/robes-de-soiree")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Category = json_body(response.into_body()).await;
    assert_eq!(fetched.name, "Robes de Soirée");
    assert_eq!(fetched.description.as_deref(), Some("Evening wear"));
}

#[tokio::test]
async fn test_same_name_gets_suffixed_slug() {
    let app = app();

    send(&app, "POST", "/admin/categories", Some(json!({ "name": "Shoes" }))).await;
    let (status, second) =
        send(&app, "POST", "/admin/categories", Some(json!({ "name": "shoes" }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["slug"], "shoes-2");
}

#[tokio::test]
async fn test_tree_nests_children() {
    let app = app();

    let (_, women) = send(&app, "POST", "/admin/categories", Some(json!({ "name": "Women" }))).await;
    send(
        &app,
        "POST",
        "/admin/categories",
        Some(json!({ "name": "Dresses", "parent_id": women["_id"] })),
    )
    .await;

    let (status, tree) = send(&app, "GET", "/categories/tree", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree.as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["children"][0]["name"], "Dresses");
}

#[tokio::test]
async fn test_soft_delete_hides_from_public_but_not_admin() {
    let app = app();

    let (_, parent) = send(&app, "POST", "/admin/categories", Some(json!({ "name": "Men" }))).await;
    let (_, child) = send(
        &app,
        "POST",
        "/admin/categories",
        Some(json!({ "name": "Shirts", "parent_id": parent["_id"] })),
    )
    .await;
    let parent_id = parent["_id"].as_str().unwrap();
    let child_id = child["_id"].as_str().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/admin/categories/{parent_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, deleted) =
        send(&app, "DELETE", &format!("/admin/categories/{child_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["is_active"], false);

    let (_, public) = send(&app, "GET", "/categories", None).await;
    assert_eq!(public.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", &format!("/categories/{child_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, admin) = send(&app, "GET", "/admin/categories", None).await;
    assert_eq!(admin.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_rejects_unknown_parent() {
    let app = app();
    let (_, category) = send(&app, "POST", "/admin/categories", Some(json!({ "name": "Kids" }))).await;
    let id = category["_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/categories/{id}"),
        Some(json!({ "parent_id": Uuid::now_v7() })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validates_name() {
    let app = app();
    let (status, _) = send(&app, "POST", "/admin/categories", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
