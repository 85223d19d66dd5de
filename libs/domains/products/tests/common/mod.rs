//! In-memory repository and request helpers shared by the handler tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use chrono::Utc;
use domain_products::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_utils::TestDataBuilder;
use tower::ServiceExt;

/// Stores products in a `Vec`, enforcing SKU uniqueness like the unique index does.
///
/// Clones share storage, so a test can keep a handle after moving one into the router.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<Mutex<Vec<Product>>>,
    calls: Arc<AtomicUsize>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl InMemoryProductRepository {
    /// Number of repository calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.products.lock().unwrap().clone()
    }

    /// Make every later call fail as if storage were unreachable
    pub fn fail_with(&self, detail: &str) {
        *self.fail_with.lock().unwrap() = Some(detail.to_string());
    }

    fn enter(&self) -> ProductResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with.lock().unwrap().clone() {
            Some(detail) => Err(ProductError::Unexpected(detail)),
            None => Ok(()),
        }
    }

    fn sku_taken(products: &[Product], sku: &str, except: Option<ProductId>) -> bool {
        products
            .iter()
            .any(|p| p.sku == sku && Some(p.id) != except)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, fields: ProductFields) -> ProductResult<Product> {
        self.enter()?;
        let mut products = self.products.lock().unwrap();
        if Self::sku_taken(&products, &fields.sku, None) {
            return Err(ProductError::DuplicateKey(fields.sku));
        }
        let product = Product::new(ProductId::new(), fields);
        products.push(product.clone());
        Ok(product)
    }

    async fn find(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        self.enter()?;
        let products = self.products.lock().unwrap();
        Ok(products.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> ProductResult<Option<Product>> {
        self.enter()?;
        let products = self.products.lock().unwrap();
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: ProductId, fields: ProductFields) -> ProductResult<Option<Product>> {
        self.enter()?;
        let mut products = self.products.lock().unwrap();
        if Self::sku_taken(&products, &fields.sku, Some(id)) {
            return Err(ProductError::DuplicateKey(fields.sku));
        }
        let Some(slot) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        *slot = Product::from_parts(id, fields, slot.created_at, Utc::now());
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: ProductId) -> ProductResult<Option<Product>> {
        self.enter()?;
        let mut products = self.products.lock().unwrap();
        let index = products.iter().position(|p| p.id == id);
        Ok(index.map(|i| products.remove(i)))
    }
}

/// Router over a fresh in-memory repository, plus a handle on that repository
pub fn app() -> (Router, InMemoryProductRepository) {
    let repo = InMemoryProductRepository::default();
    let router = handlers::router(ProductService::new(repo.clone()));
    (router, repo)
}

/// The Widget body used throughout the tests
pub fn widget() -> Value {
    json!({
        "name": "Widget",
        "sku": "W1",
        "price": 15,
        "category": "Tools",
        "amountInStock": 3,
        "manufacturer": {
            "name": "Acme",
            "country": "US",
            "contact": { "name": "A", "email": "a@a.com", "phone": "1" }
        }
    })
}

/// A valid product body with a seeded SKU and the given overrides applied on top
pub fn product_body(builder: &TestDataBuilder, suffix: &str, overrides: Value) -> Value {
    let mut body = widget();
    body["name"] = json!(builder.name("product", suffix));
    body["sku"] = json!(builder.sku(suffix));
    if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), overrides) {
        target.extend(fields);
    }
    body
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST the body and return the created product's id
pub async fn create(app: &Router, body: Value) -> String {
    let response = send(app, "POST", "/", Some(body)).await;
    assert_eq!(response.status(), 201);
    let envelope = json_body(response).await;
    envelope["data"]["id"].as_str().unwrap().to_string()
}
