//! Integration tests for Clementine.
//!
//! These tests drive a running API end-to-end over HTTP and therefore
//! require:
//!
//! - A running `PostgreSQL` database
//! - The API server running with seed data (`cargo run -p clementine-api`)
//!
//! Point the tests at the server with `API_BASE_URL`
//! (default: `http://localhost:8080`), then run:
//!
//! ```bash
//! cargo test -p clementine-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the API under test (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// A plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique email for test isolation.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@test.clementine.store", Uuid::new_v4().simple())
}

/// Register a fresh user and return (email, access token).
///
/// # Panics
///
/// Panics if registration does not succeed.
pub async fn register_user(client: &Client, prefix: &str) -> (String, String) {
    let email = unique_email(prefix);
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "name": "Test User",
            "password": "integration-test-pw",
        }))
        .send()
        .await
        .expect("register request failed");

    assert!(resp.status().is_success(), "registration failed");
    let body: Value = resp.json().await.expect("register response not JSON");
    let token = body["tokens"]["accessToken"]
        .as_str()
        .expect("missing access token")
        .to_string();

    (email, token)
}

/// Login as the seeded development admin and return an access token.
///
/// # Panics
///
/// Panics if the login does not succeed (seed data missing?).
pub async fn admin_token(client: &Client) -> String {
    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "email": "admin@clementine.store",
            "password": "admin123",
        }))
        .send()
        .await
        .expect("admin login request failed");

    assert!(
        resp.status().is_success(),
        "admin login failed; is the database seeded?"
    );
    let body: Value = resp.json().await.expect("login response not JSON");
    body["tokens"]["accessToken"]
        .as_str()
        .expect("missing access token")
        .to_string()
}

/// Create a product as admin and return its id.
///
/// # Panics
///
/// Panics if creation does not succeed.
pub async fn create_product(
    client: &Client,
    admin_token: &str,
    name: &str,
    price: &str,
    stock: i32,
) -> i64 {
    // Any seeded category works for test products.
    let categories: Value = client
        .get(format!("{}/categories", base_url()))
        .send()
        .await
        .expect("categories request failed")
        .json()
        .await
        .expect("categories response not JSON");
    let category_id = categories[0]["id"].as_i64().expect("no seeded categories");

    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(admin_token)
        .json(&json!({
            "name": name,
            "price": price,
            "categoryId": category_id,
            "stock": stock,
        }))
        .send()
        .await
        .expect("create product request failed");

    assert_eq!(resp.status(), 201, "product creation failed");
    let body: Value = resp.json().await.expect("product response not JSON");
    body["id"].as_i64().expect("missing product id")
}

/// Add a product to the caller's cart; returns the raw response.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn add_to_cart(
    client: &Client,
    token: &str,
    product_id: i64,
    quantity: i32,
) -> reqwest::Response {
    client
        .post(format!("{}/cart/items", base_url()))
        .bearer_auth(token)
        .json(&json!({ "productId": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("add-to-cart request failed")
}

/// Place an order with boilerplate shipping details; returns the raw
/// response.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn place_order(client: &Client, token: &str) -> reqwest::Response {
    client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "shippingName": "Test User",
            "shippingAddress": "1 Test Street",
            "shippingCity": "Testville",
            "shippingState": "TS",
            "shippingZip": "00000",
            "shippingCountry": "US",
        }))
        .send()
        .await
        .expect("place-order request failed")
}
