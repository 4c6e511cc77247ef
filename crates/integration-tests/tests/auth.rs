//! Integration tests for authentication.
//!
//! These tests require a running API with seed data.
//! Run with: `cargo test -p clementine-integration-tests -- --ignored`

use serde_json::{Value, json};

use clementine_integration_tests::{base_url, client, register_user, unique_email};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_returns_usable_token_pair() {
    let client = client();
    let email = unique_email("register");

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "name": "Fresh User",
            "password": "integration-test-pw",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "User");
    assert!(body["tokens"]["accessToken"].as_str().is_some());
    assert!(body["tokens"]["refreshToken"].as_str().is_some());

    // The access token must work immediately
    let token = body["tokens"]["accessToken"].as_str().unwrap();
    let me = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_email_fails() {
    let client = client();
    let (email, _) = register_user(&client, "dup").await;

    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({
            "email": email,
            "name": "Copycat",
            "password": "integration-test-pw",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_wrong_password_fails_indistinguishably() {
    let client = client();
    let (email, _) = register_user(&client, "badpw").await;

    let wrong_password = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    let unknown_user = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({
            "email": unique_email("ghost"),
            "password": "whatever-pw",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), 400);
    assert_eq!(unknown_user.status(), 400);

    // Same caller-visible message in both cases
    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_user.json().await.unwrap();
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_stamps_last_login() {
    let client = client();
    let (email, token) = register_user(&client, "lastlogin").await;

    let before: Value = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let login: Value = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "integration-test-pw" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let stamped = login["user"]["lastLoginAt"].as_str().unwrap();
    assert!(stamped >= before["lastLoginAt"].as_str().unwrap_or(""));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_change_password_requires_current() {
    let client = client();
    let (email, token) = register_user(&client, "chpw").await;

    let wrong = client
        .post(format!("{}/auth/change-password", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "currentPassword": "not-the-password",
            "newPassword": "another-test-pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 400);

    let right = client
        .post(format!("{}/auth/change-password", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "currentPassword": "integration-test-pw",
            "newPassword": "another-test-pw",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(right.status(), 200);

    // Old password no longer works, new one does
    let old_login = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "integration-test-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(old_login.status(), 400);

    let new_login = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "another-test-pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(new_login.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_protected_route_rejects_missing_and_garbage_tokens() {
    let client = client();

    let missing = client
        .get(format!("{}/auth/me", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 401);

    let garbage = client
        .get(format!("{}/auth/me", base_url()))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), 401);
}
