//! Integration tests for the cart: stock bounds and totals.
//!
//! These tests require a running API with seed data.
//! Run with: `cargo test -p clementine-integration-tests -- --ignored`

use serde_json::{Value, json};

use clementine_integration_tests::{
    add_to_cart, admin_token, base_url, client, create_product, register_user,
};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_add_is_bounded_by_stock() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, token) = register_user(&client, "cart-bounds").await;

    // Product P: stock 5, price 10.00, no discount
    let product_id = create_product(&client, &admin, "Bounded Widget", "10.00", 5).await;

    // qty 3 succeeds
    let first = add_to_cart(&client, &token, product_id, 3).await;
    assert_eq!(first.status(), 201);

    // another 3 would make 6 > 5: fails
    let second = add_to_cart(&client, &token, product_id, 3).await;
    assert_eq!(second.status(), 400);
    let body: Value = second.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Insufficient stock"));

    // another 2 makes exactly 5: succeeds with line total 50.00
    let third = add_to_cart(&client, &token, product_id, 2).await;
    assert_eq!(third.status(), 200);
    let item: Value = third.json().await.unwrap();
    assert_eq!(item["quantity"], 5);
    assert_eq!(item["totalPrice"].as_str().map(str::trim), Some("50.00"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_summary_applies_tax() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, token) = register_user(&client, "cart-tax").await;

    let p = create_product(&client, &admin, "Tax Widget P", "10.00", 50).await;
    let q = create_product(&client, &admin, "Tax Widget Q", "25.00", 50).await;

    assert_eq!(add_to_cart(&client, &token, p, 2).await.status(), 201);
    assert_eq!(add_to_cart(&client, &token, q, 1).await.status(), 201);

    let cart: Value = client
        .get(format!("{}/cart", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(cart["totalItems"], 3);
    assert_eq!(cart["subTotal"].as_str(), Some("45.00"));
    assert_eq!(cart["tax"].as_str(), Some("3.6000"));
    assert_eq!(cart["total"].as_str(), Some("48.6000"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_update_revalidates_stock() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, token) = register_user(&client, "cart-update").await;

    let product_id = create_product(&client, &admin, "Update Widget", "5.00", 4).await;

    let added: Value = add_to_cart(&client, &token, product_id, 1)
        .await
        .json()
        .await
        .unwrap();
    let item_id = added["id"].as_i64().unwrap();

    let too_many = client
        .put(format!("{}/cart/items/{item_id}", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_many.status(), 400);

    let ok = client
        .put(format!("{}/cart/items/{item_id}", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_items_are_caller_scoped() {
    let client = client();
    let admin = admin_token(&client).await;
    let (_, owner) = register_user(&client, "cart-owner").await;
    let (_, intruder) = register_user(&client, "cart-intruder").await;

    let product_id = create_product(&client, &admin, "Private Widget", "5.00", 10).await;
    let added: Value = add_to_cart(&client, &owner, product_id, 1)
        .await
        .json()
        .await
        .unwrap();
    let item_id = added["id"].as_i64().unwrap();

    // Another user cannot touch the line
    let stolen_update = client
        .put(format!("{}/cart/items/{item_id}", base_url()))
        .bearer_auth(&intruder)
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(stolen_update.status(), 404);

    let stolen_delete = client
        .delete(format!("{}/cart/items/{item_id}", base_url()))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(stolen_delete.status(), 404);
}
