//! Cart behavior: dedup, quantity updates, ownership, clearing.

use axum::http::StatusCode;
use rust_decimal::dec;
use serde_json::json;

use zinoshop_integration_tests::TestApp;

#[tokio::test]
async fn test_add_same_product_increments_quantity() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let product = app.seed_product("Ring", dec!(100), 10).await;

    let (status, first) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "product_id": product, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "product_id": product, "quantity": 3 })),
        )
        .await;
    // Merged into the existing line, not a new document
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["quantity"], 5);

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_variants_are_distinct_lines() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let product = app
        .seed_product_full(
            "Sized Ring",
            dec!(100),
            10,
            4.0,
            true,
            vec!["Size 6".to_owned(), "Size 7".to_owned()],
        )
        .await;

    for variant in ["Size 6", "Size 7"] {
        let (status, _) = app
            .request(
                "POST",
                "/api/cart/items",
                Some(&token),
                Some(json!({ "product_id": product, "variant": variant })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert_eq!(cart.as_array().unwrap().len(), 2);

    // Unknown variant is rejected
    let (status, _) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "product_id": product, "variant": "Size 99" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A variant product requires a variant selection
    let (status, _) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "product_id": product })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_remove_item() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let product = app.seed_product("Ring", dec!(100), 10).await;

    let (_, item) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "product_id": product })),
        )
        .await;
    let item_id = item["id"].as_str().unwrap().to_owned();

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/cart/items/{item_id}"),
            Some(&token),
            Some(json!({ "quantity": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 4);

    // Zero is not a valid quantity; removal is explicit
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/cart/items/{item_id}"),
            Some(&token),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/cart/items/{item_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert!(cart.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_is_private_per_user() {
    let app = TestApp::new();
    let (ada, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let (bob, _) = app.register("bob@example.com", "passw0rd!", "Bob").await;
    let product = app.seed_product("Ring", dec!(100), 10).await;

    let (_, item) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(&ada),
            Some(json!({ "product_id": product })),
        )
        .await;
    let item_id = item["id"].as_str().unwrap().to_owned();

    // Bob sees an empty cart and cannot touch Ada's line
    let (_, cart) = app.request("GET", "/api/cart", Some(&bob), None).await;
    assert!(cart.as_array().unwrap().is_empty());

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/cart/items/{item_id}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Ada's cart is untouched
    let (_, cart) = app.request("GET", "/api/cart", Some(&ada), None).await;
    assert_eq!(cart.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_cart() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let a = app.seed_product("Ring A", dec!(100), 10).await;
    let b = app.seed_product("Ring B", dec!(100), 10).await;

    for product in [&a, &b] {
        app.request(
            "POST",
            "/api/cart/items",
            Some(&token),
            Some(json!({ "product_id": product })),
        )
        .await;
    }

    let (status, _) = app.request("DELETE", "/api/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert!(cart.as_array().unwrap().is_empty());
}
