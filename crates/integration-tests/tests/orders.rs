//! Checkout and order lifecycle end to end.

use axum::http::StatusCode;
use rust_decimal::dec;
use serde_json::{Value, json};

use zinoshop_api::db::DocumentStore;
use zinoshop_integration_tests::TestApp;

async fn add_to_cart(app: &TestApp, token: &str, product: &str, quantity: u32) {
    let (status, body) = app
        .request(
            "POST",
            "/api/cart/items",
            Some(token),
            Some(json!({ "product_id": product, "quantity": quantity })),
        )
        .await;
    assert!(status.is_success(), "add to cart failed: {body}");
}

async fn checkout(app: &TestApp, token: &str) -> (StatusCode, Value) {
    app.request(
        "POST",
        "/api/orders/checkout",
        Some(token),
        Some(json!({
            "payment_method": "cash_on_delivery",
            "shipping_address": TestApp::shipping_address(),
        })),
    )
    .await
}

#[tokio::test]
async fn test_checkout_totals_and_snapshot() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let ring = app.seed_product("Ring", dec!(40), 10).await;
    let pendant = app.seed_product("Pendant", dec!(25.50), 10).await;

    add_to_cart(&app, &token, &ring, 2).await;
    add_to_cart(&app, &token, &pendant, 1).await;

    let (status, body) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::CREATED, "checkout failed: {body}");

    // subtotal = 2*40 + 25.50 = 105.50, below the 150 free-shipping threshold
    let order = &body["order"];
    assert_eq!(order["subtotal"].as_f64().unwrap(), 105.50);
    assert_eq!(order["shipping"].as_f64().unwrap(), 12.0);
    assert_eq!(order["total"].as_f64().unwrap(), 117.50);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "pending");
    assert_eq!(order["item_count"], 3);
    assert_eq!(order["currency"], "USD");

    // Line items are snapshots with live prices
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let ring_line = items.iter().find(|i| i["name"] == "Ring").unwrap();
    assert_eq!(ring_line["price"].as_f64().unwrap(), 40.0);
    assert_eq!(ring_line["line_total"].as_f64().unwrap(), 80.0);

    // Cart was cleared and stock decremented
    let (_, cart) = app.request("GET", "/api/cart", Some(&token), None).await;
    assert!(cart.as_array().unwrap().is_empty());

    let doc = app.store().get("products", &ring).await.unwrap().unwrap();
    assert_eq!(doc.data["stock"], 8);
}

#[tokio::test]
async fn test_checkout_ignores_stale_cart_prices() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let ring = app.seed_product("Ring", dec!(40), 10).await;

    add_to_cart(&app, &token, &ring, 1).await;

    // Price changes after the item went into the cart
    app.store()
        .update("products", &ring, json!({ "price": 55.0 }))
        .await
        .unwrap();

    let (status, body) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["subtotal"].as_f64().unwrap(), 55.0);
}

#[tokio::test]
async fn test_checkout_empty_cart_and_stock_guard() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, _) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ring = app.seed_product("Ring", dec!(40), 1).await;
    add_to_cart(&app, &token, &ring, 1).await;
    app.store()
        .update("products", &ring, json!({ "stock": 0 }))
        .await
        .unwrap();

    let (status, _) = checkout(&app, &token).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_card_checkout_rejected_without_provider() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let ring = app.seed_product("Ring", dec!(40), 10).await;
    add_to_cart(&app, &token, &ring, 1).await;

    let (status, _) = app
        .request(
            "POST",
            "/api/orders/checkout",
            Some(&token),
            Some(json!({
                "payment_method": "card",
                "shipping_address": TestApp::shipping_address(),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_visibility_and_detail() {
    let app = TestApp::new();
    let (ada, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let (bob, _) = app.register("bob@example.com", "passw0rd!", "Bob").await;
    let ring = app.seed_product("Ring", dec!(40), 10).await;

    add_to_cart(&app, &ada, &ring, 1).await;
    let (_, body) = checkout(&app, &ada).await;
    let order_id = body["order"]["id"].as_str().unwrap().to_owned();

    // Owner sees order and items
    let (status, detail) = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&ada), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);

    // Another customer gets 404, not 403, so order ids do not leak
    let (status, _) = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Owner's order list contains it
    let (_, list) = app.request("GET", "/api/orders", Some(&ada), None).await;
    assert_eq!(list["items"].as_array().unwrap().len(), 1);

    let (_, list) = app.request("GET", "/api/orders", Some(&bob), None).await;
    assert!(list["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_status_flow() {
    let app = TestApp::new();
    let (customer, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;
    let ring = app.seed_product("Ring", dec!(40), 10).await;

    add_to_cart(&app, &customer, &ring, 1).await;
    let (_, body) = checkout(&app, &customer).await;
    let order_id = body["order"]["id"].as_str().unwrap().to_owned();

    // Customers cannot change status
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/orders/{order_id}/status"),
            Some(&customer),
            Some(json!({ "status": "processing" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Illegal jump is rejected
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/orders/{order_id}/status"),
            Some(&admin),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for next in ["processing", "shipped", "delivered"] {
        let (status, body) = app
            .request(
                "PUT",
                &format!("/api/orders/{order_id}/status"),
                Some(&admin),
                Some(json!({ "status": next })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], next);
    }

    // Delivered cash-on-delivery order is paid
    let (_, detail) = app
        .request("GET", &format!("/api/orders/{order_id}"), Some(&admin), None)
        .await;
    assert_eq!(detail["order"]["payment_status"], "paid");

    // Admin listing filters by status
    let (_, list) = app
        .request("GET", "/api/orders/all?status=delivered", Some(&admin), None)
        .await;
    assert_eq!(list["items"].as_array().unwrap().len(), 1);

    let (_, list) = app
        .request("GET", "/api/orders/all?status=pending", Some(&admin), None)
        .await;
    assert!(list["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancellation_restocks() {
    let app = TestApp::new();
    let (customer, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;
    let ring = app.seed_product("Ring", dec!(40), 5).await;

    add_to_cart(&app, &customer, &ring, 3).await;
    let (_, body) = checkout(&app, &customer).await;
    let order_id = body["order"]["id"].as_str().unwrap().to_owned();

    let doc = app.store().get("products", &ring).await.unwrap().unwrap();
    assert_eq!(doc.data["stock"], 2);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/orders/{order_id}/status"),
            Some(&admin),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let doc = app.store().get("products", &ring).await.unwrap().unwrap();
    assert_eq!(doc.data["stock"], 5);
}
