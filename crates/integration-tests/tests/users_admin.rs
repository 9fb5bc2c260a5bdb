//! Admin user management: listing, role changes, self-protection.

use axum::http::StatusCode;
use serde_json::json;

use zinoshop_integration_tests::TestApp;

#[tokio::test]
async fn test_list_and_get_users() {
    let app = TestApp::new();
    let (admin, _) = app.register_admin("admin@example.com", "adminpass1").await;
    let (_, ada_id) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, body) = app.request("GET", "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    // Password hashes never leave the API
    for user in body["items"].as_array().unwrap() {
        assert!(user.get("password_hash").is_none());
    }

    let (status, user) = app
        .request("GET", &format!("/api/users/{ada_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["role"], "customer");
}

#[tokio::test]
async fn test_promote_and_demote() {
    let app = TestApp::new();
    let (admin, admin_id) = app.register_admin("admin@example.com", "adminpass1").await;
    let (_, ada_id) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, user) = app
        .request(
            "PUT",
            &format!("/api/users/{ada_id}/role"),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "admin");

    // The acting admin cannot demote themselves
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/users/{admin_id}/role"),
            Some(&admin),
            Some(json!({ "role": "customer" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_user_but_not_self() {
    let app = TestApp::new();
    let (admin, admin_id) = app.register_admin("admin@example.com", "adminpass1").await;
    let (_, ada_id) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, _) = app
        .request("DELETE", &format!("/api/users/{admin_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request("DELETE", &format!("/api/users/{ada_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request("GET", &format!("/api/users/{ada_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_requires_admin() {
    let app = TestApp::new();
    let (customer, id) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, _) = app.request("GET", "/api/users", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/users/{id}/role"),
            Some(&customer),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
