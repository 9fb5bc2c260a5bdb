//! Registration, login, and profile round-trips.

use axum::http::StatusCode;
use serde_json::json;

use zinoshop_integration_tests::TestApp;

#[tokio::test]
async fn test_register_login_profile() {
    let app = TestApp::new();

    let (token, user_id) = app.register("Ada@Example.com", "passw0rd!", "Ada").await;

    // Profile reflects the normalized email and hides the password hash
    let (status, body) = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["role"], "customer");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());

    // Login works with any casing of the email
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ADA@example.COM", "password": "passw0rd!" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "ada@example.com", "password": "other1pass", "name": "Imposter" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_weak_passwords() {
    let app = TestApp::new();

    for password in ["short1", "nodigitshere", "8675309475"] {
        let (status, _) = app
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "email": "w@example.com", "password": password, "name": "W" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {password:?}");
    }
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let app = TestApp::new();
    app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong0pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Unknown account answers identically
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "wrong0pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new();

    let (status, _) = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/auth/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.request("GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_name() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, body) = app
        .request(
            "PUT",
            "/api/auth/me",
            Some(&token),
            Some(json!({ "name": "Countess Ada" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Countess Ada");
    // Email is immutable through the profile endpoint
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let app = TestApp::new();
    let (token, _) = app.register("ada@example.com", "passw0rd!", "Ada").await;

    let (status, _) = app.request("GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request("GET", "/api/orders/all", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
