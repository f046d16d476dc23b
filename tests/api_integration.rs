//! End-to-end API integration tests
//!
//! These tests drive the complete router (in-memory storage) through HTTP:
//! - User registration, login, logout and token refresh
//! - Company, IPO and document CRUD
//! - The paginated listing and the IPO detail endpoint
//! - JWT authentication on protected endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use ipo_listings_api::api::{router, AppState};
use ipo_listings_api::auth::blacklist::prune_once;
use ipo_listings_api::auth::jwt::{TokenService, TokenType};
use ipo_listings_api::auth::password::PasswordHasher;
use ipo_listings_api::infrastructure::repositories::InMemoryStore;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;
use tower::util::ServiceExt; // for oneshot

const TEST_SECRET: &str = "api-integration-test-secret";

/// Setup test application backed by a fresh in-memory store
fn setup_app() -> Router {
    let state = AppState::in_memory(
        InMemoryStore::new(),
        TokenService::new(TEST_SECRET, 300, 86_400),
        PasswordHasher::new(4),
    );
    router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn register(app: &Router, username: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/signup/",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "s3cure-pass",
            "password2": "s3cure-pass"
        })),
    )
    .await
}

async fn login(app: &Router, username: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": username, "password": "s3cure-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body
}

/// Registers and logs in a user, returning its access token
async fn access_token(app: &Router, username: &str) -> String {
    let (status, _) = register(app, username).await;
    assert_eq!(status, StatusCode::CREATED);
    login(app, username).await["access"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn create_company(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/companies/",
        Some(token),
        Some(json!({"company_name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create company failed: {}", body);
    body
}

async fn create_ipo(app: &Router, token: &str, company_id: i64, status: &str) -> Value {
    let (code, body) = send(
        app,
        "POST",
        "/ipos/",
        Some(token),
        Some(json!({
            "company": company_id,
            "status": status,
            "price_band": "95-100",
            "open_date": "2024-05-01",
            "close_date": "2024-05-03",
            "ipo_price": "100.00"
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "create ipo failed: {}", body);
    body
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_home_redirects_to_signup() {
    let app = setup_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/signup/");
}

#[tokio::test]
async fn test_register_user() {
    let app = setup_app();

    let (status, body) = register(&app, "alice").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"]["id"].is_i64());
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let app = setup_app();

    let (first, _) = register(&app, "bob").await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = register(&app, "bob").await;
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["username"].is_array());

    // The original account still logs in with its own password
    login(&app, "bob").await;
}

#[tokio::test]
async fn test_register_collects_all_field_errors() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/signup/",
        None,
        Some(json!({
            "username": "bad name!",
            "email": "not-an-email",
            "password": "short",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["username"].is_array());
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/signup/",
        None,
        Some(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "s3cure-pass",
            "password2": "other-pass"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["password2"].is_array());
}

#[tokio::test]
async fn test_register_and_login_flow() {
    let app = setup_app();
    register(&app, "dave").await;

    let body = login(&app, "dave").await;

    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
    assert_ne!(body["access"], body["refresh"]);
    assert_eq!(body["user"]["username"], "dave");
}

#[tokio::test]
async fn test_login_accepts_form_body() {
    let app = setup_app();
    register(&app, "erin").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=erin&password=s3cure-pass"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = setup_app();
    register(&app, "frank").await;

    let (wrong_password, body) = send(
        &app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": "frank", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (unknown_user, body) = send(
        &app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": "nobody", "password": "s3cure-pass"})),
    )
    .await;
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = setup_app();

    let (status, body) = send(&app, "POST", "/login/", None, Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["username"].is_array());
    assert!(body["fields"]["password"].is_array());
}

#[tokio::test]
async fn test_refresh_token_accepted_once() {
    let app = setup_app();
    register(&app, "grace").await;
    let tokens = login(&app, "grace").await;
    let refresh = tokens["refresh"].clone();

    let (first, rotated) = send(
        &app,
        "POST",
        "/token/refresh/",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(first, StatusCode::OK);
    assert!(rotated["access"].is_string());
    assert!(rotated["refresh"].is_string());
    assert_ne!(rotated["refresh"], refresh);

    let (second, body) = send(
        &app,
        "POST",
        "/token/refresh/",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(second, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token is invalid or expired");

    // The rotated token is still good
    let (third, _) = send(
        &app,
        "POST",
        "/token/refresh/",
        None,
        Some(json!({"refresh": rotated["refresh"]})),
    )
    .await;
    assert_eq!(third, StatusCode::OK);
}

#[tokio::test]
async fn test_rotated_refresh_token_stays_rejected_after_pruning() {
    // Short refresh lifetime so the token reaches its final second quickly
    let state = AppState::in_memory(
        InMemoryStore::new(),
        TokenService::new(TEST_SECRET, 300, 2),
        PasswordHasher::new(4),
    );
    let app = router(state.clone());
    register(&app, "grace2").await;
    let refresh = login(&app, "grace2").await["refresh"]
        .as_str()
        .unwrap()
        .to_string();
    let exp = state.tokens.verify(&refresh, TokenType::Refresh).unwrap().exp;

    let (rotated, _) = send(&app, "POST", "/token/refresh/", None, Some(json!({"refresh": refresh}))).await;
    assert_eq!(rotated, StatusCode::OK);

    // The token still verifies during its exp second; its blacklist entry must survive
    while chrono::Utc::now().timestamp() < exp {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    prune_once(state.blacklist.as_ref()).await.unwrap();

    let (reused, _) = send(&app, "POST", "/token/refresh/", None, Some(json!({"refresh": refresh}))).await;
    assert_eq!(reused, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = setup_app();
    register(&app, "heidi").await;
    let tokens = login(&app, "heidi").await;

    let (status, _) = send(
        &app,
        "POST",
        "/token/refresh/",
        None,
        Some(json!({"refresh": tokens["access"]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (missing, body) = send(&app, "POST", "/token/refresh/", None, Some(json!({}))).await;
    assert_eq!(missing, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["refresh"].is_array());
}

#[tokio::test]
async fn test_logout_blacklists_refresh_token() {
    let app = setup_app();
    register(&app, "ivan").await;
    let tokens = login(&app, "ivan").await;
    let access = tokens["access"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/logout/",
        Some(access),
        Some(json!({"refresh": tokens["refresh"]})),
    )
    .await;
    assert_eq!(status, StatusCode::RESET_CONTENT);
    assert_eq!(body["detail"], "Logout successful.");

    let (refresh, _) = send(
        &app,
        "POST",
        "/token/refresh/",
        None,
        Some(json!({"refresh": tokens["refresh"]})),
    )
    .await;
    assert!(refresh.is_client_error());

    // Logging out twice with the same token is rejected
    let (again, body) = send(
        &app,
        "POST",
        "/logout/",
        Some(access),
        Some(json!({"refresh": tokens["refresh"]})),
    )
    .await;
    assert_eq!(again, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token.");
}

#[tokio::test]
async fn test_logout_rejects_bad_and_foreign_tokens() {
    let app = setup_app();
    register(&app, "judy").await;
    register(&app, "mallory").await;
    let judy = login(&app, "judy").await;
    let mallory = login(&app, "mallory").await;
    let access = judy["access"].as_str().unwrap();

    let (garbage, body) = send(
        &app,
        "POST",
        "/logout/",
        Some(access),
        Some(json!({"refresh": "not.a.token"})),
    )
    .await;
    assert_eq!(garbage, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid token.");

    let (foreign, _) = send(
        &app,
        "POST",
        "/logout/",
        Some(access),
        Some(json!({"refresh": mallory["refresh"]})),
    )
    .await;
    assert_eq!(foreign, StatusCode::BAD_REQUEST);

    // Mallory's token was not revoked by the failed attempt
    let (still_valid, _) = send(
        &app,
        "POST",
        "/token/refresh/",
        None,
        Some(json!({"refresh": mallory["refresh"]})),
    )
    .await;
    assert_eq!(still_valid, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = setup_app();

    let (status, _) = send(
        &app,
        "POST",
        "/logout/",
        None,
        Some(json!({"refresh": "whatever"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_endpoints_require_auth() {
    let app = setup_app();

    for uri in ["/companies/", "/ipos/", "/documents/", "/ipo/", "/ipo/paginated/", "/ipo/1/"] {
        let (status, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "GET {}", uri);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/ipo/",
        None,
        Some(json!({"company_name": "Sneaky Ltd"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/companies/", Some("invalid_token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_a_bearer() {
    let app = setup_app();
    register(&app, "oscar").await;
    let tokens = login(&app, "oscar").await;

    let (status, _) = send(
        &app,
        "GET",
        "/companies/",
        tokens["refresh"].as_str(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_company_crud() {
    let app = setup_app();
    let token = access_token(&app, "peggy").await;

    let created = create_company(&app, &token, "Acme Industries").await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["ipos"], json!([]));

    let (status, fetched) = send(&app, "GET", &format!("/companies/{}/", id), Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["company_name"], "Acme Industries");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/companies/{}/", id),
        Some(token.as_str()),
        Some(json!({"company_name": "Acme Holdings", "company_logo": "https://acme.test/logo.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["company_logo"], "https://acme.test/logo.png");

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/companies/{}/", id),
        Some(token.as_str()),
        Some(json!({"company_name": "Acme Group"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["company_name"], "Acme Group");
    assert_eq!(patched["company_logo"], "https://acme.test/logo.png");

    let (status, list) = send(&app, "GET", "/companies/", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/companies/{}/", id), Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/companies/{}/", id), Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found.");
}

#[tokio::test]
async fn test_company_validation() {
    let app = setup_app();
    let token = access_token(&app, "quentin").await;
    create_company(&app, &token, "Unique Co").await;

    let (status, body) = send(
        &app,
        "POST",
        "/companies/",
        Some(token.as_str()),
        Some(json!({"company_name": "Unique Co"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["company_name"].is_array());

    let (status, body) = send(
        &app,
        "POST",
        "/companies/",
        Some(token.as_str()),
        Some(json!({"company_name": "  ", "company_logo": "ftp://nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["company_name"].is_array());
    assert!(body["fields"]["company_logo"].is_array());
}

#[tokio::test]
async fn test_nested_company_creation() {
    let app = setup_app();
    let token = access_token(&app, "rupert").await;

    let (status, body) = send(
        &app,
        "POST",
        "/companies/",
        Some(token.as_str()),
        Some(json!({
            "company_name": "Nested Corp",
            "ipos": [
                {
                    "status": "upcoming",
                    "price_band": "10-12",
                    "documents": [{"rhp_pdf": "rhp/nested.pdf", "drhp_pdf": "drhp/nested.pdf"}]
                },
                {"status": "listed", "listing_gain": "-4.50"}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let ipos = body["ipos"].as_array().unwrap();
    assert_eq!(ipos.len(), 2);
    assert_eq!(ipos[0]["company"], body["id"]);
    assert_eq!(ipos[0]["documents"][0]["rhp_pdf"], "rhp/nested.pdf");
    assert_eq!(ipos[1]["listing_gain"], "-4.50");
    assert_eq!(ipos[1]["documents"], json!([]));
}

#[tokio::test]
async fn test_nested_company_creation_is_all_or_nothing() {
    let app = setup_app();
    let token = access_token(&app, "sybil").await;

    let (status, body) = send(
        &app,
        "POST",
        "/companies/",
        Some(token.as_str()),
        Some(json!({
            "company_name": "Half Done Ltd",
            "ipos": [{"status": "upcoming"}, {"status": "bogus"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["ipos[1].status"].is_array());

    let (_, list) = send(&app, "GET", "/companies/", Some(token.as_str()), None).await;
    assert_eq!(list, json!([]));
    let (_, ipos) = send(&app, "GET", "/ipos/", Some(token.as_str()), None).await;
    assert_eq!(ipos, json!([]));
}

#[tokio::test]
async fn test_delete_company_with_ipos_is_rejected() {
    let app = setup_app();
    let token = access_token(&app, "trent").await;
    let company = create_company(&app, &token, "Busy Corp").await;
    let company_id = company["id"].as_i64().unwrap();
    let ipo = create_ipo(&app, &token, company_id, "upcoming").await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/companies/{}/", company_id),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, survived) = send(
        &app,
        "GET",
        &format!("/ipos/{}/", ipo["id"]),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(survived["company"], company_id);
}

#[tokio::test]
async fn test_company_ipos_sub_resource() {
    let app = setup_app();
    let token = access_token(&app, "uma").await;
    let first = create_company(&app, &token, "First Co").await["id"].as_i64().unwrap();
    let second = create_company(&app, &token, "Second Co").await["id"].as_i64().unwrap();
    create_ipo(&app, &token, first, "upcoming").await;
    create_ipo(&app, &token, first, "listed").await;
    create_ipo(&app, &token, second, "ongoing").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/companies/{}/ipos/", first),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ipos = body.as_array().unwrap();
    assert_eq!(ipos.len(), 2);
    assert!(ipos.iter().all(|ipo| ipo["company"] == first));

    let (status, _) = send(&app, "GET", "/companies/999/ipos/", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ipo_status_filter() {
    let app = setup_app();
    let token = access_token(&app, "victor").await;
    let company = create_company(&app, &token, "Filter Co").await["id"].as_i64().unwrap();
    create_ipo(&app, &token, company, "upcoming").await;
    create_ipo(&app, &token, company, "upcoming").await;
    create_ipo(&app, &token, company, "listed").await;

    let (status, upcoming) = send(&app, "GET", "/ipos/?status=upcoming", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = upcoming.as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    assert!(upcoming.iter().all(|ipo| ipo["status"] == "upcoming"));

    let (_, all) = send(&app, "GET", "/ipos/", Some(token.as_str()), None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, empty_filter) = send(&app, "GET", "/ipos/?status=", Some(token.as_str()), None).await;
    assert_eq!(empty_filter.as_array().unwrap().len(), 3);

    let (status, unknown) = send(&app, "GET", "/ipos/?status=withdrawn", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unknown, json!([]));

    // Matching is exact
    let (_, shouted) = send(&app, "GET", "/ipos/?status=LISTED", Some(token.as_str()), None).await;
    assert_eq!(shouted, json!([]));
}

#[tokio::test]
async fn test_ipo_crud_and_validation() {
    let app = setup_app();
    let token = access_token(&app, "wendy").await;
    let company = create_company(&app, &token, "Crud Co").await["id"].as_i64().unwrap();

    let ipo = create_ipo(&app, &token, company, "upcoming").await;
    let id = ipo["id"].as_i64().unwrap();
    assert_eq!(ipo["ipo_price"], "100.00");
    assert_eq!(ipo["open_date"], "2024-05-01");

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/ipos/{}/", id),
        Some(token.as_str()),
        Some(json!({"status": "ongoing"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", patched);
    assert_eq!(patched["status"], "ongoing");
    assert_eq!(patched["price_band"], "95-100");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/ipos/{}/", id),
        Some(token.as_str()),
        Some(json!({"company": company, "status": "listed", "open_date": "2024-05-03", "close_date": "2024-05-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["close_date"].is_array());

    let (status, body) = send(
        &app,
        "POST",
        "/ipos/",
        Some(token.as_str()),
        Some(json!({"company": 999, "status": "upcoming"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["company"].is_array());

    let (status, body) = send(&app, "POST", "/ipos/", Some(token.as_str()), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["company"].is_array());
    assert!(body["fields"]["status"].is_array());

    let (status, _) = send(&app, "DELETE", &format!("/ipos/{}/", id), Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/ipos/{}/", id), Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_one_per_ipo() {
    let app = setup_app();
    let token = access_token(&app, "xavier").await;
    let company = create_company(&app, &token, "Docs Co").await["id"].as_i64().unwrap();
    let ipo = create_ipo(&app, &token, company, "upcoming").await["id"].as_i64().unwrap();

    let (status, document) = send(
        &app,
        "POST",
        "/documents/",
        Some(token.as_str()),
        Some(json!({"ipo": ipo, "rhp_pdf": "rhp/docs.pdf"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["ipo"], ipo);
    assert_eq!(document["drhp_pdf"], Value::Null);

    let (status, body) = send(
        &app,
        "POST",
        "/documents/",
        Some(token.as_str()),
        Some(json!({"ipo": ipo, "drhp_pdf": "drhp/docs.pdf"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["ipo"].is_array());

    let (status, body) = send(
        &app,
        "POST",
        "/documents/",
        Some(token.as_str()),
        Some(json!({"ipo": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["ipo"].is_array());

    let (_, list) = send(&app, "GET", "/documents/", Some(token.as_str()), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_document_crud_and_cascade() {
    let app = setup_app();
    let token = access_token(&app, "yvonne").await;
    let company = create_company(&app, &token, "Cascade Co").await["id"].as_i64().unwrap();
    let ipo = create_ipo(&app, &token, company, "listed").await["id"].as_i64().unwrap();

    let (_, document) = send(
        &app,
        "POST",
        "/documents/",
        Some(token.as_str()),
        Some(json!({"ipo": ipo, "rhp_pdf": "rhp/a.pdf"})),
    )
    .await;
    let document_id = document["id"].as_i64().unwrap();

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/documents/{}/", document_id),
        Some(token.as_str()),
        Some(json!({"drhp_pdf": "drhp/a.pdf"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["rhp_pdf"], "rhp/a.pdf");
    assert_eq!(patched["drhp_pdf"], "drhp/a.pdf");

    let (_, with_document) = send(&app, "GET", &format!("/ipos/{}/", ipo), Some(token.as_str()), None).await;
    assert_eq!(with_document["documents"][0]["id"], document_id);

    let (status, _) = send(&app, "DELETE", &format!("/ipos/{}/", ipo), Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/documents/{}/", document_id),
        Some(token.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ipo_detail_missing_is_not_found_for_every_method() {
    let app = setup_app();
    let token = access_token(&app, "zoe").await;

    for method in ["GET", "PUT", "DELETE"] {
        let body = (method == "PUT").then(|| json!({"status": "listed"}));
        let (status, _) = send(&app, method, "/ipo/424242/", Some(token.as_str()), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} /ipo/424242/", method);
    }
}

#[tokio::test]
async fn test_ipo_detail_flow() {
    let app = setup_app();
    let token = access_token(&app, "amir").await;
    let company = create_company(&app, &token, "Detail Co").await["id"].as_i64().unwrap();
    let ipo = create_ipo(&app, &token, company, "upcoming").await["id"].as_i64().unwrap();
    let uri = format!("/ipo/{}/", ipo);

    let (status, body) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "upcoming");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(token.as_str()),
        Some(json!({"company": company, "status": "listed", "listing_price": "120.50"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "listed");
    assert_eq!(body["listing_price"], "120.50");
    assert_eq!(body["price_band"], Value::Null);

    let (status, body) = send(&app, "PUT", &uri, Some(token.as_str()), Some(json!({"company": company}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["status"].is_array());

    let (status, _) = send(&app, "DELETE", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_paginated_listing_covers_every_company_once() {
    let app = setup_app();
    let token = access_token(&app, "bianca").await;
    for n in 0..12 {
        create_company(&app, &token, &format!("Company {:02}", n)).await;
    }

    let mut seen = HashSet::new();
    let mut uri = "/ipo/".to_string();
    let mut pages = 0;
    loop {
        let (status, page) = send(&app, "GET", &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["count"], 12);
        pages += 1;

        let results = page["results"].as_array().unwrap();
        if page["next"].is_null() {
            assert_eq!(results.len(), 2);
        } else {
            assert_eq!(results.len(), 5);
        }
        for company in results {
            assert!(seen.insert(company["id"].as_i64().unwrap()), "duplicate company");
        }

        match page["next"].as_str() {
            Some(next) => {
                // Links are absolute; follow the path and query only
                let path = next.splitn(4, '/').nth(3).unwrap();
                uri = format!("/{}", path);
            }
            None => break,
        }
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 12);
}

#[tokio::test]
async fn test_paginated_links_and_invalid_pages() {
    let app = setup_app();
    let token = access_token(&app, "cyrus").await;
    for n in 0..6 {
        create_company(&app, &token, &format!("Linked {}", n)).await;
    }

    let (status, last) = send(&app, "GET", "/ipo/paginated/?page=last", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(last["results"].as_array().unwrap().len(), 1);
    assert_eq!(last["next"], Value::Null);
    let previous = last["previous"].as_str().unwrap();
    assert!(previous.ends_with("/ipo/paginated/"), "{}", previous);

    for page in ["0", "3", "abc"] {
        let (status, body) = send(
            &app,
            "GET",
            &format!("/ipo/?page={}", page),
            Some(token.as_str()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "page {}", page);
        assert_eq!(body["error"], "Invalid page.");
    }
}

#[tokio::test]
async fn test_paginated_empty_store_has_first_page() {
    let app = setup_app();
    let token = access_token(&app, "dora").await;

    let (status, body) = send(&app, "GET", "/ipo/", Some(token.as_str()), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"count": 0, "next": null, "previous": null, "results": []})
    );
}

#[tokio::test]
async fn test_paginated_create() {
    let app = setup_app();
    let token = access_token(&app, "emil").await;

    let (status, body) = send(
        &app,
        "POST",
        "/ipo/",
        Some(token.as_str()),
        Some(json!({
            "company_name": "Listing Co",
            "company_logo": "https://listing.test/logo.svg",
            "ipos": [{"status": "ongoing", "issue_type": "Book Built"}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ipos"][0]["issue_type"], "Book Built");

    let (status, body) = send(
        &app,
        "POST",
        "/ipo/paginated/",
        Some(token.as_str()),
        Some(json!({"company_logo": "https://listing.test/logo.svg"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["company_name"].is_array());
}
