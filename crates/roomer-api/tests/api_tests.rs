//! API integration tests
//!
//! Runs the full router against in-memory stores and recording gateways, so
//! every test exercises the real handler chain: validation order, the
//! authorization gate, store writes, and media-host cleanup.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use roomer_api::stores::AccountStore;
use roomer_api::testing::{test_app, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(create_json_request(method, uri, body))
        .await
        .unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

/// Sign up a fresh account; returns (token, account id).
async fn sign_up(app: &TestApp, username: &str) -> (String, String) {
    let email = format!("{username}@example.com");
    let (status, body) = send(
        &app.router,
        "POST",
        "/user/sign_up",
        Some(json!({
            "email": email,
            "username": username,
            "name": "Test Host",
            "description": "Rents out places",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sign up failed: {body}");

    let account = app
        .state
        .accounts
        .find_by_email(&email)
        .await
        .unwrap()
        .expect("account persisted");

    (body["token"].as_str().unwrap().to_string(), account.id.to_string())
}

/// Publish a listing; returns its id.
async fn publish_room(
    app: &TestApp,
    token: &str,
    title: &str,
    price: f64,
    location: [f64; 2],
) -> String {
    let (status, body) = send(
        &app.router,
        "POST",
        "/room/publish",
        Some(json!({
            "token": token,
            "title": title,
            "description": "A fine place to stay",
            "price": price,
            "location": location,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "publish failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// "hello" as base64, a stand-in for image bytes.
const PICTURE_B64: &str = "aGVsbG8=";

async fn upload_room_picture(app: &TestApp, token: &str, room_id: &str) -> (StatusCode, Value) {
    send(
        &app.router,
        "PUT",
        &format!("/room/upload_picture/{room_id}"),
        Some(json!({ "token": token, "picture": PICTURE_B64 })),
    )
    .await
}

// =============================================================================
// Health and fallback
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let (status, body) = send(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unmatched_route_returns_json_404() {
    let app = test_app();

    let (status, body) = send(&app.router, "GET", "/definitely/not/a/route", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Page not found");
}

// =============================================================================
// Sign-up and login
// =============================================================================

#[tokio::test]
async fn test_sign_up_creates_retrievable_account() {
    let app = test_app();
    let (_token, id) = sign_up(&app, "marcel").await;

    let (status, body) = send(&app.router, "GET", &format!("/user/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["username"], "marcel");
    assert_eq!(body["rooms"].as_array().unwrap().len(), 0);
    // Public view never carries email or credential material
    assert!(body.get("email").is_none());
}

#[tokio::test]
async fn test_log_in_verifies_only_the_current_password() {
    let app = test_app();
    sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/log_in",
        Some(json!({ "email": "marcel@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["account"]["username"], "marcel");

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/log_in",
        Some(json!({ "email": "marcel@example.com", "password": "hunter23" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wrong password");

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/log_in",
        Some(json!({ "email": "nobody@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Email not found");
}

#[tokio::test]
async fn test_sign_up_rejects_bad_input() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/sign_up",
        Some(json!({ "email": "a@b.c" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing parameters");

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/sign_up",
        Some(json!({
            "email": "not-an-email",
            "username": "x",
            "name": "X",
            "description": "x",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email: incorrect format");

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/sign_up",
        Some(json!({
            "email": "short@example.com",
            "username": "short",
            "name": "X",
            "description": "x",
            "password": "1234",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must contain at least 5 characters");
}

#[tokio::test]
async fn test_sign_up_enforces_unique_email_and_username() {
    let app = test_app();
    sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/sign_up",
        Some(json!({
            "email": "marcel@example.com",
            "username": "different",
            "name": "X",
            "description": "x",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already used");

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/sign_up",
        Some(json!({
            "email": "other@example.com",
            "username": "marcel",
            "name": "X",
            "description": "x",
            "password": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already used");
}

// =============================================================================
// Password lifecycle
// =============================================================================

#[tokio::test]
async fn test_password_change_rotates_credentials_and_token() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "PUT",
        "/user/update_password",
        Some(json!({
            "token": token,
            "previousPassword": "hunter22",
            "newPassword": "hunter23",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password successfully modified");
    let new_token = body["token"].as_str().unwrap().to_string();
    assert_ne!(new_token, token);

    // Old password no longer verifies, new one does
    let (status, _) = send(
        &app.router,
        "POST",
        "/user/log_in",
        Some(json!({ "email": "marcel@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "POST",
        "/user/log_in",
        Some(json!({ "email": "marcel@example.com", "password": "hunter23" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Outstanding sessions are invalidated; the returned token works
    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id}"),
        Some(json!({ "token": token, "name": "New Name" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id}"),
        Some(json!({ "token": new_token, "name": "New Name" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_change_guards() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "PUT",
        "/user/update_password",
        Some(json!({
            "token": token,
            "previousPassword": "wrong-old",
            "newPassword": "hunter23",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Wrong previous password");

    let (status, body) = send(
        &app.router,
        "PUT",
        "/user/update_password",
        Some(json!({
            "token": token,
            "previousPassword": "hunter22",
            "newPassword": "hunter22",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"],
        "Previous password and new password must be different"
    );

    let (status, _) = send(
        &app.router,
        "PUT",
        "/user/update_password",
        Some(json!({
            "token": token,
            "previousPassword": "hunter22",
            "newPassword": "123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recover_password_sends_link_with_token() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/recover_password",
        Some(json!({ "email": "marcel@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "A link has been sent to the user");

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "marcel@example.com");
    assert!(sent[0].1.contains(&token));

    let (status, body) = send(
        &app.router,
        "POST",
        "/user/recover_password",
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(&app.router, "POST", "/user/recover_password", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing email");
}

// =============================================================================
// Profile updates
// =============================================================================

#[tokio::test]
async fn test_update_user_applies_merge_patch() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id}"),
        Some(json!({ "token": token, "name": "Marcel P.", "description": "Superhost" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["name"], "Marcel P.");
    assert_eq!(body["account"]["description"], "Superhost");
    assert_eq!(body["account"]["username"], "marcel");
    assert_eq!(body["email"], "marcel@example.com");
}

#[tokio::test]
async fn test_update_user_rejects_conflicts_and_foreign_tokens() {
    let app = test_app();
    let (token_a, id_a) = sign_up(&app, "marcel").await;
    let (token_b, _) = sign_up(&app, "jeanne").await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id_a}"),
        Some(json!({ "token": token_a, "email": "jeanne@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already used");

    // Another account's valid token is not ownership
    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id_a}"),
        Some(json!({ "token": token_b, "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User unauthorized");

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id_a}"),
        Some(json!({ "token": "garbage", "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/user/update/{id_a}"),
        Some(json!({ "token": token_a })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing parameters");
}

// =============================================================================
// Listing creation and validation
// =============================================================================

#[tokio::test]
async fn test_publish_rejects_invalid_fields_before_persisting() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;

    let bad_bodies = [
        json!({ "token": token, "title": "Loft", "price": 90.0 }),
        json!({ "token": token, "title": "Loft", "description": "Nice", "price": 0.0,
                "location": [10.0, 10.0] }),
        json!({ "token": token, "title": "Loft", "description": "Nice", "price": -5.0,
                "location": [10.0, 10.0] }),
        json!({ "token": token, "title": "   ", "description": "Nice", "price": 90.0,
                "location": [10.0, 10.0] }),
        json!({ "token": token, "title": "Loft", "description": "", "price": 90.0,
                "location": [10.0, 10.0] }),
        json!({ "token": token, "title": "Loft", "description": "Nice", "price": 90.0,
                "location": [10.0] }),
    ];
    for body in bad_bodies {
        let (status, _) = send(&app.router, "POST", "/room/publish", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // Nothing was persisted along the way
    let (status, body) = send(&app.router, "GET", "/rooms", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_publish_records_room_on_owner() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;

    let room_id = publish_room(&app, &token, "Sunny loft", 90.0, [10.0, 10.0]).await;

    let (status, body) = send(&app.router, "GET", &format!("/user/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"].as_array().unwrap(), &vec![json!(room_id)]);

    let (status, body) = send(&app.router, "GET", &format!("/room/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Sunny loft");
    assert_eq!(body["owner"]["id"], id);
    assert_eq!(body["owner"]["account"]["username"], "marcel");
}

#[tokio::test]
async fn test_publish_requires_authentication() {
    let app = test_app();

    let (status, _) = send(
        &app.router,
        "POST",
        "/room/publish",
        Some(json!({
            "token": "unknown-token",
            "title": "Loft",
            "description": "Nice",
            "price": 90.0,
            "location": [10.0, 10.0],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Listing search: filter, sort, paginate
// =============================================================================

async fn seed_twelve_rooms(app: &TestApp) -> String {
    let (token, _) = sign_up(app, "seeder").await;
    for i in 1..=12 {
        publish_room(app, &token, &format!("Room {i}"), 10.0 * i as f64, [10.0, 10.0]).await;
    }
    token
}

#[tokio::test]
async fn test_rooms_price_range_filter() {
    let app = test_app();
    seed_twelve_rooms(&app).await;

    let (status, body) = send(&app.router, "GET", "/rooms?priceMin=100&priceMax=200", None).await;

    assert_eq!(status, StatusCode::OK);
    let rooms = body.as_array().unwrap();
    assert_eq!(rooms.len(), 3); // 100, 110, 120
    for room in rooms {
        let price = room["price"].as_f64().unwrap();
        assert!((100.0..=200.0).contains(&price));
    }
}

#[tokio::test]
async fn test_rooms_title_filter_is_case_insensitive() {
    let app = test_app();
    seed_twelve_rooms(&app).await;

    let (status, body) = send(&app.router, "GET", "/rooms?title=room%201", None).await;

    assert_eq!(status, StatusCode::OK);
    // "Room 1", "Room 10", "Room 11", "Room 12"
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_rooms_sort_by_price() {
    let app = test_app();
    seed_twelve_rooms(&app).await;

    let (status, body) = send(&app.router, "GET", "/rooms?sort=price-asc", None).await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices.len(), 12);
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));

    let (status, body) = send(&app.router, "GET", "/rooms?sort=price-desc", None).await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_f64().unwrap())
        .collect();
    assert!(prices.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_rooms_second_page_holds_items_six_to_ten() {
    let app = test_app();
    seed_twelve_rooms(&app).await;

    let (status, body) = send(&app.router, "GET", "/rooms?sort=price-asc&page=2", None).await;

    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![60.0, 70.0, 80.0, 90.0, 100.0]);
}

#[tokio::test]
async fn test_rooms_out_of_range_page_falls_back_to_full_set() {
    let app = test_app();
    seed_twelve_rooms(&app).await;

    for page in ["0", "4", "99", "-1", "abc"] {
        let (status, body) = send(
            &app.router,
            "GET",
            &format!("/rooms?sort=price-asc&page={page}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 12, "page={page}");
    }
}

#[tokio::test]
async fn test_rooms_unfiltered_returns_all_when_fifteen_or_fewer() {
    let app = test_app();
    let (token, _) = sign_up(&app, "seeder").await;
    for i in 1..=3 {
        publish_room(&app, &token, &format!("Room {i}"), 10.0 * i as f64, [10.0, 10.0]).await;
    }

    let (status, body) = send(&app.router, "GET", "/rooms", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_rooms_unfiltered_samples_fifteen_from_larger_collections() {
    let app = test_app();
    let (token, _) = sign_up(&app, "seeder").await;
    for i in 1..=20 {
        publish_room(&app, &token, &format!("Room {i}"), 10.0 * i as f64, [10.0, 10.0]).await;
    }

    let (status, body) = send(&app.router, "GET", "/rooms", None).await;

    assert_eq!(status, StatusCode::OK);
    let rooms = body.as_array().unwrap();
    assert_eq!(rooms.len(), 15);

    let mut ids: Vec<&str> = rooms.iter().map(|r| r["id"].as_str().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 15, "sampling must be without replacement");
}

// =============================================================================
// Proximity search
// =============================================================================

#[tokio::test]
async fn test_around_rejects_missing_or_non_positive_coordinates() {
    let app = test_app();

    let (status, body) = send(&app.router, "GET", "/rooms/around", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing location");

    for query in [
        "latitude=0&longitude=10",
        "latitude=10&longitude=0",
        "latitude=-1&longitude=10",
        "latitude=abc&longitude=10",
    ] {
        let (status, body) = send(&app.router, "GET", &format!("/rooms/around?{query}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query={query}");
        assert_eq!(body["error"], "Wrong latitude/longitude");
    }
}

#[tokio::test]
async fn test_around_returns_only_rooms_within_radius_nearest_first() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;
    publish_room(&app, &token, "Close", 50.0, [10.0, 10.05]).await;
    publish_room(&app, &token, "Closer", 50.0, [10.0, 10.01]).await;
    publish_room(&app, &token, "Far", 50.0, [20.0, 20.0]).await;

    let (status, body) = send(
        &app.router,
        "GET",
        "/rooms/around?latitude=10&longitude=10",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Closer", "Close"]);
}

// =============================================================================
// Listing updates and authorization
// =============================================================================

#[tokio::test]
async fn test_update_room_with_foreign_token_leaves_room_unmodified() {
    let app = test_app();
    let (token_a, _) = sign_up(&app, "marcel").await;
    let (token_b, _) = sign_up(&app, "jeanne").await;
    let room_id = publish_room(&app, &token_a, "Sunny loft", 90.0, [10.0, 10.0]).await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/room/update/{room_id}"),
        Some(json!({ "token": token_b, "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "User unauthorized");

    let (_, body) = send(&app.router, "GET", &format!("/room/{room_id}"), None).await;
    assert_eq!(body["title"], "Sunny loft");
}

#[tokio::test]
async fn test_update_room_applies_merge_patch() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;
    let room_id = publish_room(&app, &token, "Sunny loft", 90.0, [10.0, 10.0]).await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/room/update/{room_id}"),
        Some(json!({ "token": token, "price": 120.0, "location": [11.0, 11.0] })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Sunny loft");
    assert_eq!(body["price"], 120.0);
    assert_eq!(body["location"], json!([11.0, 11.0]));

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/room/update/{room_id}"),
        Some(json!({ "token": token, "price": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Price must be greater than zero");

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/room/update/{room_id}"),
        Some(json!({ "token": token, "location": [1.0, 2.0, 3.0] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wrong parameters lat/lng");
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;
    let missing = "550e8400-e29b-41d4-a716-446655440000";

    let (status, body) = send(&app.router, "GET", &format!("/user/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send(&app.router, "GET", &format!("/room/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Room not found");

    let (status, body) = send(&app.router, "GET", "/user/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wrong id");

    let (status, body) = send(
        &app.router,
        "PUT",
        "/room/update/not-a-uuid",
        Some(json!({ "token": token, "title": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Wrong id");
}

// =============================================================================
// Pictures
// =============================================================================

#[tokio::test]
async fn test_room_accumulates_at_most_five_pictures() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;
    let room_id = publish_room(&app, &token, "Sunny loft", 90.0, [10.0, 10.0]).await;

    for i in 1..=5 {
        let (status, body) = upload_room_picture(&app, &token, &room_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pictures"].as_array().unwrap().len(), i);
    }

    let (status, body) = upload_room_picture(&app, &token, &room_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Can't add more than 5 pictures");

    let (_, body) = send(&app.router, "GET", &format!("/room/{room_id}"), None).await;
    assert_eq!(body["pictures"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_delete_room_picture_requires_exact_id() {
    let app = test_app();
    let (token, _) = sign_up(&app, "marcel").await;
    let room_id = publish_room(&app, &token, "Sunny loft", 90.0, [10.0, 10.0]).await;
    upload_room_picture(&app, &token, &room_id).await;
    upload_room_picture(&app, &token, &room_id).await;

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/room/delete_picture/{room_id}"),
        Some(json!({ "token": token, "picture_id": "no-such-asset" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Picture not found");

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/room/delete_picture/{room_id}"),
        Some(json!({ "token": token, "picture_id": "asset-0" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let remaining = body["pictures"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["public_id"], "asset-1");
    assert_eq!(app.media.removed(), vec!["asset-0".to_string()]);
}

#[tokio::test]
async fn test_account_picture_replace_and_delete() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/user/upload_picture/{id}"),
        Some(json!({ "token": token, "picture": PICTURE_B64 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["picture"]["public_id"], "asset-0");

    // A replacement removes the previous asset from the host first
    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/user/upload_picture/{id}"),
        Some(json!({ "token": token, "picture": PICTURE_B64 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["picture"]["public_id"], "asset-1");
    assert_eq!(app.media.removed(), vec!["asset-0".to_string()]);

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/user/delete_picture/{id}"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["account"].get("picture").is_none());

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/user/delete_picture/{id}"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Picture not found");
}

// =============================================================================
// Cascading deletes
// =============================================================================

#[tokio::test]
async fn test_delete_room_removes_assets_and_owner_reference() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;
    let room_id = publish_room(&app, &token, "Sunny loft", 90.0, [10.0, 10.0]).await;
    upload_room_picture(&app, &token, &room_id).await;
    upload_room_picture(&app, &token, &room_id).await;

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/room/delete/{room_id}"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Room deleted");

    // One remove call per attached picture
    assert_eq!(
        app.media.removed(),
        vec!["asset-0".to_string(), "asset-1".to_string()]
    );

    let (status, _) = send(&app.router, "GET", &format!("/room/{room_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app.router, "GET", &format!("/user/rooms/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "This user has no room");
}

#[tokio::test]
async fn test_delete_user_cascades_to_listings_and_assets() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;
    let room_a = publish_room(&app, &token, "Loft A", 90.0, [10.0, 10.0]).await;
    let room_b = publish_room(&app, &token, "Loft B", 70.0, [10.0, 10.0]).await;
    upload_room_picture(&app, &token, &room_a).await;
    upload_room_picture(&app, &token, &room_b).await;
    send(
        &app.router,
        "PUT",
        &format!("/user/upload_picture/{id}"),
        Some(json!({ "token": token, "picture": PICTURE_B64 })),
    )
    .await;

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/user/delete/{id}"),
        Some(json!({ "token": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted");

    assert_eq!(app.media.removed().len(), 3);

    for uri in [
        format!("/user/{id}"),
        format!("/room/{room_a}"),
        format!("/room/{room_b}"),
    ] {
        let (status, _) = send(&app.router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}

// =============================================================================
// Owned-listings endpoint
// =============================================================================

#[tokio::test]
async fn test_user_rooms_lists_owned_listings() {
    let app = test_app();
    let (token, id) = sign_up(&app, "marcel").await;
    publish_room(&app, &token, "Loft A", 90.0, [10.0, 10.0]).await;
    publish_room(&app, &token, "Loft B", 70.0, [10.0, 10.0]).await;

    let (status, body) = send(&app.router, "GET", &format!("/user/rooms/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Loft A", "Loft B"]);
}

#[tokio::test]
async fn test_user_rooms_on_account_without_rooms() {
    let app = test_app();
    let (_, id) = sign_up(&app, "marcel").await;

    let (status, body) = send(&app.router, "GET", &format!("/user/rooms/{id}"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "This user has no room");
}
