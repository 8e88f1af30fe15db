//! Cart and checkout through the HTTP routes.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use soundsync_core::Role;
use soundsync_integration_tests::TestApp;

const ADMIN: &str = "boss@example.com";

/// App with one admin signed in and two tracks: #1 at $10, #2 at $4.99.
async fn app_with_tracks() -> TestApp {
    let app = TestApp::new().unwrap();
    app.grant(ADMIN, Role::Admin).unwrap();
    app.sign_in("Boss", ADMIN).await.unwrap();
    assert_eq!(
        app.create_track("Beat A", "$10", false).await.unwrap().status,
        StatusCode::CREATED
    );
    assert_eq!(
        app.create_track("Beat B", "4.99", false).await.unwrap().status,
        StatusCode::CREATED
    );
    app
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_adding_twice_merges_quantity() {
    let app = app_with_tracks().await;

    let first = app.post_form("/cart/add", "track_id=1").await.unwrap();
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("hx-trigger"), Some("cart-updated"));
    assert!(first.body.contains(r#"data-count="1""#));

    let second = app.post_form("/cart/add", "track_id=1").await.unwrap();
    assert!(second.body.contains(r#"data-count="2""#));

    let page = app.get("/cart").await.unwrap();
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body.matches(r#"data-track-id="1""#).count(), 1);
    assert!(page.body.contains("$20.00"));
}

#[tokio::test]
async fn test_badge_follows_every_change() {
    let app = app_with_tracks().await;

    app.post_form("/cart/add", "track_id=1").await.unwrap();
    app.post_form("/cart/add", "track_id=2").await.unwrap();
    let badge = app.get("/cart/count").await.unwrap();
    assert!(badge.body.contains(r#"data-count="2""#));

    app.post_form("/cart/update", "track_id=2&quantity=3").await.unwrap();
    let badge = app.get("/cart/count").await.unwrap();
    assert!(badge.body.contains(r#"data-count="4""#));
}

#[tokio::test]
async fn test_remove_leaves_other_lines() {
    let app = app_with_tracks().await;
    app.post_form("/cart/add", "track_id=1").await.unwrap();
    app.post_form("/cart/add", "track_id=2").await.unwrap();
    app.post_form("/cart/add", "track_id=2").await.unwrap();

    let fragment = app.post_form("/cart/remove", "track_id=1").await.unwrap();
    assert_eq!(fragment.status, StatusCode::OK);
    assert!(!fragment.body.contains(r#"data-track-id="1""#));
    assert!(fragment.body.contains(r#"data-track-id="2""#));
    assert!(fragment.body.contains("$9.98"));
}

#[tokio::test]
async fn test_unknown_and_out_of_stock_tracks() {
    let app = app_with_tracks().await;

    let unknown = app.post_form("/cart/add", "track_id=99").await.unwrap();
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    app.post_empty("/admin/tracks/2/stock").await.unwrap();
    let sold_out = app.post_form("/cart/add", "track_id=2").await.unwrap();
    assert_eq!(sold_out.status, StatusCode::CONFLICT);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_snapshots_and_clears_cart() {
    let app = app_with_tracks().await;
    app.post_form("/cart/add", "track_id=1").await.unwrap();
    app.post_form("/cart/add", "track_id=1").await.unwrap();
    app.post_form("/cart/add", "track_id=2").await.unwrap();

    let response = app.post_empty("/checkout").await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.header("hx-trigger"), Some("cart-updated"));

    let purchase = response.json();
    assert_eq!(purchase["total"], "$24.99");
    assert_eq!(purchase["type"], "marketplace");
    assert_eq!(purchase["buyerEmail"], ADMIN);
    assert_eq!(purchase["items"].as_array().unwrap().len(), 2);

    let badge = app.get("/cart/count").await.unwrap();
    assert!(badge.body.contains(r#"data-count="0""#));

    let mine = app.get("/dashboard/purchases").await.unwrap().json();
    assert_eq!(mine["purchases"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_cart_checkout_rejected() {
    let app = app_with_tracks().await;
    let response = app.post_empty("/checkout").await.unwrap();
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let all = app.get("/admin/purchases").await.unwrap().json();
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_signed_out_checkout_keeps_cart() {
    let app = app_with_tracks().await;
    app.post_form("/cart/add", "track_id=1").await.unwrap();
    assert_eq!(
        app.post_empty("/auth/sign-out").await.unwrap().status,
        StatusCode::NO_CONTENT
    );

    let response = app.post_empty("/checkout").await.unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let badge = app.get("/cart/count").await.unwrap();
    assert!(badge.body.contains(r#"data-count="1""#));
}

#[tokio::test]
async fn test_service_booking_filtered_by_kind() {
    let app = app_with_tracks().await;
    app.post_form("/cart/add", "track_id=2").await.unwrap();
    app.post_empty("/checkout").await.unwrap();

    let booked = app
        .json(
            "POST",
            "/services/book",
            &json!({ "title": "Mixing", "price": "$150" }),
        )
        .await
        .unwrap();
    assert_eq!(booked.status, StatusCode::CREATED);
    assert_eq!(booked.json()["type"], "service");

    let services = app
        .get("/dashboard/purchases?kind=service")
        .await
        .unwrap()
        .json();
    let services = services["purchases"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services.first().unwrap()["total"], "$150.00");

    let everything = app.get("/dashboard/purchases").await.unwrap().json();
    let everything = everything["purchases"].as_array().unwrap();
    assert_eq!(everything.len(), 2);
    // Newest first.
    assert_eq!(everything.first().unwrap()["type"], "service");
}
