//! Admin console access and catalog moderation.
//!
//! Access is decided by the roster on every request, never by the role
//! cached on the session document.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use soundsync_core::{Email, Role};
use soundsync_integration_tests::TestApp;
use soundsync_storefront::models::UserSession;
use soundsync_storefront::store::keys;

const BOSS: &str = "boss@example.com";
const MOD: &str = "mod@example.com";

// =============================================================================
// Roster-based access
// =============================================================================

#[tokio::test]
async fn test_signed_out_admin_request_unauthorized() {
    let app = TestApp::new().unwrap();
    let response = app.get("/admin/tracks").await.unwrap();
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_regular_user_forbidden() {
    let app = TestApp::new().unwrap();
    app.sign_in("Fan", "fan@example.com").await.unwrap();
    let response = app.get("/admin/tracks").await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_inactive_entry_revokes_cached_admin_role() {
    let app = TestApp::new().unwrap();
    app.grant(BOSS, Role::SuperAdmin).unwrap();
    app.grant(MOD, Role::Admin).unwrap();

    // Signed in while active: the session caches the admin role.
    let session = app.sign_in("Mod", MOD).await.unwrap().json();
    assert_eq!(session["role"], "admin");
    assert_eq!(app.get("/admin/tracks").await.unwrap().status, StatusCode::OK);

    // Deactivate the entry behind the session's back.
    app.sign_in("Boss", BOSS).await.unwrap();
    let deactivated = app
        .json(
            "POST",
            &format!("/admin/roster/{MOD}/status"),
            &json!({ "status": "inactive" }),
        )
        .await
        .unwrap();
    assert_eq!(deactivated.status, StatusCode::OK);

    // Restore the stale session that still says "admin".
    let stale: UserSession = serde_json::from_value(session).unwrap();
    app.storage.write(keys::USER, &Some(stale)).unwrap();

    let response = app.get("/admin/tracks").await.unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let me = app.get("/auth/me").await.unwrap().json();
    assert_eq!(me["role"], "user");
    assert_eq!(me["user"]["role"], "admin");
}

#[tokio::test]
async fn test_forged_session_role_ignored() {
    let app = TestApp::new().unwrap();
    let forged = UserSession {
        signed_in: true,
        name: "Mallory".to_owned(),
        email: Email::parse("mallory@example.com").unwrap(),
        avatar_url: None,
        role: Some(Role::SuperAdmin),
        seller: None,
    };
    app.storage.write(keys::USER, &Some(forged)).unwrap();

    assert_eq!(
        app.get("/admin/roster").await.unwrap().status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.get("/admin/purchases").await.unwrap().status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_roster_management_needs_super_admin() {
    let app = TestApp::new().unwrap();
    app.grant(MOD, Role::Admin).unwrap();
    app.sign_in("Mod", MOD).await.unwrap();

    let response = app
        .json(
            "POST",
            "/admin/roster",
            &json!({ "email": "friend@example.com", "role": "admin" }),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_super_admin_manages_roster() {
    let app = TestApp::new().unwrap();
    app.grant(BOSS, Role::SuperAdmin).unwrap();
    app.sign_in("Boss", BOSS).await.unwrap();

    let added = app
        .json(
            "POST",
            "/admin/roster",
            &json!({ "email": "Friend@Example.com", "role": "admin" }),
        )
        .await
        .unwrap();
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.json()["email"], "friend@example.com");
    assert_eq!(added.json()["status"], "active");

    let roster = app.get("/admin/roster").await.unwrap().json();
    assert_eq!(roster.as_array().unwrap().len(), 2);

    let removed = app
        .send(
            axum::http::Request::delete("/admin/roster/friend@example.com")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let missing = app
        .json(
            "POST",
            "/admin/roster/friend@example.com/status",
            &json!({ "status": "active" }),
        )
        .await
        .unwrap();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Catalog moderation
// =============================================================================

#[tokio::test]
async fn test_featured_toggle_changes_only_home() {
    let app = TestApp::new().unwrap();
    app.grant(BOSS, Role::Admin).unwrap();
    app.sign_in("Boss", BOSS).await.unwrap();
    app.create_track("Midnight Drive", "$24.99", false).await.unwrap();
    app.create_track("Low Tide", "$10", false).await.unwrap();

    let home = app.get("/").await.unwrap();
    assert!(!home.body.contains("Midnight Drive"));
    let before = app.get("/marketplace").await.unwrap().json();

    let toggled = app.post_empty("/admin/tracks/1/featured").await.unwrap();
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.json()["featured"], true);

    let home = app.get("/").await.unwrap();
    assert!(home.body.contains("Midnight Drive"));
    assert!(!home.body.contains("Low Tide"));

    let after = app.get("/marketplace").await.unwrap().json();
    assert_eq!(before.as_array().unwrap().len(), 2);
    assert_eq!(after.as_array().unwrap().len(), 2);
    let titles = |value: &serde_json::Value| -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|track| track["title"].as_str().unwrap().to_owned())
            .collect()
    };
    assert_eq!(titles(&before), titles(&after));
}

#[tokio::test]
async fn test_out_of_stock_hidden_everywhere() {
    let app = TestApp::new().unwrap();
    app.grant(BOSS, Role::Admin).unwrap();
    app.sign_in("Boss", BOSS).await.unwrap();
    app.create_track("Midnight Drive", "$24.99", true).await.unwrap();

    app.post_empty("/admin/tracks/1/stock").await.unwrap();

    assert!(!app.get("/").await.unwrap().body.contains("Midnight Drive"));
    assert!(app.get("/marketplace").await.unwrap().json().as_array().unwrap().is_empty());
    // Still listed for admins.
    assert_eq!(
        app.get("/admin/tracks").await.unwrap().json().as_array().unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_track_validation_and_not_found() {
    let app = TestApp::new().unwrap();
    app.grant(BOSS, Role::Admin).unwrap();
    app.sign_in("Boss", BOSS).await.unwrap();

    let blank = app.create_track("   ", "$5", false).await.unwrap();
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert!(blank.body.contains("title"));

    assert_eq!(
        app.get("/admin/tracks/42").await.unwrap().status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post_empty("/admin/tracks/42/featured").await.unwrap().status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_carousel_shows_active_slides_in_order() {
    let app = TestApp::new().unwrap();
    app.grant(BOSS, Role::Admin).unwrap();
    app.sign_in("Boss", BOSS).await.unwrap();

    for (title, active, order) in [("Second", true, 2), ("Hidden", false, 0), ("First", true, 1)] {
        let created = app
            .json(
                "POST",
                "/admin/carousel",
                &json!({
                    "title": title,
                    "imageUrl": "/img/slide.jpg",
                    "isActive": active,
                    "sortOrder": order,
                }),
            )
            .await
            .unwrap();
        assert_eq!(created.status, StatusCode::CREATED);
    }

    let home = app.get("/").await.unwrap().body;
    assert!(!home.contains("Hidden"));
    let first = home.find("First").unwrap();
    let second = home.find("Second").unwrap();
    assert!(first < second);
}
