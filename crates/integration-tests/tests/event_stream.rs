//! Signals delivered to other pages over `GET /events`.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{StatusCode, header};
use soundsync_core::Role;
use soundsync_integration_tests::TestApp;
use tokio_stream::StreamExt;

/// Read the event stream until `done` accepts what has arrived so far.
async fn read_until(body: Body, done: impl Fn(&str) -> bool) -> String {
    let mut chunks = body.into_data_stream();
    let mut text = String::new();
    while !done(&text) {
        let chunk = tokio::time::timeout(Duration::from_secs(5), chunks.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        text.push_str(&String::from_utf8_lossy(&chunk));
    }
    text
}

#[tokio::test]
async fn test_cart_change_reaches_open_stream() {
    let app = TestApp::new().unwrap();
    app.grant("boss@example.com", Role::Admin).unwrap();
    app.sign_in("Boss", "boss@example.com").await.unwrap();
    app.create_track("Beat A", "$10", false).await.unwrap();

    let stream = app.open("/events").await.unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(
        stream.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let added = app.post_form("/cart/add", "track_id=1").await.unwrap();
    assert_eq!(added.status, StatusCode::OK);

    let storage_frame = "event: storage-changed\ndata: {\"signal\":\"storage-changed\",\"key\":\"cart\"}";
    let cart_frame = "event: cart-updated\ndata: {\"signal\":\"cart-updated\"}";
    let text = read_until(stream.into_body(), |text| {
        text.contains(storage_frame) && text.contains(cart_frame)
    })
    .await;

    // The write lands before the cart signal goes out.
    assert!(text.find(storage_frame).unwrap() < text.find(cart_frame).unwrap());
}

#[tokio::test]
async fn test_sign_in_reaches_open_stream() {
    let app = TestApp::new().unwrap();
    let stream = app.open("/events").await.unwrap();

    app.sign_in("Kay", "kay@example.com").await.unwrap();

    let text = read_until(stream.into_body(), |text| text.contains("event: user-updated")).await;
    assert!(text.contains("\"key\":\"user\""));
}
