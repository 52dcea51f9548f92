use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use orchid_api::build_app;
use serde_json::json;
use tower::ServiceExt;

const API_KEY: &str = "dev-orchid-key";

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app().await.expect("app should build");

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
}

#[tokio::test]
async fn chat_requires_api_key() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "text": "ยืนยันการจอง"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rooms_filter_by_combined_capacity() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .uri("/v1/rooms?adults=4&children=1")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rooms = body_json(response).await;
    let ids: Vec<u64> = rooms
        .as_array()
        .unwrap()
        .iter()
        .map(|room| room["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3]);

    // Seven guests only fit the suite.
    let request = Request::builder()
        .uri("/v1/rooms?adults=5&children=2")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let rooms = body_json(app.oneshot(request).await.unwrap()).await;
    let ids: Vec<u64> = rooms
        .as_array()
        .unwrap()
        .iter()
        .map(|room| room["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn unknown_room_returns_not_found() {
    let app = build_app().await.expect("app should build");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/rooms/99")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_reports_exact_figures() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/quote")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "room_id": 2,
                "check_in": "2024-01-01",
                "check_out": "2024-01-03"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let quote = body_json(response).await;
    assert_eq!(quote["nights"].as_u64(), Some(2));
    assert_eq!(quote["subtotal"].as_i64(), Some(16_000));
    assert_eq!(quote["tax"].as_f64(), Some(1_120.0));
    assert_eq!(quote["deposit"].as_i64(), Some(2_500));
    assert_eq!(quote["total"].as_f64(), Some(19_620.0));
    assert!(quote["bill_code"].as_str().unwrap().starts_with("BK-"));
}

#[tokio::test]
async fn booking_chat_without_room_prompts_selection() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "text": "ยืนยัน"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply = body_json(response).await;
    assert!(reply["quote"].is_null());
    assert_eq!(
        reply["reply_text"].as_str(),
        Some(orchid_core::responder::SELECT_ROOM_PROMPT)
    );
}

#[tokio::test]
async fn booking_chat_with_room_quotes_and_persists_history() {
    let app = build_app().await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(
            json!({
                "text": "confirm my booking",
                "room_id": 2,
                "search": {
                    "check_in": "2024-01-01",
                    "check_out": "2024-01-03",
                    "adults": 4,
                    "children": 1
                }
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply = body_json(response).await;
    assert_eq!(reply["intent"].as_str(), Some("booking"));
    assert_eq!(reply["quote"]["subtotal"].as_i64(), Some(16_000));
    let session_id = reply["session_id"].as_str().unwrap().to_string();

    let history_request = Request::builder()
        .uri(format!("/v1/chat/history?session_id={session_id}"))
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();

    let history = body_json(app.oneshot(history_request).await.unwrap()).await;
    let messages = history["messages"].as_array().unwrap();

    // greeting, viewing-room nudge, user message, assistant reply
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2]["role"].as_str(), Some("user"));
    assert_eq!(messages[3]["role"].as_str(), Some("assistant"));
}
