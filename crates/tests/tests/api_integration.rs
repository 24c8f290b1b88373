use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use safari_api::{build_app, ApiConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const API_KEY: &str = "test-safari-key";

fn app() -> Router {
    build_app(ApiConfig {
        api_key: API_KEY.to_string(),
        chat_reply_delay: Duration::from_millis(5),
        ..ApiConfig::default()
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

fn booking_body(party_size: u32, children: u32) -> Value {
    json!({
        "draft": {
            "destination_id": "amboseli",
            "start_date": "2025-08-10",
            "end_date": "2025-08-12",
            "party_size": party_size,
            "children": children
        },
        "contact": {
            "first_name": "Amani",
            "last_name": "Otieno",
            "email": "amani@example.com",
            "phone": "+254 722 000 000"
        }
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-content-type-options")
            .and_then(|value| value.to_str().ok()),
        Some("nosniff")
    );
}

#[tokio::test]
async fn quote_requires_api_key() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/quote")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "destination_id": "tsavo" }).to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn quote_prices_mid_range_mara() {
    let request = post_json(
        "/v1/quote",
        json!({
            "destination_id": "maasai-mara",
            "start_date": "2025-07-01",
            "end_date": "2025-07-04",
            "party_size": 2,
            "accommodation_tier": "mid-range",
            "selected_activities": []
        }),
    );

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["estimate"], json!(3000));
    assert_eq!(parsed["quote"]["total"], json!(3000));
    assert_eq!(parsed["quote"]["duration_days"], json!(3));
}

#[tokio::test]
async fn inverted_dates_are_rejected_with_estimate() {
    let request = post_json(
        "/v1/quote",
        json!({
            "destination_id": "samburu",
            "start_date": "2025-07-04",
            "end_date": "2025-07-01"
        }),
    );

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let parsed = body_json(response).await;
    assert_eq!(parsed["error"]["error"], json!("inverted_date_range"));
    assert_eq!(parsed["estimate"], json!(0));
}

#[tokio::test]
async fn booking_submit_returns_reference() {
    let request = post_json(
        "/v1/booking/submit",
        json!({
            "draft": {
                "destination_id": "combo",
                "start_date": "2025-09-01",
                "end_date": "2025-09-06",
                "party_size": 1,
                "children": 2,
                "accommodation_tier": "budget",
                "selected_activities": ["balloon-safari", "game-drives"]
            },
            "contact": {
                "first_name": "Amani",
                "last_name": "Otieno",
                "email": "amani@example.com",
                "phone": "+254 722 000 000"
            }
        }),
    );

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert!(parsed["reference"].is_string());
    assert_eq!(parsed["quote"]["total"], json!(450 * 5 + 450));
}

#[tokio::test]
async fn booking_submit_rejects_bad_email() {
    let request = post_json(
        "/v1/booking/submit",
        json!({
            "draft": {
                "destination_id": "combo",
                "start_date": "2025-09-01",
                "end_date": "2025-09-06"
            },
            "contact": {
                "first_name": "Amani",
                "last_name": "Otieno",
                "email": "amani-at-example",
                "phone": "+254 722 000 000"
            }
        }),
    );

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], json!("invalid_email"));
}

#[tokio::test]
async fn chat_keeps_transcript_per_session() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/v1/chat", json!({ "text": "What is the best time to visit?" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let exchange = body_json(response).await;
    assert_eq!(exchange["matched_keyword"], json!("best time to visit"));
    assert_eq!(exchange["reply"]["is_bot"], json!(true));
    let session_id = exchange["session_id"].as_str().unwrap().to_string();

    let transcript_request = Request::builder()
        .uri(format!("/v1/chat/transcript?session_id={session_id}"))
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(transcript_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    let ids = view["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|message| message["id"].as_u64().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 3]);

    let response = app
        .oneshot(post_json("/v1/chat/close", json!({ "session_id": session_id })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_transcript_is_not_found() {
    let request = Request::builder()
        .uri(format!(
            "/v1/chat/transcript?session_id={}",
            uuid::Uuid::new_v4()
        ))
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pricing_tables_list_defaults() {
    let request = Request::builder()
        .uri("/v1/pricing/tables")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tables: safari_core::PriceTables =
        serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(tables.destinations.len(), 6);
    assert!(tables.activity("game-drives").unwrap().charge.is_included());
}

#[tokio::test]
async fn malformed_session_id_is_a_json_400() {
    let response = app()
        .oneshot(get("/v1/chat/transcript?session_id=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );

    let parsed = body_json(response).await;
    assert_eq!(parsed["error"], json!("invalid_request"));
    assert!(parsed["message"].is_string());
}

#[tokio::test]
async fn malformed_quote_body_is_a_json_400() {
    let response = app()
        .oneshot(post_json("/v1/quote", json!({ "party_size": -1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("invalid_request"));

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("invalid_request"));
}

#[tokio::test]
async fn rate_limit_answers_429_with_json_body() {
    let app = build_app(ApiConfig {
        api_key: API_KEY.to_string(),
        rate_limit_max: 1,
        ..ApiConfig::default()
    });

    let first = app
        .clone()
        .oneshot(get("/v1/pricing/tables"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(get("/v1/pricing/tables"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["error"], json!("rate_limited"));

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn booking_submit_enforces_party_bounds() {
    let response = app()
        .oneshot(post_json("/v1/booking/submit", booking_body(9, 0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], json!("adults_out_of_range"));

    let response = app()
        .oneshot(post_json("/v1/booking/submit", booking_body(2, 7)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], json!("children_out_of_range"));

    let response = app()
        .oneshot(post_json("/v1/booking/submit", booking_body(8, 6)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_stores_and_matches_text_as_typed() {
    let response = app()
        .oneshot(post_json("/v1/chat", json!({ "text": "what\nto   pack" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let exchange = body_json(response).await;
    assert_eq!(exchange["user_message"]["text"], json!("what\nto   pack"));
    assert_eq!(exchange["matched_keyword"], Value::Null);

    let long = format!("{} what to pack", "x".repeat(600));
    let response = app()
        .oneshot(post_json("/v1/chat", json!({ "text": long })))
        .await
        .unwrap();
    let exchange = body_json(response).await;
    assert_eq!(exchange["matched_keyword"], json!("what to pack"));
}

#[tokio::test]
async fn over_long_chat_message_is_a_json_400() {
    let text = "x".repeat(safari_core::MAX_CHAT_INPUT_GRAPHEMES + 1);
    let response = app()
        .oneshot(post_json("/v1/chat", json!({ "text": text })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], json!("input_too_long"));
}

#[tokio::test]
async fn unknown_chat_session_id_is_replaced() {
    let wanted = uuid::Uuid::new_v4().to_string();
    let response = app()
        .oneshot(post_json(
            "/v1/chat",
            json!({ "session_id": wanted, "text": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let exchange = body_json(response).await;
    assert!(exchange["session_id"].is_string());
    assert_ne!(exchange["session_id"], json!(wanted));
}

#[tokio::test]
async fn destinations_filter_by_query_and_category() {
    let response = app()
        .oneshot(get("/v1/destinations?q=NAKURU&category=adventure"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["total"], json!(1));
    assert_eq!(parsed["results"][0]["id"], json!("hells-gate"));

    let response = app()
        .oneshot(get("/v1/destinations?category=all"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["total"], json!(6));
}

#[tokio::test]
async fn blog_posts_match_tags() {
    let response = app()
        .oneshot(get("/v1/blog/posts?q=conservancies"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["total"], json!(1));
    assert_eq!(parsed["results"][0]["category"], json!("Hidden Gems"));
}
