mod config;
mod extract;
mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use safari_concierge::{CatalogSearch, ChatError, ChatInput, SafariAgent};
use safari_core::{
    BookingStep, BookingWizard, ContactDetails, PriceTables, ResponseTable, TripDraft,
};
use safari_observability::AppMetrics;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use config::ApiConfig;
use extract::{ApiJson, ApiQuery};
use rate_limit::ClientRateLimiter;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<SafariAgent>,
    pub metrics: Arc<AppMetrics>,
    pub config: Arc<ApiConfig>,
    limiter: ClientRateLimiter,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: safari_observability::MetricsSnapshot,
}

#[derive(Debug, Serialize)]
struct QuoteResponse {
    estimate: u64,
    quote: Option<safari_core::Quote>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    session_id: Option<Uuid>,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct BookingSubmitRequest {
    draft: TripDraft,
    contact: ContactDetails,
}

pub fn build_app(config: ApiConfig) -> Router {
    build_router(build_state(config))
}

pub fn build_state(config: ApiConfig) -> ApiState {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(SafariAgent::new(
        PriceTables::default(),
        ResponseTable::default(),
        config.agent_settings(),
        metrics.clone(),
    ));

    ApiState {
        agent,
        metrics,
        limiter: ClientRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
        config: Arc::new(config),
    }
}

/// Periodically drops idle chat sessions, cancelling their pending replies.
pub fn spawn_session_janitor(agent: Arc<SafariAgent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            agent.purge_expired_sessions();
        }
    })
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/pricing/tables", get(pricing_tables))
        .route("/v1/destinations", get(destinations))
        .route("/v1/blog/posts", get(blog_posts))
        .route("/v1/quote", post(quote))
        .route("/v1/booking/submit", post(booking_submit))
        .route("/v1/chat", post(chat))
        .route("/v1/chat/transcript", get(chat_transcript))
        .route("/v1/chat/close", post(chat_close))
        .layer(build_cors_layer(&state.config.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(state.config.body_limit_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn pricing_tables(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.agent.price_tables().clone()))
}

async fn destinations(
    State(state): State<ApiState>,
    ApiQuery(search): ApiQuery<CatalogSearch>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(state.agent.search_destinations(&search)))
}

async fn blog_posts(
    State(state): State<ApiState>,
    ApiQuery(search): ApiQuery<CatalogSearch>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(state.agent.search_posts(&search)))
}

async fn quote(
    State(state): State<ApiState>,
    ApiJson(draft): ApiJson<TripDraft>,
) -> impl IntoResponse {
    let estimate = state.agent.estimate(&draft);

    match state.agent.quote(&draft) {
        Ok(quote) => (
            StatusCode::OK,
            Json(QuoteResponse {
                estimate,
                quote: Some(quote),
                error: None,
            }),
        ),
        Err(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(QuoteResponse {
                estimate,
                quote: None,
                error: Some(ErrorBody {
                    error: error.code(),
                    message: error.to_string(),
                }),
            }),
        ),
    }
}

async fn booking_submit(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<BookingSubmitRequest>,
) -> Response {
    let wizard = BookingWizard::from_parts(BookingStep::Review, request.draft, request.contact);

    match state.agent.submit_booking(&wizard) {
        Ok(booking) => (StatusCode::OK, Json(booking)).into_response(),
        Err(error) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            error.code(),
            error.to_string(),
        ),
    }
}

async fn chat(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Response {
    let input = ChatInput {
        session_id: request.session_id,
        text: request.text,
    };

    match state.agent.chat(input).await {
        Ok(exchange) => (StatusCode::OK, Json(exchange)).into_response(),
        Err(error @ ChatError::InputTooLong { .. }) => {
            error_response(StatusCode::BAD_REQUEST, error.code(), error.to_string())
        }
        Err(error) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            error.code(),
            error.to_string(),
        ),
    }
}

async fn chat_transcript(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
) -> Response {
    match state.agent.transcript(&query.session_id) {
        Some(view) => (StatusCode::OK, Json(view)).into_response(),
        None => session_not_found(),
    }
}

async fn chat_close(
    State(state): State<ApiState>,
    ApiJson(query): ApiJson<SessionQuery>,
) -> Response {
    match state.agent.close_session(&query.session_id) {
        Some(cancelled) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "session_id": query.session_id,
                "cancelled_replies": cancelled
            })),
        )
            .into_response(),
        None => session_not_found(),
    }
}

fn session_not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "session_not_found",
        "no chat session with this id".to_string(),
    )
}

fn error_response(status: StatusCode, code: &'static str, message: String) -> Response {
    (
        status,
        Json(ErrorBody {
            error: code,
            message,
        }),
    )
        .into_response()
}

fn is_public_endpoint(path: &str) -> bool {
    path == "/health"
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.config.api_key {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid x-api-key".to_string(),
        );
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let client = request_client(&request);
    if !state.limiter.allow(&client) {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded for this client".to_string(),
        );
    }

    next.run(request).await
}

fn request_client(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        header::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; base-uri 'none'"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_client(&request), "203.0.113.9");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_client(&request), "local");
    }

    #[test]
    fn only_health_is_public() {
        assert!(is_public_endpoint("/health"));
        assert!(!is_public_endpoint("/v1/quote"));
    }
}
