mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{Json, Path as AxumPath, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use orchid_agents::ConciergeAgent;
use orchid_core::{room_catalog, CatalogError, ChatInput, HotelInfo, SearchParams};
use orchid_observability::AppMetrics;
use orchid_storage::MemoryStore;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<ConciergeAgent<MemoryStore>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: orchid_observability::MetricsSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
struct RoomsQuery {
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    adults: Option<u8>,
    children: Option<u8>,
}

impl RoomsQuery {
    fn into_search_params(self) -> SearchParams {
        let defaults = SearchParams::default();
        SearchParams {
            check_in: self.check_in,
            check_out: self.check_out,
            adults: self.adults.unwrap_or(defaults.adults),
            children: self.children.unwrap_or(defaults.children),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteRequest {
    room_id: u32,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    adults: Option<u8>,
    children: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
struct HistoryQuery {
    session_id: String,
}

pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();
    let store = Arc::new(MemoryStore::new());

    let reply_delay_millis = env::var("ORCHID_REPLY_DELAY_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(500);

    let agent = Arc::new(
        ConciergeAgent::new(room_catalog(), HotelInfo::default(), store, metrics.clone())
            .with_reply_delay(Duration::from_millis(reply_delay_millis)),
    );

    let api_key = env::var("ORCHID_API_KEY").unwrap_or_else(|_| "dev-orchid-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("ORCHID_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("ORCHID_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);

    let state = ApiState {
        agent,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
        allowed_origins: Arc::new(parse_allowed_origins()),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/rooms", get(rooms_list))
        .route("/v1/rooms/:id", get(room_detail))
        .route("/v1/quote", post(quote))
        .route("/v1/chat", post(chat))
        .route("/v1/chat/history", get(chat_history))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
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

async fn rooms_list(
    State(state): State<ApiState>,
    Query(query): Query<RoomsQuery>,
) -> impl IntoResponse {
    let rooms = state.agent.list_rooms(&query.into_search_params());
    (StatusCode::OK, Json(rooms))
}

async fn room_detail(State(state): State<ApiState>, AxumPath(id): AxumPath<u32>) -> Response {
    match state.agent.room(id) {
        Some(room) => (StatusCode::OK, Json(room)).into_response(),
        None => room_not_found(id),
    }
}

async fn quote(State(state): State<ApiState>, Json(request): Json<QuoteRequest>) -> Response {
    let defaults = SearchParams::default();
    let params = SearchParams {
        check_in: request.check_in,
        check_out: request.check_out,
        adults: request.adults.unwrap_or(defaults.adults),
        children: request.children.unwrap_or(defaults.children),
    };

    match state.agent.quote(request.room_id, &params) {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(CatalogError::UnknownRoom(id)) => room_not_found(id),
    }
}

async fn chat(State(state): State<ApiState>, Json(input): Json<ChatInput>) -> Response {
    match state.agent.handle_chat(input).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "chat_failed",
                "message": error.to_string()
            })),
        )
            .into_response(),
    }
}

async fn chat_history(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    match state.agent.history(&query.session_id).await {
        Ok(session) => {
            let messages = session.map(|value| value.messages).unwrap_or_default();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "session_id": query.session_id,
                    "messages": messages
                })),
            )
                .into_response()
        }
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "history_failed",
                "message": error.to_string()
            })),
        )
            .into_response(),
    }
}

fn room_not_found(id: u32) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "room_not_found",
            "message": format!("no room with id {id}")
        })),
    )
        .into_response()
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if request.method() == Method::OPTIONS || is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if header_key == state.api_key {
        return next.run(request).await;
    }

    // Browser requests from first-party allowed origins are accepted without
    // x-api-key, so the static shell never embeds the key.
    if request_origin_is_allowed(&state, &request) {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "unauthorized",
            "message": "missing or invalid x-api-key, and request origin is not allowed"
        })),
    )
        .into_response()
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    response.headers_mut().insert(
        header::HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    response
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5500")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}

fn parse_allowed_origins() -> Vec<String> {
    let default_origins = [
        "http://localhost:5500",
        "http://127.0.0.1:5500",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
    ];

    env::var("ORCHID_ALLOWED_ORIGINS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| {
            default_origins
                .iter()
                .map(|value| value.to_string())
                .collect()
        })
}

fn request_origin_is_allowed(state: &ApiState, request: &Request<Body>) -> bool {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .trim()
        .trim_end_matches('/');

    !origin.is_empty() && state.allowed_origins.iter().any(|value| value == origin)
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

fn request_ip(request: &Request<Body>) -> String {
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
