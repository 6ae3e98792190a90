use axum::{
    Json,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    error::ApiError,
    models::HealthResponse,
    state::AppState,
    utils::{AUTH_KEY_HEADER, forwarded_headers, secret_matches},
};
use crate::handlers::{Completed, Completion, DataEvent, FlexHandler, FlexRequest, ParamsMap};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Rejects any request whose `X-Auth-Key` does not match the shared secret
pub async fn require_shared_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(AUTH_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !secret_matches(presented, &state.shared_secret) {
        warn!(path = %request.uri().path(), "Rejected request with invalid shared secret");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Collection query without an id (GET /data/{collection})
pub async fn fetch_all(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
) -> Result<Completed, ApiError> {
    let request = build_request(Method::GET, &headers, query, Value::Null)
        .with_service_object(collection.clone());
    dispatch_data(&state, &collection, DataEvent::FetchAll, request).await
}

/// Single entity query (GET /data/{collection}/{id})
pub async fn fetch_one(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
) -> Result<Completed, ApiError> {
    let request = build_request(Method::GET, &headers, query, Value::Null)
        .with_service_object(collection.clone())
        .with_entity_id(id);
    dispatch_data(&state, &collection, DataEvent::FetchOne, request).await
}

/// Entity insert (POST /data/{collection})
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<Completed, ApiError> {
    let body = read_json_body(&state, &headers, body).await?;
    let request = build_request(Method::POST, &headers, query, body)
        .with_service_object(collection.clone());
    dispatch_data(&state, &collection, DataEvent::Create, request).await
}

/// Entity update (PUT /data/{collection}/{id})
pub async fn update(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<Completed, ApiError> {
    let body = read_json_body(&state, &headers, body).await?;
    let request = build_request(Method::PUT, &headers, query, body)
        .with_service_object(collection.clone())
        .with_entity_id(id);
    dispatch_data(&state, &collection, DataEvent::Update, request).await
}

/// Entity removal (DELETE /data/{collection}/{id})
pub async fn delete(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
) -> Result<Completed, ApiError> {
    let request = build_request(Method::DELETE, &headers, query, Value::Null)
        .with_service_object(collection.clone())
        .with_entity_id(id);
    dispatch_data(&state, &collection, DataEvent::Delete, request).await
}

/// Business logic hook or custom endpoint (POST /functions/{name})
pub async fn invoke_function(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<Completed, ApiError> {
    let handler = state.registry.function(&name)?;
    let body = read_json_body(&state, &headers, body).await?;
    let request = build_request(Method::POST, &headers, query, body);

    info!(function = %name, request_id = %request.request_id, "Dispatching function");
    Ok(dispatch(&state, handler, request).await)
}

/// Auth provider (POST /auth/{name})
pub async fn authenticate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ParamsMap>,
    headers: HeaderMap,
    body: axum::body::Body,
) -> Result<Completed, ApiError> {
    let handler = state.registry.auth_provider(&name)?;
    let body = read_json_body(&state, &headers, body).await?;
    let request = build_request(Method::POST, &headers, query, body);

    info!(auth_provider = %name, request_id = %request.request_id, "Dispatching auth provider");
    Ok(dispatch(&state, handler, request).await)
}

/// Health check endpoint (GET /health)
///
/// Unauthenticated. Reports the registered handlers and dispatch counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        handlers: state.registry.describe(),
        metrics: state.metrics.snapshot(),
    };

    Json(response)
}

async fn dispatch_data(
    state: &AppState,
    collection: &str,
    event: DataEvent,
    request: FlexRequest,
) -> Result<Completed, ApiError> {
    let handler = state.registry.data_handler(collection, event)?;

    info!(%collection, %event, request_id = %request.request_id, "Dispatching data handler");
    Ok(dispatch(state, handler, request).await)
}

/// Runs exactly one handler invocation for the request
async fn dispatch(
    state: &AppState,
    handler: Arc<dyn FlexHandler>,
    request: FlexRequest,
) -> Completed {
    state.metrics.dispatched();

    let request_id = request.request_id.clone();
    let completed = handler
        .call(request, Completion::new(), state.modules.clone())
        .await;

    info!(
        %request_id,
        status = completed.status().as_u16(),
        continue_chain = completed.continues_chain(),
        "Handler completed"
    );
    state.metrics.completed(&completed);
    completed
}

fn build_request(method: Method, headers: &HeaderMap, query: ParamsMap, body: Value) -> FlexRequest {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let mut request = FlexRequest::new(request_id, method.as_str()).with_body(body);
    request.query = query;
    request.headers = forwarded_headers(headers);
    request
}

/// Reads an optional JSON body; an empty body becomes `null`
///
/// The body is pulled through a length limit, so an oversized or
/// decompressed-to-oversized body is rejected before it is buffered whole.
async fn read_json_body(
    state: &AppState,
    headers: &HeaderMap,
    body: axum::body::Body,
) -> Result<Value, ApiError> {
    let max_bytes = state.config.server.max_body_bytes;
    super::utils::validate_content_length(headers, max_bytes)?;

    let data = Limited::new(body, max_bytes)
        .collect()
        .await
        .map_err(|err| {
            if err.is::<LengthLimitError>() {
                ApiError::PayloadTooLarge(max_bytes)
            } else {
                ApiError::Internal(err.to_string())
            }
        })?
        .to_bytes();

    if data.is_empty() {
        return Ok(Value::Null);
    }

    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    super::utils::parse_content_type(content_type)?;

    Ok(serde_json::from_slice(&data)?)
}
