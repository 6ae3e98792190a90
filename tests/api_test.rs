use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use futures::StreamExt;
use tower::ServiceExt; // for `oneshot`

use flex_starter::api::{models::CONTINUE_HEADER, router, state::AppState};
use flex_starter::config::Config;
use flex_starter::handlers::{Completion, FlexRequest, RegistryBuilder};
use flex_starter::modules::{EmailSender, ModuleError, Modules, PushSender};
use flex_starter::samples::{SampleOptions, register_samples};

const SECRET: &str = "link";

/// Module stub whose calls all succeed or all fail
struct StubModules {
    fail: bool,
}

#[async_trait]
impl EmailSender for StubModules {
    async fn send(&self, _: &str, to: &str, _: &str, _: &str) -> flex_starter::modules::Result<Value> {
        if self.fail {
            Err(ModuleError::RequestFailed("smtp down".to_string()))
        } else {
            Ok(json!({ "to": to }))
        }
    }
}

#[async_trait]
impl PushSender for StubModules {
    async fn broadcast_message(&self, _: &str) -> flex_starter::modules::Result<Value> {
        if self.fail {
            Err(ModuleError::Rejected {
                status: 503,
                message: "push down".to_string(),
            })
        } else {
            Ok(Value::Null)
        }
    }
}

fn create_test_config() -> Config {
    let config_toml = r#"
[server]
bind_addr = "127.0.0.1:10001"
max_body_bytes = 1024

[samples]
business_logic_delay_ms = 20
    "#;

    toml::from_str(config_toml).expect("Failed to parse test config")
}

/// Builds a test app with the sample handlers and stubbed modules
fn build_test_app(fail_modules: bool) -> Router {
    let config = create_test_config();

    let mut builder = RegistryBuilder::new();
    let options = SampleOptions {
        business_logic_delay: Duration::from_millis(config.samples.business_logic_delay_ms),
    };
    register_samples(&mut builder, &options).unwrap();
    builder
        .register_function(
            "createHook",
            |request: FlexRequest, complete: Completion, _modules: Modules| async move {
                complete.set_body(request.body).created().next()
            },
        )
        .unwrap();

    let stub = Arc::new(StubModules { fail: fail_modules });
    let modules = Modules::new(stub.clone(), stub);

    let state = AppState::new(config, builder.build(), SECRET, modules);
    router(state)
}

fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Auth-Key", SECRET)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn continue_flag(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(CONTINUE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_fetch_all_echoes_request_with_record() {
    let app = build_test_app(false);

    let request = authed("GET", "/data/CoolCollection?limit=5")
        .header("X-Request-Id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(continue_flag(&response), "true");

    let body = body_json(response).await;
    assert_eq!(body["responseObject"], json!({ "some": 15, "data": 25 }));
    assert_eq!(body["requestId"], "req-42");
    assert_eq!(body["serviceObjectName"], "CoolCollection");
    assert_eq!(body["query"]["limit"], "5");
    assert!(body["headers"].get("x-auth-key").is_none());
}

#[tokio::test]
async fn test_fetch_one_carries_entity_id() {
    let app = build_test_app(false);

    let request = authed("GET", "/data/CoolCollection/1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["entityId"], "1");
    assert!(!body["requestId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_shared_secret_is_rejected() {
    let app = build_test_app(false);

    let request = Request::builder()
        .uri("/data/CoolCollection")
        .body(Body::empty())
        .unwrap();
    let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/data/CoolCollection")
        .header("X-Auth-Key", "wrong")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_collection_and_unregistered_event() {
    let app = build_test_app(false);

    let request = authed("GET", "/data/Nope").body(Body::empty()).unwrap();
    let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "HANDLER_NOT_FOUND");

    let request = authed("DELETE", "/data/CoolCollection/1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["code"], "EVENT_NOT_SUPPORTED");
}

#[tokio::test]
async fn test_business_logic_ends_chain() {
    let app = build_test_app(false);

    let request = authed("POST", "/functions/sampleBusinessLogic")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "widget" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(continue_flag(&response), "false");
    assert_eq!(body_json(response).await["body"]["name"], "widget");
}

#[tokio::test]
async fn test_closure_function_receives_body() {
    let app = build_test_app(false);

    let request = authed("POST", "/functions/createHook")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"id":7}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await, json!({ "id": 7 }));
}

#[tokio::test]
async fn test_function_body_validation() {
    let app = build_test_app(false);

    let request = authed("POST", "/functions/createHook")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = authed("POST", "/functions/createHook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; 2048]))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_oversized_stream_is_rejected_before_buffering() {
    const CHUNK: usize = 256;
    const CHUNKS: usize = 256;

    let app = build_test_app(false);
    let pulled = Arc::new(AtomicUsize::new(0));

    let counter = pulled.clone();
    let stream = futures::stream::iter(0..CHUNKS).map(move |_| {
        counter.fetch_add(CHUNK, Ordering::SeqCst);
        Ok::<_, std::io::Error>(vec![b' '; CHUNK])
    });

    let request = authed("POST", "/auth/myAuth")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from_stream(stream))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    // limit is 1024 bytes; reading stops at the chunk that crosses it
    assert!(pulled.load(Ordering::SeqCst) <= 1024 + CHUNK);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_declared_length_over_limit_is_rejected() {
    let app = build_test_app(false);

    let request = authed("POST", "/functions/createHook")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, "4096")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unknown_function_is_not_found() {
    let app = build_test_app(false);

    let request = authed("POST", "/functions/missing")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_emailer_and_pusher_success() {
    let app = build_test_app(false);

    for name in ["emailer", "pusher"] {
        let request = authed("POST", &format!("/functions/{name}"))
            .body(Body::empty())
            .unwrap();
        let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{name}");
        assert_eq!(continue_flag(&response), "true");
    }
}

#[tokio::test]
async fn test_module_failure_maps_to_runtime_error() {
    let app = build_test_app(true);

    let request = authed("POST", "/functions/emailer")
        .body(Body::empty())
        .unwrap();
    let response = ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "MODULE_REQUEST_FAILED");
    assert_eq!(body["message"], "request to platform failed: smtp down");

    let request = authed("POST", "/functions/pusher")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "MODULE_REJECTED");
}

#[tokio::test]
async fn test_auth_provider_returns_token() {
    let app = build_test_app(false);

    let request = authed("POST", "/auth/myAuth")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"sam","password":"secret"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_app(false);

    let request = authed("GET", "/data/CoolCollection")
        .body(Body::empty())
        .unwrap();
    ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();

    // no shared secret needed
    let request = Request::builder()
        .uri("/health")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert!(health.get("version").is_some());
    assert_eq!(
        health["handlers"]["data"]["CoolCollection"],
        json!(["fetch_one", "fetch_all"])
    );
    assert_eq!(health["handlers"]["auth_providers"], json!(["myAuth"]));
    assert_eq!(health["metrics"]["dispatched"], 1);
    assert_eq!(health["metrics"]["continued"], 1);
}

#[tokio::test]
async fn test_each_invocation_completes_once() {
    let app = build_test_app(false);

    for uri in ["/data/CoolCollection", "/data/CoolCollection/1"] {
        let request = authed("GET", uri).body(Body::empty()).unwrap();
        ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
            .await
            .unwrap();
    }
    let request = authed("POST", "/functions/sampleBusinessLogic")
        .body(Body::empty())
        .unwrap();
    ServiceExt::<Request<Body>>::oneshot(app.clone(), request)
        .await
        .unwrap();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let health = body_json(app.oneshot(request).await.unwrap()).await;

    let metrics = &health["metrics"];
    assert_eq!(metrics["dispatched"], 3);
    assert_eq!(
        metrics["continued"].as_u64().unwrap() + metrics["terminated"].as_u64().unwrap(),
        3
    );
    assert_eq!(metrics["terminated"], 1);
}
