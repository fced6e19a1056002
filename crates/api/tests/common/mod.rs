//! Common test utilities for integration tests.
//!
//! The app is wired to a recording mock broker and the in-memory record
//! store, so no network access is needed.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::Pin;
use domain::services::{BrokerFailurePolicy, MockDeviceBroker};
use fake::faker::internet::en::Username;
use fake::faker::lorem::en::Word;
use fake::Fake;
use persistence::repositories::tables;
use persistence::MemoryStore;
use serde_json::{json, Value};
use syncora_api::{
    app::create_app,
    config::{
        ApprovalConfig, AuthConfig, BlynkConfig, Config, LoggingConfig, SecurityConfig,
        ServerConfig, SupabaseConfig,
    },
};

/// Test configuration mirroring the shipped defaults.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            frontend_dir: "frontend".to_string(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![
                "http://127.0.0.1:5500".to_string(),
                "http://localhost:3050".to_string(),
            ],
        },
        blynk: BlynkConfig {
            base_url: "http://blynk.invalid/external/api".to_string(),
            token: "test-token".to_string(),
            inverted_pin: Pin::new(1),
            temperature_pin: Pin::new(5),
            humidity_pin: Pin::new(6),
            aqi_pin: Pin::new(9),
            timeout_ms: 1000,
        },
        supabase: SupabaseConfig::default(),
        auth: AuthConfig {
            resident_role: "homie".to_string(),
        },
        approval: ApprovalConfig {
            on_broker_failure: BrokerFailurePolicy::Resolve,
        },
    }
}

/// A router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub broker: MockDeviceBroker,
    pub store: MemoryStore,
}

impl TestApp {
    pub async fn call(&self, request: Request<Body>) -> axum::response::Response {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Create an app backed by a fresh mock broker and memory store.
pub fn create_test_app(config: Config) -> TestApp {
    let broker = MockDeviceBroker::new(Some(config.blynk.inverted_pin.clone()));
    create_test_app_with_broker(config, broker)
}

/// Create an app with a specific broker (e.g. a failing one).
pub fn create_test_app_with_broker(config: Config, broker: MockDeviceBroker) -> TestApp {
    let store = MemoryStore::new();
    let router = create_app(
        config,
        Arc::new(broker.clone()),
        Some(Arc::new(store.clone())),
    );
    TestApp {
        router,
        broker,
        store,
    }
}

/// Create an app without a record store.
pub fn create_unconfigured_app(config: Config) -> TestApp {
    let broker = MockDeviceBroker::new(Some(config.blynk.inverted_pin.clone()));
    let router = create_app(config, Arc::new(broker.clone()), None);
    TestApp {
        router,
        broker,
        store: MemoryStore::new(),
    }
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body.
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Generate a username for testing.
pub fn fake_username() -> String {
    let name: String = Username().fake();
    format!("{}_{}", name, uuid::Uuid::new_v4().simple())
}

/// Generate a class label for testing.
pub fn fake_class() -> String {
    let word: String = Word().fake();
    let grade: u8 = (6u8..13).fake();
    format!("{}-{}", grade, word)
}

/// Insert a user row.
pub async fn seed_user(store: &MemoryStore, username: &str, password: &str, role: &str) {
    store
        .seed(
            tables::USERS,
            vec![json!({"Username": username, "Password": password, "Role": role})],
        )
        .await;
}

/// Insert device rows with the given status values.
pub async fn seed_devices(store: &MemoryStore, devices: &[(u64, Value)]) {
    let rows = devices
        .iter()
        .map(|(id, status)| json!({"DeviceId": id, "Current_Status": status}))
        .collect();
    store.seed(tables::DEVICES, rows).await;
}
