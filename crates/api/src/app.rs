use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::DeviceBroker;
use persistence::RecordStore;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{analytics, auth, devices, environment, health, requests};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub broker: Arc<dyn DeviceBroker>,
    /// Absent when Supabase credentials are not configured.
    pub store: Option<Arc<dyn RecordStore>>,
}

impl AppState {
    /// The record store, or the error every store-backed endpoint returns
    /// when it is not configured.
    pub fn store(&self) -> Result<Arc<dyn RecordStore>, ApiError> {
        self.store
            .clone()
            .ok_or_else(|| ApiError::NotConfigured("Supabase not configured".to_string()))
    }
}

pub fn create_app(
    config: Config,
    broker: Arc<dyn DeviceBroker>,
    store: Option<Arc<dyn RecordStore>>,
) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        config: config.clone(),
        broker,
        store,
    };

    // Credentials rule out wildcard origins, so only the configured ones
    // are allowed.
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let api_routes = Router::new()
        .route("/api/health", get(health::health_check))
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/login_Interprise", post(auth::login_enterprise))
        // Devices
        .route("/api/devices/states", get(devices::get_states))
        .route("/api/devices/:pin", post(devices::switch_device))
        // Student requests
        .route("/api/device/student_request", post(requests::submit_request))
        .route(
            "/api/device/get_pending_student_request",
            post(requests::list_pending),
        )
        .route(
            "/api/device/get_approved_student_request",
            post(requests::list_approved),
        )
        .route(
            "/api/device/get_denied_student_request",
            post(requests::list_denied),
        )
        .route(
            "/api/device/set_student_request",
            post(requests::resolve_request),
        )
        // Sensors and analytics
        .route("/api/environment", get(environment::get_environment))
        .route("/api/analytics/power", post(analytics::simulate_power))
        .route("/metrics", get(metrics_handler));

    api_routes
        .fallback_service(ServeDir::new(&config.server.frontend_dir))
        .with_state(state)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
}

/// Binds `host:port`, moving to the next port while the address is in use.
///
/// Any other bind error is returned.
pub async fn bind_listener(host: &str, port: u16) -> std::io::Result<TcpListener> {
    let mut port = port;
    loop {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(err) if err.kind() == ErrorKind::AddrInUse => {
                let next = port.checked_add(1).ok_or(err)?;
                warn!(port, next, "Port in use, trying the next one");
                port = next;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_listener_skips_busy_port() {
        let busy = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let busy_port = busy.local_addr().unwrap().port();

        let listener = bind_listener("127.0.0.1", busy_port).await.unwrap();
        assert!(listener.local_addr().unwrap().port() > busy_port);
    }

    #[tokio::test]
    async fn test_bind_listener_reports_other_errors() {
        // TEST-NET-3 is never assigned to a local interface.
        let err = bind_listener("203.0.113.1", 3000).await.unwrap_err();
        assert_ne!(err.kind(), ErrorKind::AddrInUse);
    }
}
