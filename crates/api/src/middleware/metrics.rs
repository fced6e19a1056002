//! Prometheus metrics middleware.
//!
//! Provides HTTP request/response metrics collection and export, plus the
//! device-facing counters recorded by the services.

use std::sync::OnceLock;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Middleware to record HTTP request metrics.
///
/// Records the following metrics:
/// - `http_requests_total`: Counter with labels (method, path, status)
/// - `http_request_duration_seconds`: Histogram with labels (method, path)
///
/// Unmatched paths (static frontend files) are grouped under `static`.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "static".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Convert HTTP method to string for metric labels.
fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::OPTIONS => "OPTIONS",
        Method::HEAD => "HEAD",
        _ => "OTHER",
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Record a call to the device broker.
pub fn record_broker_call(operation: &'static str, ok: bool, duration_secs: f64) {
    counter!(
        "broker_calls_total",
        "operation" => operation,
        "outcome" => outcome(ok)
    )
    .increment(1);
    histogram!("broker_call_duration_seconds", "operation" => operation).record(duration_secs);
}

/// Record a device switch command and whether it reached the audit log.
pub fn record_device_command(state: &'static str, logged: Option<bool>) {
    let logged = match logged {
        Some(true) => "yes",
        Some(false) => "no",
        None => "disabled",
    };
    counter!("device_commands_total", "state" => state, "logged" => logged).increment(1);
}

/// Record a resolved student request.
pub fn record_request_resolution(approval: &'static str, rows: usize) {
    counter!("student_requests_resolved_total", "approval" => approval).increment(rows as u64);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Initialize the Prometheus metrics recorder.
///
/// Must be called once during startup before any metrics are recorded.
/// Calling it again is a no-op.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
