//! PostgREST client for the hosted record store.
//!
//! Speaks the table API at `{url}/rest/v1/{table}` with the service key.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::metrics::{record_query_failure, QueryTimer};
use crate::store::{filter_text, Filter, RecordStore, Row, StoreError};

/// Connection settings for the hosted record store.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub url: String,
    pub service_key: String,
    pub timeout_ms: u64,
}

/// Error descriptor returned by PostgREST.
#[derive(Debug, Deserialize)]
struct ErrorDescriptor {
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Record store backed by a PostgREST endpoint.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl PostgrestStore {
    /// Creates a client; fails only if the HTTP client cannot be built.
    pub fn new(config: &PostgrestConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn execute(
        &self,
        table: &str,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<Vec<Row>, StoreError> {
        let timer = QueryTimer::new(table, operation);
        let result = self.send(builder).await;
        timer.record();

        if let Err(ref err) = result {
            record_query_failure(table, operation);
            debug!(table, operation, error = %err, "Record store call failed");
        }
        result
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<Row>, StoreError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Query parameters for equality filters (`column=eq.value`).
pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| {
            let op = match filter_text(&f.value) {
                Some(text) => format!("eq.{}", text),
                None => "is.null".to_string(),
            };
            (f.column.clone(), op)
        })
        .collect()
}

async fn api_error(response: Response) -> StoreError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorDescriptor>(&text) {
        Ok(ErrorDescriptor {
            message: Some(message),
            details,
        }) => match details {
            Some(details) if !details.is_empty() => format!("{} ({})", message, details),
            _ => message,
        },
        _ if !text.is_empty() => text,
        _ => status.to_string(),
    };
    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl RecordStore for PostgrestStore {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        let builder = self
            .client
            .get(self.table_url(table))
            .query(&[("select", columns)])
            .query(&filter_params(filters));
        self.execute(table, "select", builder).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let builder = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        self.execute(table, "insert", builder).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Row,
        filters: &[Filter],
    ) -> Result<Vec<Row>, StoreError> {
        let builder = self
            .client
            .patch(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&filter_params(filters))
            .json(&patch);
        self.execute(table, "update", builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn store(url: &str) -> PostgrestStore {
        PostgrestStore::new(&PostgrestConfig {
            url: url.to_string(),
            service_key: "service-key".to_string(),
            timeout_ms: 1000,
        })
        .unwrap()
    }

    #[test]
    fn test_table_url_strips_trailing_slash() {
        assert_eq!(
            store("https://abc.supabase.co/").table_url("Devices"),
            "https://abc.supabase.co/rest/v1/Devices"
        );
    }

    #[test]
    fn test_filter_params() {
        let params = filter_params(&[
            Filter::eq("DeviceId", "V2"),
            Filter::eq("completed", false),
            Filter::eq("Approval", Value::Null),
            Filter::eq("id", 7),
        ]);
        assert_eq!(
            params,
            vec![
                ("DeviceId".to_string(), "eq.V2".to_string()),
                ("completed".to_string(), "eq.false".to_string()),
                ("Approval".to_string(), "is.null".to_string()),
                ("id".to_string(), "eq.7".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_request_shape() {
        let store = store("https://abc.supabase.co");
        let request = store
            .authorized(
                store
                    .client
                    .get(store.table_url("Users"))
                    .query(&[("select", "Username,Password,Role")])
                    .query(&filter_params(&[Filter::eq("Username", "asha")])),
            )
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://abc.supabase.co/rest/v1/Users?select=Username%2CPassword%2CRole&Username=eq.asha"
        );
        assert_eq!(request.headers()["apikey"], "service-key");
        assert_eq!(request.headers()["authorization"], "Bearer service-key");
    }

    #[test]
    fn test_error_descriptor_parse() {
        let parsed: ErrorDescriptor =
            serde_json::from_value(json!({"message": "boom", "code": "42P01"})).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("boom"));
        assert!(parsed.details.is_none());
    }
}
