//! Blynk cloud broker client.
//!
//! Talks to the Blynk external HTTP API, where every call is a GET with the
//! device token in the query string.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use domain::models::Pin;
use domain::services::{parse_pin_value, transmitted_value, BrokerError, DeviceBroker};
use reqwest::Client;
use tracing::debug;

use crate::config::BlynkConfig;
use crate::middleware::metrics::record_broker_call;

/// [`DeviceBroker`] backed by the Blynk cloud.
#[derive(Clone)]
pub struct BlynkClient {
    client: Client,
    base_url: String,
    token: String,
    inverted_pin: Pin,
}

impl BlynkClient {
    /// Create a new Blynk client.
    pub fn new(config: &BlynkConfig) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| BrokerError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            inverted_pin: config.inverted_pin.clone(),
        })
    }

    fn read_url(&self, pin: &Pin) -> String {
        format!("{}/get?token={}&{}", self.base_url, self.token, pin)
    }

    fn write_url(&self, pin: &Pin, transmitted: i64) -> String {
        format!(
            "{}/update?token={}&{}={}",
            self.base_url, self.token, pin, transmitted
        )
    }

    /// Sends a GET and returns the HTTP status with the body text.
    async fn fetch(&self, url: String) -> Result<(u16, String), BrokerError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BrokerError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BrokerError::Transport(e.to_string()))?;
        Ok((status, text))
    }
}

#[async_trait]
impl DeviceBroker for BlynkClient {
    async fn get(&self, pin: &Pin) -> Result<i64, BrokerError> {
        let start = Instant::now();
        let result = match self.fetch(self.read_url(pin)).await {
            Ok((status, text)) if (200..300).contains(&status) => Ok(parse_pin_value(&text)),
            Ok((status, _)) => Err(BrokerError::ReadFailed(status)),
            Err(e) => Err(e),
        };
        record_broker_call("get", result.is_ok(), start.elapsed().as_secs_f64());
        debug!(pin = %pin, ok = result.is_ok(), "Broker read");
        result
    }

    async fn update(&self, pin: &Pin, value: u8) -> Result<(), BrokerError> {
        let transmitted = transmitted_value(pin, value, Some(&self.inverted_pin));
        let start = Instant::now();
        let result = match self.fetch(self.write_url(pin, transmitted)).await {
            Ok((status, _)) if (200..300).contains(&status) => Ok(()),
            Ok((status, _)) => Err(BrokerError::UpdateFailed(status)),
            Err(e) => Err(e),
        };
        record_broker_call("update", result.is_ok(), start.elapsed().as_secs_f64());
        debug!(pin = %pin, value, transmitted, ok = result.is_ok(), "Broker write");
        result
    }
}
