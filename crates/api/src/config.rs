use domain::models::Pin;
use domain::services::BrokerFailurePolicy;
use persistence::PostgrestConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    pub blynk: BlynkConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub approval: ApprovalConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Directory served verbatim for every path not matched by the API.
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Browser origins allowed to call the API with credentials.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
        }
    }
}

/// Blynk cloud broker settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BlynkConfig {
    #[serde(default = "default_blynk_base_url")]
    pub base_url: String,

    /// Device auth token, sent as a query parameter on every call.
    #[serde(default)]
    pub token: String,

    /// Pin wired with reversed polarity.
    #[serde(default = "default_inverted_pin")]
    pub inverted_pin: Pin,

    #[serde(default = "default_temperature_pin")]
    pub temperature_pin: Pin,

    #[serde(default = "default_humidity_pin")]
    pub humidity_pin: Pin,

    #[serde(default = "default_aqi_pin")]
    pub aqi_pin: Pin,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

/// Supabase table API settings. Both `url` and `service_key` must be set
/// for store-backed endpoints to work.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub service_key: String,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl SupabaseConfig {
    /// Client settings, or `None` when either credential is missing.
    pub fn credentials(&self) -> Option<PostgrestConfig> {
        if self.url.trim().is_empty() || self.service_key.trim().is_empty() {
            return None;
        }
        Some(PostgrestConfig {
            url: self.url.trim().to_string(),
            service_key: self.service_key.trim().to_string(),
            timeout_ms: self.timeout_ms,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Role required by the resident login.
    #[serde(default = "default_resident_role")]
    pub resident_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            resident_role: default_resident_role(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalConfig {
    #[serde(default)]
    pub on_broker_failure: BrokerFailurePolicy,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_request_timeout() -> u64 {
    30
}
fn default_frontend_dir() -> String {
    "frontend".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://127.0.0.1:5500".to_string(),
        "http://localhost:3050".to_string(),
    ]
}
fn default_blynk_base_url() -> String {
    "https://blynk.cloud/external/api".to_string()
}
fn default_inverted_pin() -> Pin {
    Pin::new(1)
}
fn default_temperature_pin() -> Pin {
    Pin::new(5)
}
fn default_humidity_pin() -> Pin {
    Pin::new(6)
}
fn default_aqi_pin() -> Pin {
    Pin::new(9)
}
fn default_upstream_timeout_ms() -> u64 {
    10000
}
fn default_resident_role() -> String {
    "homie".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Flat environment variables accepted on top of the `SYNCORA__` ones.
const FLAT_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("PORT", "server.port"),
    ("BLYNK_TOKEN", "blynk.token"),
    ("SUPABASE_URL", "supabase.url"),
    ("SUPABASE_SERVICE_KEY", "supabase.service_key"),
];

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SYNCORA__ prefix
    /// 4. PORT, BLYNK_TOKEN, SUPABASE_URL, SUPABASE_SERVICE_KEY
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SYNCORA").separator("__"));

        for (var, key) in FLAT_ENV_OVERRIDES {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Builds the config from embedded defaults so tests do not depend on
    /// the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 3000
            request_timeout_secs = 30
            frontend_dir = "frontend"

            [logging]
            level = "info"
            format = "json"

            [blynk]
            base_url = "https://blynk.cloud/external/api"
            token = ""
            inverted_pin = "V1"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.blynk.base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "blynk.base_url must be set".to_string(),
            ));
        }

        if self.auth.resident_role.trim().is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "auth.resident_role cannot be empty".to_string(),
            ));
        }

        if self.blynk.token.is_empty() {
            tracing::warn!("BLYNK_TOKEN is not set; broker calls will be rejected upstream");
        }

        Ok(())
    }
}
