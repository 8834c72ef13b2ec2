//! Application configuration module
//!
//! Configuration is assembled in three layers, later layers winning:
//!
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. An optional TOML file named by `USERHUB_CONFIG`
//! 3. Environment variables (`SERVER_PORT`, `DATABASE_URL`, `JWT_SECRET`, ...)
//!
//! The TOML file uses the environment key names in lower case:
//!
//! ```toml
//! server_port = 8080
//! jwt_secret = "dev-secret"
//! ws_heartbeat_interval_seconds = 15
//! s3_bucket = "uploads"
//! kafka_brokers = "localhost:9092"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the optional TOML file
pub const CONFIG_FILE_ENV: &str = "USERHUB_CONFIG";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_ROLE: &str = "ROLE_ADMIN";
pub const DEFAULT_BUCKET: &str = "userhub";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Bearer token validation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    /// Shared secret for HS256 tokens
    pub secret: Option<String>,
    /// PEM public key for RS256 tokens, preferred over `secret` when set
    pub public_key_pem: Option<String>,
    /// Expected `iss` claim
    pub issuer: Option<String>,
    /// Realm role required on protected routes
    pub admin_role: String,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: None,
            public_key_pem: None,
            issuer: None,
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
        }
    }
}

/// WebSocket session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    /// Evict sessions that stop answering pings
    pub stale_check: bool,
    pub heartbeat_interval: Duration,
    pub stale_threshold: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            stale_check: true,
            heartbeat_interval: Duration::from_secs(30),
            stale_threshold: Duration::from_secs(90),
        }
    }
}

/// S3-compatible object storage (MinIO in development)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Endpoint URL; `None` keeps uploads in memory
    pub url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: String,
    pub region: String,
    /// Key prefix inside the bucket
    pub folder: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            url: None,
            access_key: None,
            secret_key: None,
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            folder: None,
        }
    }
}

/// Kafka topics and connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    /// Bootstrap servers; `None` leaves the transport off
    pub brokers: Option<String>,
    pub group_id: String,
    /// Topic app events are published to
    pub tx_topic: String,
    /// Topic of events broadcast to local clients
    pub rx_topic: String,
    /// Topic of identity provider user events
    pub keycloak_topic: String,
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            brokers: None,
            group_id: "userhub".to_string(),
            tx_topic: "sample".to_string(),
            rx_topic: "sample_response".to_string(),
            keycloak_topic: "keycloak-events".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub jwt: JwtSettings,
    pub chat: ChatSettings,
    /// Interval of SSE `heartbeat` events
    pub sse_heartbeat: Duration,
    pub storage: StorageSettings,
    pub kafka: KafkaSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt: JwtSettings::default(),
            chat: ChatSettings::default(),
            sse_heartbeat: Duration::from_secs(10),
            storage: StorageSettings::default(),
            kafka: KafkaSettings::default(),
        }
    }
}

/// Keys accepted in the TOML file
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_public_key_pem: Option<String>,
    pub jwt_issuer: Option<String>,
    pub auth_admin_role: Option<String>,
    pub ws_stale_check: Option<bool>,
    pub ws_heartbeat_interval_seconds: Option<u64>,
    pub ws_stale_threshold_seconds: Option<u64>,
    pub sse_heartbeat_seconds: Option<u64>,
    pub s3_url: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_folder: Option<String>,
    pub kafka_brokers: Option<String>,
    pub kafka_group_id: Option<String>,
    pub kafka_tx_topic: Option<String>,
    pub kafka_rx_topic: Option<String>,
    pub kafka_keycloak_topic: Option<String>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load defaults, then the optional file, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            config = config.merge_file(Path::new(&path))?;
        }
        let config = config.merge_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the values of a TOML file
    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: FileConfig = toml::from_str(&raw)?;
        Ok(self.merge(file))
    }

    /// Apply values found through `lookup` (normally `std::env::var`)
    pub fn merge_env<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = FileConfig {
            server_port: text("SERVER_PORT").map(|v| parse("SERVER_PORT", &v)).transpose()?,
            database_url: text("DATABASE_URL"),
            jwt_secret: text("JWT_SECRET"),
            jwt_public_key_pem: text("JWT_PUBLIC_KEY_PEM"),
            jwt_issuer: text("JWT_ISSUER"),
            auth_admin_role: text("AUTH_ADMIN_ROLE"),
            ws_stale_check: text("WS_STALE_CHECK")
                .map(|v| parse("WS_STALE_CHECK", &v))
                .transpose()?,
            ws_heartbeat_interval_seconds: text("WS_HEARTBEAT_INTERVAL_SECONDS")
                .map(|v| parse("WS_HEARTBEAT_INTERVAL_SECONDS", &v))
                .transpose()?,
            ws_stale_threshold_seconds: text("WS_STALE_THRESHOLD_SECONDS")
                .map(|v| parse("WS_STALE_THRESHOLD_SECONDS", &v))
                .transpose()?,
            sse_heartbeat_seconds: text("SSE_HEARTBEAT_SECONDS")
                .map(|v| parse("SSE_HEARTBEAT_SECONDS", &v))
                .transpose()?,
            s3_url: text("S3_URL"),
            s3_access_key: text("S3_ACCESS_KEY"),
            s3_secret_key: text("S3_SECRET_KEY"),
            s3_bucket: text("S3_BUCKET"),
            s3_region: text("S3_REGION"),
            s3_folder: text("S3_FOLDER"),
            kafka_brokers: text("KAFKA_BROKERS"),
            kafka_group_id: text("KAFKA_GROUP_ID"),
            kafka_tx_topic: text("KAFKA_TX_TOPIC"),
            kafka_rx_topic: text("KAFKA_RX_TOPIC"),
            kafka_keycloak_topic: text("KAFKA_KEYCLOAK_TOPIC"),
        };
        Ok(self.merge(file))
    }

    fn merge(mut self, file: FileConfig) -> Self {
        if let Some(port) = file.server_port {
            self.port = port;
        }
        if file.database_url.is_some() {
            self.database_url = file.database_url;
        }
        if file.jwt_secret.is_some() {
            self.jwt.secret = file.jwt_secret;
        }
        if file.jwt_public_key_pem.is_some() {
            self.jwt.public_key_pem = file.jwt_public_key_pem;
        }
        if file.jwt_issuer.is_some() {
            self.jwt.issuer = file.jwt_issuer;
        }
        if let Some(role) = file.auth_admin_role {
            self.jwt.admin_role = role;
        }
        if let Some(stale_check) = file.ws_stale_check {
            self.chat.stale_check = stale_check;
        }
        if let Some(secs) = file.ws_heartbeat_interval_seconds {
            self.chat.heartbeat_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.ws_stale_threshold_seconds {
            self.chat.stale_threshold = Duration::from_secs(secs);
        }
        if let Some(secs) = file.sse_heartbeat_seconds {
            self.sse_heartbeat = Duration::from_secs(secs);
        }

        let storage = &mut self.storage;
        if file.s3_url.is_some() {
            storage.url = file.s3_url;
        }
        if file.s3_access_key.is_some() {
            storage.access_key = file.s3_access_key;
        }
        if file.s3_secret_key.is_some() {
            storage.secret_key = file.s3_secret_key;
        }
        if let Some(bucket) = file.s3_bucket {
            storage.bucket = bucket;
        }
        if let Some(region) = file.s3_region {
            storage.region = region;
        }
        if file.s3_folder.is_some() {
            storage.folder = file.s3_folder;
        }

        let kafka = &mut self.kafka;
        if file.kafka_brokers.is_some() {
            kafka.brokers = file.kafka_brokers;
        }
        if let Some(group) = file.kafka_group_id {
            kafka.group_id = group;
        }
        if let Some(topic) = file.kafka_tx_topic {
            kafka.tx_topic = topic;
        }
        if let Some(topic) = file.kafka_rx_topic {
            kafka.rx_topic = topic;
        }
        if let Some(topic) = file.kafka_keycloak_topic {
            kafka.keycloak_topic = topic;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.heartbeat_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "WS_HEARTBEAT_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }
        if self.chat.stale_threshold < self.chat.heartbeat_interval {
            return Err(ConfigError::Invalid(
                "WS_STALE_THRESHOLD_SECONDS must not be shorter than the heartbeat interval"
                    .to_string(),
            ));
        }
        if self.sse_heartbeat.is_zero() {
            return Err(ConfigError::Invalid(
                "SSE_HEARTBEAT_SECONDS must be greater than zero".to_string(),
            ));
        }
        if self.jwt.secret.is_none() && self.jwt.public_key_pem.is_none() {
            return Err(ConfigError::MissingValue("JWT_SECRET or JWT_PUBLIC_KEY_PEM"));
        }
        if self.jwt.admin_role.trim().is_empty() {
            return Err(ConfigError::MissingValue("AUTH_ADMIN_ROLE"));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::MissingValue("S3_BUCKET"));
        }
        if self.storage.url.is_some()
            && (self.storage.access_key.is_none() || self.storage.secret_key.is_none())
        {
            return Err(ConfigError::MissingValue("S3_ACCESS_KEY and S3_SECRET_KEY"));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt.secret = Some(secret.into());
        self
    }

    pub fn jwt_public_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.config.jwt.public_key_pem = Some(pem.into());
        self
    }

    pub fn jwt_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.config.jwt.issuer = Some(issuer.into());
        self
    }

    pub fn admin_role(mut self, role: impl Into<String>) -> Self {
        self.config.jwt.admin_role = role.into();
        self
    }

    pub fn stale_check(mut self, enabled: bool) -> Self {
        self.config.chat.stale_check = enabled;
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.chat.heartbeat_interval = interval;
        self
    }

    pub fn stale_threshold(mut self, threshold: Duration) -> Self {
        self.config.chat.stale_threshold = threshold;
        self
    }

    pub fn sse_heartbeat(mut self, interval: Duration) -> Self {
        self.config.sse_heartbeat = interval;
        self
    }

    pub fn storage(mut self, storage: StorageSettings) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn kafka(mut self, kafka: KafkaSettings) -> Self {
        self.config.kafka = kafka;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("cannot read config file {path}: {message}")]
    Io { path: String, message: String },
    #[error("malformed config file: {0}")]
    Toml(#[from] toml::de::Error),
}
