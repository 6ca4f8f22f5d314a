//! Server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::{Value, json};

use memos_core::token::DEFAULT_TOKEN_TTL_SECS;

/// Default upload limit: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT".to_string(),
                reason: format!("expected text or json, got {:?}", other),
            }),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database connection URL.
    pub database_url: String,
    /// HMAC key for access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expiry_secs: i64,
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    pub log_format: LogFormat,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Root directory of the local object store.
    pub blob_root: PathBuf,
    /// Public URL the blob root is served under.
    pub blob_public_url: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
    /// Externally visible base URL of this instance.
    pub instance_url: String,
    /// Workspace settings used until a host saves an override.
    pub workspace: WorkspaceDefaults,
}

impl ServerConfig {
    /// Configuration with every optional value at its default.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        let port = 3000;
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiry_secs: DEFAULT_TOKEN_TTL_SECS,
            port,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cors_allowed_origins: "*".to_string(),
            blob_root: PathBuf::from("./blobs"),
            blob_public_url: format!("http://localhost:{}/blobs", port),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            instance_url: format!("http://localhost:{}", port),
            workspace: WorkspaceDefaults::new(DEFAULT_MAX_UPLOAD_BYTES),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`: Database connection string
    /// - `JWT_SECRET`: Token signing key
    ///
    /// Optional:
    /// - `JWT_EXPIRY_SECS`: Token lifetime (default: 604800)
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `LOG_FORMAT`: "text" or "json" (default: "text")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `BLOB_ROOT`: Object store directory (default: "./blobs")
    /// - `BLOB_PUBLIC_URL`: Blob download base (default: "http://localhost:{PORT}/blobs")
    /// - `MAX_UPLOAD_BYTES`: Upload limit (default: 104857600)
    /// - `INSTANCE_URL`: Public base URL (default: "http://localhost:{PORT}")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
        };

        let mut config = Self::new(required("DATABASE_URL")?, required("JWT_SECRET")?);

        if let Some(secs) = parse_var::<i64, _>(&lookup, "JWT_EXPIRY_SECS")? {
            if secs <= 0 {
                return Err(ConfigError::InvalidValue {
                    name: "JWT_EXPIRY_SECS".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            config.jwt_expiry_secs = secs;
        }

        if let Some(port) = parse_var::<u16, _>(&lookup, "PORT")? {
            config.port = port;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors_allowed_origins = origins;
        }

        if let Some(root) = lookup("BLOB_ROOT") {
            config.blob_root = PathBuf::from(root);
        }

        if let Some(max) = parse_var::<usize, _>(&lookup, "MAX_UPLOAD_BYTES")? {
            config.max_upload_bytes = max;
        }

        config.blob_public_url = lookup("BLOB_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}/blobs", config.port));
        config.instance_url = lookup("INSTANCE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", config.port));
        config.workspace = WorkspaceDefaults::new(config.max_upload_bytes);

        Ok(config)
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

// ============================================================================
// Workspace settings
// ============================================================================

/// Keys of the workspace setting documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceSettingKey {
    General,
    MemoRelated,
    Storage,
}

impl WorkspaceSettingKey {
    pub const ALL: [Self; 3] = [Self::General, Self::MemoRelated, Self::Storage];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::MemoRelated => "MEMO_RELATED",
            Self::Storage => "STORAGE",
        }
    }

    /// Resource name, `settings/{KEY}`.
    pub fn resource_name(&self) -> String {
        format!("settings/{}", self.as_str())
    }

    /// Parse either a bare key or a `settings/{KEY}` resource name.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.strip_prefix("settings/").unwrap_or(name);
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// Default workspace setting documents.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceDefaults {
    general: Value,
    memo_related: Value,
    storage: Value,
}

impl WorkspaceDefaults {
    /// Defaults whose storage upload limit reflects `max_upload_bytes`.
    pub fn new(max_upload_bytes: usize) -> Self {
        Self {
            general: json!({
                "name": "settings/GENERAL",
                "generalSetting": {
                    "disallowUserRegistration": false,
                    "disallowPasswordAuth": false,
                    "additionalScript": "",
                    "additionalStyle": "",
                    "customProfile": {
                        "title": "Memos",
                        "description": "A privacy-first, lightweight note-taking service",
                        "logoUrl": "/logo.webp",
                        "locale": "zh",
                        "appearance": "system"
                    },
                    "weekStartDayOffset": 0,
                    "disallowChangeUsername": false,
                    "disallowChangeNickname": false
                }
            }),
            memo_related: json!({
                "name": "settings/MEMO_RELATED",
                "memoRelatedSetting": {
                    "disallowPublicVisibility": false,
                    "displayWithUpdateTime": false,
                    "contentLengthLimit": 10000,
                    "enableAutoCompact": false,
                    "enableDoubleClickEdit": true,
                    "enableLinkPreview": true,
                    "enableComment": true,
                    "enableLocation": true,
                    "enableTagSuggestion": true,
                    "disableMarkdownShortcuts": false,
                    "reactions": ["👍", "👎", "❤️", "😄", "😢", "😮", "😠"]
                }
            }),
            storage: json!({
                "name": "settings/STORAGE",
                "storageSetting": {
                    "storageType": "LOCAL",
                    "filepathTemplate": "{{filename}}",
                    "uploadSizeLimitMb": max_upload_bytes / (1024 * 1024)
                }
            }),
        }
    }

    pub fn get(&self, key: WorkspaceSettingKey) -> &Value {
        match key {
            WorkspaceSettingKey::General => &self.general,
            WorkspaceSettingKey::MemoRelated => &self.memo_related,
            WorkspaceSettingKey::Storage => &self.storage,
        }
    }
}

impl Default for WorkspaceDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}
