//! Server configuration for the Lectern REST API.
//!
//! This module provides configuration types for the REST server, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LECTERN_PORT` | 8080 | Server port |
//! | `LECTERN_HOST` | 127.0.0.1 | Host to bind |
//! | `LECTERN_LOG_LEVEL` | info | Log level |
//! | `LECTERN_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `LECTERN_ENABLE_CORS` | true | Enable CORS |
//! | `LECTERN_CORS_ORIGINS` | * | Allowed origins |
//! | `LECTERN_DEFAULT_TENANT` | default | Default tenant ID |
//! | `LECTERN_BASE_URL` | http://localhost:8080 | Server base URL |
//! | `LECTERN_DATABASE_URL` | lectern.db | SQLite database path |
//! | `LECTERN_JWT_SECRET` | — | HS256 signing secret (32+ bytes) |
//! | `LECTERN_TOKEN_TTL` | 3600 | Session token lifetime (seconds) |
//! | `LECTERN_CACHE_URI` | memory:// | Cache capability URI |
//! | `LECTERN_AUDIT_URI` | log:// | Audit log capability URI |

use clap::Parser;

/// Server configuration for the Lectern REST API.
///
/// Construct from environment variables with [`ServerConfig::from_env`],
/// from command line arguments with [`ServerConfig::parse`], or
/// programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "lectern")]
#[command(about = "Lectern metadata repository server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "LECTERN_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "LECTERN_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "LECTERN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "LECTERN_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "LECTERN_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "LECTERN_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Default tenant ID for requests without an X-Tenant-ID header.
    #[arg(long, env = "LECTERN_DEFAULT_TENANT", default_value = "default")]
    pub default_tenant: String,

    /// Base URL for the server.
    #[arg(long, env = "LECTERN_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Database path (`:memory:` for an in-memory database).
    #[arg(long, env = "LECTERN_DATABASE_URL")]
    pub database_url: Option<String>,

    /// HS256 signing secret for session tokens. Must be at least 32 bytes.
    #[arg(long, env = "LECTERN_JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Session token lifetime in seconds.
    #[arg(long, env = "LECTERN_TOKEN_TTL", default_value = "3600")]
    pub token_ttl: u64,

    /// Cache capability URI.
    #[arg(long, env = "LECTERN_CACHE_URI", default_value = "memory://")]
    pub cache_uri: String,

    /// Audit log capability URI.
    #[arg(long, env = "LECTERN_AUDIT_URI", default_value = "log://")]
    pub audit_uri: String,

    /// Default page size for listings.
    #[arg(long, env = "LECTERN_DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: usize,

    /// Maximum page size for listings and bulk exports.
    #[arg(long, env = "LECTERN_MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            default_tenant: "default".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: None,
            jwt_secret: None,
            token_ttl: 3600,
            cache_uri: "memory://".to_string(),
            audit_uri: "log://".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates a ServerConfig from environment variables, falling back to
    /// defaults without requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        match &self.jwt_secret {
            None => errors.push("JWT secret is required (LECTERN_JWT_SECRET)".to_string()),
            Some(secret) if secret.len() < 32 => {
                errors.push("JWT secret must be at least 32 bytes".to_string())
            }
            Some(_) => {}
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Creates a configuration suitable for testing.
    pub fn for_testing() -> Self {
        Self {
            port: 0, // Let OS assign port
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            default_tenant: "test-tenant".to_string(),
            base_url: "http://localhost:0".to_string(),
            database_url: None,
            jwt_secret: Some("test-secret-which-is-long-enough!!".to_string()),
            token_ttl: 600,
            default_page_size: 10,
            max_page_size: 100,
            ..Default::default()
        }
    }
}
