use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub progress: ProgressConfig,
    pub import: ImportConfig,
    pub provider: ProviderConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the hosted auth service used for code exchange
    pub url: String,
    /// Public anon key sent as `apikey` to the auth service
    pub anon_key: String,
    /// Elevated credential; elevated database clients exist only when set
    pub service_role_key: Option<String>,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub session_cookie: String,
    pub login_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub default_estimated_time_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub max_file_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub access_key: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("ARTIST_OS_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            self.database.backend = match v.as_str() {
                "memory" => DatabaseBackend::Memory,
                _ => DatabaseBackend::Postgres,
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH_URL") {
            self.auth.url = v;
        }
        if let Ok(v) = env::var("AUTH_ANON_KEY") {
            self.auth.anon_key = v;
        }
        if let Ok(v) = env::var("AUTH_SERVICE_ROLE_KEY") {
            self.auth.service_role_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Ok(v) = env::var("AUTH_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("AUTH_JWT_AUDIENCE") {
            self.auth.jwt_audience = v;
        }
        if let Ok(v) = env::var("AUTH_SESSION_COOKIE") {
            self.auth.session_cookie = v;
        }
        if let Ok(v) = env::var("AUTH_LOGIN_PATH") {
            self.auth.login_path = v;
        }

        // Progress overrides
        if let Ok(v) = env::var("PROGRESS_TTL_SECS") {
            self.progress.ttl_secs = v.parse().unwrap_or(self.progress.ttl_secs);
        }
        if let Ok(v) = env::var("PROGRESS_SWEEP_INTERVAL_SECS") {
            self.progress.sweep_interval_secs = v.parse().unwrap_or(self.progress.sweep_interval_secs);
        }

        // Import overrides
        if let Ok(v) = env::var("IMPORT_MAX_FILE_BYTES") {
            self.import.max_file_bytes = v.parse().unwrap_or(self.import.max_file_bytes);
        }

        // Provider overrides
        if let Ok(v) = env::var("VIBERATE_API_URL") {
            self.provider.base_url = v;
        }
        if let Ok(v) = env::var("VIBERATE_ACCESS_KEY") {
            self.provider.access_key = Some(v).filter(|k| !k.is_empty());
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                backend: DatabaseBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            auth: AuthConfig {
                url: "http://localhost:54321/auth/v1".to_string(),
                anon_key: String::new(),
                service_role_key: None,
                jwt_secret: "dev-only-jwt-secret".to_string(),
                jwt_audience: "authenticated".to_string(),
                session_cookie: "sb-access-token".to_string(),
                login_path: "/login".to_string(),
            },
            progress: ProgressConfig {
                ttl_secs: 60 * 60,
                sweep_interval_secs: 60,
                default_estimated_time_ms: 120_000,
            },
            import: ImportConfig {
                max_file_bytes: 10 * 1024 * 1024, // 10MB
            },
            provider: ProviderConfig {
                base_url: "https://data.viberate.com/api/v1".to_string(),
                access_key: None,
                request_timeout_secs: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                secure_cookies: false,
            },
        }
    }

    pub fn staging() -> Self {
        let dev = Self::development();
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                ..dev.database
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                ..dev.auth
            },
            import: ImportConfig {
                max_file_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.artistos.app".to_string()],
                secure_cookies: true,
            },
            ..dev
        }
    }

    pub fn production() -> Self {
        let dev = Self::development();
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
                ..dev.database
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                ..dev.auth
            },
            import: ImportConfig {
                max_file_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.artistos.app".to_string()],
                secure_cookies: true,
            },
            ..dev
        }
    }

    /// Whether elevated (service-role) database access is available
    pub fn has_service_role(&self) -> bool {
        self.auth.service_role_key.is_some()
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert_eq!(config.progress.default_estimated_time_ms, 120_000);
        assert_eq!(config.auth.session_cookie, "sb-access-token");
        assert!(!config.has_service_role());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.import.max_file_bytes, 2 * 1024 * 1024);
        assert!(config.security.secure_cookies);
        // Shared presets carry over from development
        assert_eq!(config.progress.ttl_secs, 3600);
    }
}
