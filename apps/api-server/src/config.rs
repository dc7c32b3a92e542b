//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quill_core::domain::CreateRules;
use quill_infra::{JwtConfig, RateLimitConfig};

use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `RUST_ENV` is `production` or `prod`.
    pub production: bool,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitSettings,
    pub cors: CorsSettings,
    pub telemetry: TelemetryConfig,
}

/// Where posts live and what a create must carry.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// JSON file backing the store. In-memory when unset.
    pub posts_file: Option<PathBuf>,
    pub require_author: bool,
}

impl StorageConfig {
    pub fn create_rules(&self) -> CreateRules {
        CreateRules {
            require_author: self.require_author,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Require a Bearer token on post mutations.
    pub required: bool,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub quota: RateLimitConfig,
}

/// Cross-origin access for browser clients.
#[derive(Debug, Clone, Default)]
pub struct CorsSettings {
    /// Exact origins allowed. Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl CorsSettings {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

fn origin_list(value: Option<String>) -> Vec<String> {
    let origins: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();
    // `*` anywhere in the list means any origin.
    if origins.iter().any(|o| o == "*") {
        return Vec::new();
    }
    origins
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn flag_or(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") | Some("on") => true,
        Some("0") | Some("false") | Some("no") | Some("off") => false,
        _ => default,
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let posts_file = lookup("POSTS_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        // The file-backed store expects an author on every post.
        let require_author = flag_or(lookup("POSTS_REQUIRE_AUTHOR"), posts_file.is_some());

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").unwrap_or(jwt_defaults.secret),
            expiration_hours: parse_or(
                lookup("JWT_EXPIRATION_HOURS"),
                jwt_defaults.expiration_hours,
            ),
            issuer: lookup("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
        };

        let quota_defaults = RateLimitConfig::default();
        let quota = RateLimitConfig {
            max_requests: parse_or(
                lookup("RATE_LIMIT_MAX_REQUESTS"),
                quota_defaults.max_requests,
            ),
            window: Duration::from_secs(parse_or(
                lookup("RATE_LIMIT_WINDOW_SECS"),
                quota_defaults.window.as_secs(),
            )),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(lookup("PORT"), 5002),
            production: lookup("RUST_ENV").is_some_and(|v| v == "production" || v == "prod"),
            storage: StorageConfig {
                posts_file,
                require_author,
            },
            auth: AuthConfig {
                required: flag_or(lookup("AUTH_REQUIRED"), false),
                jwt,
            },
            rate_limit: RateLimitSettings {
                enabled: flag_or(lookup("RATE_LIMIT_ENABLED"), true),
                quota,
            },
            cors: CorsSettings {
                allowed_origins: origin_list(lookup("CORS_ALLOWED_ORIGINS")),
            },
            telemetry: TelemetryConfig {
                json_logs: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
                service_name: lookup("SERVICE_NAME").unwrap_or_else(|| "quill-api".to_string()),
            },
        }
    }

    /// Log configuration that is fine for development but not for production.
    pub fn warn_on_insecure_defaults(&self) {
        if self.production && self.cors.allows_any_origin() {
            tracing::warn!("CORS allows any origin. Set CORS_ALLOWED_ORIGINS to restrict it.");
        }
        if !self.auth.jwt.uses_dev_secret() {
            return;
        }
        if self.production {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        } else {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5002);
        assert!(config.storage.posts_file.is_none());
        assert!(!config.storage.require_author);
        assert!(!config.auth.required);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.quota.max_requests, 100);
        assert!(!config.telemetry.json_logs);
        assert!(config.cors.allows_any_origin());
    }

    #[test]
    fn test_cors_origins() {
        let config = load(&[(
            "CORS_ALLOWED_ORIGINS",
            " https://blog.example.com/ , http://localhost:3000,,",
        )]);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://blog.example.com", "http://localhost:3000"]
        );

        let config = load(&[("CORS_ALLOWED_ORIGINS", "https://a.example, *")]);
        assert!(config.cors.allows_any_origin());
    }

    #[test]
    fn test_posts_file_requires_author_by_default() {
        let config = load(&[("POSTS_FILE", "data/posts.json")]);
        assert_eq!(
            config.storage.posts_file,
            Some(PathBuf::from("data/posts.json"))
        );
        assert!(config.storage.require_author);

        let overridden = load(&[
            ("POSTS_FILE", "posts.json"),
            ("POSTS_REQUIRE_AUTHOR", "false"),
        ]);
        assert!(!overridden.storage.require_author);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "9000"),
            ("AUTH_REQUIRED", "true"),
            ("RATE_LIMIT_ENABLED", "0"),
            ("RATE_LIMIT_MAX_REQUESTS", "10"),
            ("RATE_LIMIT_WINDOW_SECS", "5"),
            ("JWT_SECRET", "s3cret"),
            ("LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(config.port, 9000);
        assert!(config.auth.required);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.quota.max_requests, 10);
        assert_eq!(config.rate_limit.quota.window, Duration::from_secs(5));
        assert!(!config.auth.jwt.uses_dev_secret());
        assert!(config.telemetry.json_logs);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = load(&[("PORT", "http"), ("AUTH_REQUIRED", "maybe")]);
        assert_eq!(config.port, 5002);
        assert!(!config.auth.required);
    }
}
