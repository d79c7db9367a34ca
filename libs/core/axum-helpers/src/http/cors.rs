use axum::http::{HeaderValue, Method, header};
use core_config::{ConfigError, FromEnv, env_first};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Allowed browser origins.
///
/// Read from `CORS_ORIGIN` (or `CORS_ALLOWED_ORIGIN`), comma separated.
/// Defaults to the local storefront dev server.
#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub origins: Vec<HeaderValue>,
}

impl CorsConfig {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(HeaderValue::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::ParseError {
                key: "CORS_ORIGIN".to_string(),
                details: e.to_string(),
            })?;

        if origins.is_empty() {
            return Err(ConfigError::Invalid {
                key: "CORS_ORIGIN".to_string(),
                details: "at least one origin is required".to_string(),
            });
        }
        Ok(Self { origins })
    }
}

impl FromEnv for CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_first(&["CORS_ORIGIN", "CORS_ALLOWED_ORIGIN"])
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        Self::parse(&raw)
    }
}

/// Credentialed CORS for the configured origins.
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.origins.clone()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_origins() {
        let config = CorsConfig::parse("http://localhost:5173, https://deltafashion.dz ,").unwrap();
        assert_eq!(config.origins.len(), 2);
        assert_eq!(config.origins[1], "https://deltafashion.dz");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(CorsConfig::parse(" , ").is_err());
    }

    #[test]
    fn test_from_env_default() {
        temp_env::with_vars(
            [("CORS_ORIGIN", None::<&str>), ("CORS_ALLOWED_ORIGIN", None)],
            || {
                let config = CorsConfig::from_env().unwrap();
                assert_eq!(config.origins, vec![HeaderValue::from_static(DEFAULT_ORIGIN)]);
            },
        );
    }
}
