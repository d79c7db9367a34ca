use core_config::{ConfigError, Environment, FromEnv, env_parse};
use std::time::Duration;

const MIN_SECRET_LEN: usize = 32;
const DEV_SECRET: &str = "delta-fashion-development-secret-change-me";

/// JWT signing configuration.
///
/// - `JWT_SECRET`: HMAC secret, at least 32 characters. Required in
///   production; development falls back to a fixed local secret.
/// - `JWT_EXPIRES_IN_HOURS`: token lifetime (default: 168, one week)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }
        if ttl.is_zero() {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRES_IN_HOURS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }
        Ok(Self { secret, ttl })
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if Environment::from_env().is_production() => {
                return Err(ConfigError::MissingEnvVar("JWT_SECRET".to_string()));
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_SECRET.to_string()
            }
        };
        let hours: u64 = env_parse("JWT_EXPIRES_IN_HOURS", 168)?;

        Self::new(secret, Duration::from_secs(hours * 3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_rejects_short_secret() {
        let err = JwtConfig::new("short", Duration::from_secs(60)).unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_jwt_config_from_env() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_EXPIRES_IN_HOURS", Some("2")),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.ttl, Duration::from_secs(7200));
            },
        );
    }

    #[test]
    fn test_jwt_config_dev_fallback() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", None::<&str>),
                ("APP_ENV", None),
                ("JWT_EXPIRES_IN_HOURS", None),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.ttl, Duration::from_secs(168 * 3600));
            },
        );
    }

    #[test]
    fn test_jwt_config_required_in_production() {
        temp_env::with_vars(
            [("JWT_SECRET", None::<&str>), ("APP_ENV", Some("production"))],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_SECRET"));
            },
        );
    }
}
