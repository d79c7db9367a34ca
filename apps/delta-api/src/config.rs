use axum_helpers::{CorsConfig, JwtConfig};
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_parse, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_orders::ShippingRates;
use uploads::UploadConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub uploads: UploadConfig,
    pub shipping: ShippingRates,
    pub low_stock_threshold: i32,
}

impl Config {
    /// Load from the environment, reading `.env` first when present
    pub fn from_env() -> eyre::Result<Self> {
        let _ = dotenvy::dotenv();

        let app = app_info!();
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?.with_app_name(app.name);

        Ok(Self {
            app,
            environment,
            mongodb,
            server: ServerConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            uploads: UploadConfig::from_env()?,
            shipping: shipping_from_env()?,
            low_stock_threshold: low_stock_threshold_from_env()?,
        })
    }
}

/// - `SHIPPING_FLAT_RATE` (default: 500)
/// - `FREE_SHIPPING_THRESHOLD` (default: 10000)
fn shipping_from_env() -> Result<ShippingRates, ConfigError> {
    let defaults = ShippingRates::default();
    let flat_rate = env_parse("SHIPPING_FLAT_RATE", defaults.flat_rate)?;
    let free_threshold = env_parse("FREE_SHIPPING_THRESHOLD", defaults.free_threshold)?;

    if flat_rate < 0 || free_threshold < 0 {
        return Err(ConfigError::Invalid {
            key: "SHIPPING_FLAT_RATE".to_string(),
            details: "shipping amounts cannot be negative".to_string(),
        });
    }

    Ok(ShippingRates {
        flat_rate,
        free_threshold,
    })
}

fn low_stock_threshold_from_env() -> Result<i32, ConfigError> {
    let threshold = env_parse("LOW_STOCK_THRESHOLD", 5)?;
    if threshold < 0 {
        return Err(ConfigError::Invalid {
            key: "LOW_STOCK_THRESHOLD".to_string(),
            details: "must not be negative".to_string(),
        });
    }
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_defaults() {
        temp_env::with_vars(
            [
                ("SHIPPING_FLAT_RATE", None::<&str>),
                ("FREE_SHIPPING_THRESHOLD", None),
            ],
            || {
                let rates = shipping_from_env().unwrap();
                assert_eq!(rates, ShippingRates::default());
            },
        );
    }

    #[test]
    fn test_shipping_overrides_and_rejects_negative() {
        temp_env::with_vars(
            [
                ("SHIPPING_FLAT_RATE", Some("750")),
                ("FREE_SHIPPING_THRESHOLD", Some("20000")),
            ],
            || {
                let rates = shipping_from_env().unwrap();
                assert_eq!(rates.flat_rate, 750);
                assert_eq!(rates.free_threshold, 20_000);
            },
        );

        temp_env::with_var("SHIPPING_FLAT_RATE", Some("-1"), || {
            assert!(matches!(
                shipping_from_env(),
                Err(ConfigError::Invalid { .. })
            ));
        });
    }

    #[test]
    fn test_low_stock_threshold() {
        temp_env::with_var_unset("LOW_STOCK_THRESHOLD", || {
            assert_eq!(low_stock_threshold_from_env().unwrap(), 5);
        });
        temp_env::with_var("LOW_STOCK_THRESHOLD", Some("many"), || {
            assert!(matches!(
                low_stock_threshold_from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }

    #[test]
    fn test_development_config_loads_with_defaults() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("development")),
                ("MONGODB_URI", None::<&str>),
                ("MONGODB_URL", None),
                ("MONGO_URL", None),
                ("JWT_SECRET", None),
                ("PORT", Some("9090")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_development());
                assert_eq!(config.mongodb.url(), "mongodb://localhost:27017");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.app.name, "delta_api");
            },
        );
    }
}
