use core_config::{ConfigError, Environment, FromEnv, env_first, env_parse};

const LOCAL_URL: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "delta_fashion";

/// MongoDB connection settings
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,
    pub database: String,
    /// Reported to the server in connection handshakes
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: LOCAL_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            app_name: None,
            max_pool_size: 50,
            min_pool_size: 2,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Environment variables:
/// - `MONGODB_URI`, `MONGODB_URL` or `MONGO_URL`: connection string, required
///   in production, `mongodb://localhost:27017` otherwise
/// - `MONGODB_DATABASE` or `MONGO_DATABASE` (default: `delta_fashion`)
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (default: 50), `MONGODB_MIN_POOL_SIZE` (default: 2)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default: 30)
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = match env_first(&["MONGODB_URI", "MONGODB_URL", "MONGO_URL"]) {
            Some(url) => url,
            None if Environment::from_env().is_production() => {
                return Err(ConfigError::MissingEnvVar(
                    "MONGODB_URI, MONGODB_URL or MONGO_URL".to_string(),
                ));
            }
            None => LOCAL_URL.to_string(),
        };

        let database = env_first(&["MONGODB_DATABASE", "MONGO_DATABASE"])
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let max_pool_size = env_parse("MONGODB_MAX_POOL_SIZE", 50)?;
        let min_pool_size = env_parse("MONGODB_MIN_POOL_SIZE", 2)?;
        if min_pool_size > max_pool_size {
            return Err(ConfigError::Invalid {
                key: "MONGODB_MIN_POOL_SIZE".to_string(),
                details: format!("must not exceed MONGODB_MAX_POOL_SIZE ({max_pool_size})"),
            });
        }

        Ok(Self {
            url,
            database,
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size,
            min_pool_size,
            connect_timeout_secs: env_parse("MONGODB_CONNECT_TIMEOUT_SECS", 10)?,
            server_selection_timeout_secs: env_parse(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                30,
            )?,
        })
    }
}
