//! MongoDB connectivity and storage helpers shared by the domain crates.
//!
//! - [`mongodb`]: configuration from the environment, connection with retry,
//!   health checks, id/date BSON helpers and duplicate-key detection
//! - [`common`]: retry with exponential backoff
//! - [`slug`]: URL slugs for catalog entities
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;
pub mod mongodb;
pub mod slug;
