//! MongoDB connector and helpers

mod bson;
mod config;
mod connector;
mod errors;
mod health;

pub use bson::{contains_ci, date_bson, id_bson, id_filter, ids_bson, value_bson};
pub use config::MongoConfig;
pub use connector::{MongoError, connect_from_config, connect_from_config_with_retry};
pub use errors::{DUPLICATE_KEY_CODE, is_duplicate_key, is_duplicate_key_on};
pub use health::ping;

pub use mongodb::{Client, Collection, Database};
