//! Delta Fashion operator CLI.
//!
//! ```bash
//! # Create an admin account (password from the flag or DELTA_ADMIN_PASSWORD)
//! delta-cli create-admin -e admin@example.com --first-name Awa --last-name Diallo
//!
//! # Load demo categories, products and banners into an empty catalog
//! delta-cli seed
//!
//! # Give order numbers to orders saved without one
//! delta-cli backfill-order-numbers
//! ```
//!
//! Connection settings come from the same environment variables as the API
//! (`MONGODB_URI`, `MONGODB_DATABASE`, ...), with `.env` loaded first.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use database::mongodb::MongoConfig;
use mongodb::Database;
use tracing::info;

mod commands;

#[derive(Parser)]
#[command(name = "delta-cli")]
#[command(author, version, about = "Delta Fashion operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// 8 to 128 characters with at least one letter and one digit
        #[arg(short, long, env = "DELTA_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Load demo catalog data; skipped when categories already exist
    Seed,
    /// Assign order numbers to orders that have none
    BackfillOrderNumbers,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    let _ = dotenvy::dotenv();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();
    let db = connect().await?;

    match cli.command {
        Commands::CreateAdmin {
            email,
            first_name,
            last_name,
            password,
        } => commands::admin::create_admin(&db, email, first_name, last_name, password).await?,
        Commands::Seed => commands::seed::run(&db).await?,
        Commands::BackfillOrderNumbers => commands::backfill::run(&db).await?,
    }
    Ok(())
}

async fn connect() -> eyre::Result<Database> {
    let config = MongoConfig::from_env()?.with_app_name("delta-cli");
    let client = database::mongodb::connect_from_config_with_retry(&config, None).await?;
    info!("Connected to MongoDB database {}", config.database());
    Ok(client.database(config.database()))
}
