// One-shot maintenance entry point.
//
// Invoked by the external daemon when local time passes midnight; the run
// itself holds a store-level advisory lock, so an overlapping trigger is a
// no-op.

use anyhow::{Context, Result};
use server_core::domains::maintenance;
use server_core::kernel::ServerDeps;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let deps = ServerDeps::from_config(pool, &config);
    maintenance::run(&deps).await
}
