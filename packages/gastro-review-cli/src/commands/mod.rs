pub mod association;
pub mod entity;
pub mod health;
pub mod migrate;

use gastro_review_database::{queries, ReviewConnectionPool};
use gastro_review_lib::{
    config::{ReviewArgs, ReviewConfig},
    utils::init_logging,
};
use serde::Serialize;
use tracing::info;

/// Load the configuration, start logging and open the connection pool.
pub(crate) async fn connect(args: ReviewArgs) -> anyhow::Result<(ReviewConfig, ReviewConnectionPool)> {
    let config = ReviewConfig::from_args(args)?;

    init_logging(&config)?;

    info!("Configuration: {:?}", config);

    let pool = ReviewConnectionPool::connect(&config.database.to_string()).await?;

    if config.run_migrations {
        let mut conn = pool.acquire().await?;
        queries::run_migration(&mut conn).await?;
        info!("Database migrations applied.");
    }

    Ok((config, pool))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
