use crate::{cli::MigrateCommand, commands::print_json};
use gastro_review_database::queries;
use serde_json::json;
use tracing::info;

pub async fn exec(command: MigrateCommand) -> anyhow::Result<()> {
    let (config, pool) = super::connect(command.args).await?;

    // `connect` already migrated when the configuration asked for it.
    if !config.run_migrations {
        let mut conn = pool.acquire().await?;
        queries::run_migration(&mut conn).await?;
        info!("Database migrations applied.");
    }

    print_json(&json!({ "migrated": true }))
}
