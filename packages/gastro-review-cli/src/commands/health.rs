use crate::{cli::HealthCommand, commands::print_json};
use gastro_review_lib::utils::ServiceStatus;
use serde_json::json;
use tracing::error;

pub async fn exec(command: HealthCommand) -> anyhow::Result<()> {
    let (_config, pool) = super::connect(command.args).await?;

    let status = match pool.is_connected().await {
        Ok(status) => status,
        Err(e) => {
            error!("Database health check failed: {e}");
            ServiceStatus::NotOk
        }
    };

    print_json(&json!({ "database": status }))?;

    match status {
        ServiceStatus::OK => Ok(()),
        ServiceStatus::NotOk => anyhow::bail!("Database is not healthy."),
    }
}
