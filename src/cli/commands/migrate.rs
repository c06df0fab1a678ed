use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrate requires the postgres backend");
    }

    let manager = DatabaseManager::connect(&config.database).await?;
    manager.migrate().await?;
    manager.close().await;

    output_success(&output_format, "Property schema is up to date", Some(json!({ "table": "properties" })))
}
