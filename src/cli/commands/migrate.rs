use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::bootstrap(&pool, &config.environment).await?;
    pool.close().await;

    match output_format {
        OutputFormat::Text => println!("Migrations applied"),
        OutputFormat::Json => println!("{}", json!({ "success": true, "migrated": true })),
    }
    Ok(())
}
