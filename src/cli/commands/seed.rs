use anyhow::Context;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{seed::seed, DatabaseManager, PgStore};

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::bootstrap(&pool, &config.environment).await?;

    let store = PgStore::new(pool.clone());
    let inserted = seed(&store).await.context("failed to seed sample data")?;
    pool.close().await;

    match output_format {
        OutputFormat::Text if inserted == 0 => println!("Seed skipped: users already exist"),
        OutputFormat::Text => println!("Seeded {} rows", inserted),
        OutputFormat::Json => println!("{}", json!({ "success": true, "inserted": inserted })),
    }
    Ok(())
}
