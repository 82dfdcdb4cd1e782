use clap::Parser;
use tracing_subscriber::EnvFilter;
use userbase_api::cli::Cli;
use userbase_api::is_development;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = userbase_api::config::config();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.api.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting userbase API in {:?} mode", config.environment);
    if is_development!() && std::env::var("DATABASE_URL").is_err() {
        tracing::info!("DATABASE_URL not set; using the development default");
    }

    if let Err(e) = userbase_api::cli::run(cli, config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
