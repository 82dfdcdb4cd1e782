pub mod commands;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "userbase-api")]
#[command(about = "Users, partners, logins, surveys, journals and events over HTTP")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Report command results as JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default when no command is given)")]
    Serve(ServeArgs),

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Insert sample users, partners and events; no-op when users exist")]
    Seed,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Listen port, overrides PORT / API_PORT")]
    pub port: Option<u16>,

    #[arg(long, help = "Serve from an in-process store instead of Postgres")]
    pub memory: bool,

    #[arg(long, help = "Seed sample data before serving")]
    pub seed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli, config: &AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        None => commands::serve::handle(ServeArgs::default(), config).await,
        Some(Commands::Serve(args)) => commands::serve::handle(args, config).await,
        Some(Commands::Migrate) => commands::migrate::handle(config, output_format).await,
        Some(Commands::Seed) => commands::seed::handle(config, output_format).await,
    }
}
