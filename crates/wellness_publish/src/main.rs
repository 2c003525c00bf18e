use anyhow::Result;
use clap::Parser;
use fitbit_wellness::{Config, EnvFileStore};

#[derive(Debug, Parser)]
#[command(name = "wellness-publish")]
#[command(about = "Publish daily Fitbit health data to Intervals.icu")]
struct Cli {
    /// Date to publish (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<String>,
}

fn parse_date(raw: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|_| raw.to_string())
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Log filter from `WELLNESS_LOG_LEVEL` (or `RUST_LOG`, default `info`);
    // logs go to stderr so stdout carries only the upsert response.
    let log_env = std::env::var("WELLNESS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();
    let date = cli.date.unwrap_or_else(wellness_publish::today_iso);

    let config = Config::from_env()?;
    let store = EnvFileStore::new(".env");
    let response = wellness_publish::publish_daily(&config, &store, &date).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
