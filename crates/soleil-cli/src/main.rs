use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use soleil_cli::SunService;
use soleil_config::AppConfig;
use soleil_core::time::parse_timezone;
use soleil_core::{ObservationPoint, PointId};
use soleil_db::DbClient;
use soleil_weather::{OpenMeteoClient, WeatherCache};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sunlight queries for stored venues")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Day timeline in 15-minute steps for one venue
    Timeline {
        #[arg(long)]
        venue: PointId,

        /// Date as YYYY-MM-DD (default: today in the reference timezone)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Sun status of venues around a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Local time as YYYY-MM-DDTHH:MM (default: now)
        #[arg(long, value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,

        /// Search radius in metres
        #[arg(long)]
        radius: Option<f64>,
    },
}

fn parse_local_time(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    soleil_obs::init("soleil");

    let cfg = AppConfig::load().context("Failed to load configuration")?;
    let timezone = parse_timezone(&cfg.timezone())?;

    let database_url = env::var("DATABASE_URL")
        .ok()
        .or_else(|| cfg.database_url())
        .context("DATABASE_URL environment variable not set and no [database] url configured")?;
    let db_client = DbClient::new(&database_url)
        .await
        .context("Failed to connect to database")?;

    let weather_client = OpenMeteoClient::with_timeout(
        cfg.weather_base_url(),
        timezone,
        Duration::from_secs(cfg.weather_timeout_secs()),
    )?;
    let weather = WeatherCache::with_ttl(
        weather_client,
        Duration::from_secs(cfg.weather_cache_ttl_secs()),
    );

    let service = SunService::new(db_client.clone(), weather, timezone)
        .with_nearby_radius(cfg.nearby_radius_m());

    let output = match cli.command {
        Command::Timeline { venue, date } => {
            let date = date.unwrap_or_else(|| service.now().date_naive());
            let timeline = service.timeline(venue, date).await?;
            serde_json::to_string_pretty(&timeline)?
        }
        Command::Nearby {
            lat,
            lon,
            at,
            radius,
        } => {
            let center = ObservationPoint::new(lat, lon)?;
            let at = at.map(|naive| service.local(naive)).unwrap_or_else(|| service.now());
            let report = service.nearby(center, at, radius).await?;
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{}", output);

    db_client.close().await;
    Ok(())
}
