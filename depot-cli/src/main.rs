//! Depot CLI
//!
//! Runs the warehouse weather API and performs one-off weather lookups.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use depot_api::{ApiConfig, ApiServer};
use depot_core::constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_WEATHER_API_BASE};
use depot_core::traits::WeatherProvider;
use depot_core::types::Coordinates;
use depot_weather::{WeatherClient, WeatherConfig};

/// Depot - warehouse inventory with cached weather lookups
#[derive(Parser)]
#[command(name = "depot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Look up current weather for a city
    Weather {
        /// City name, e.g. "Denver"
        city: String,
        /// Weather API key
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Weather API base URL
        #[arg(long, env = "OPENWEATHER_API_BASE", default_value = DEFAULT_WEATHER_API_BASE)]
        api_base: String,
        /// Latitude, skips geocoding when given with --lon
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude, skips geocoding when given with --lat
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
        timeout: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parses arguments after loading `.env`, so `env` fallbacks see its values.
fn parse_cli<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let _ = dotenvy::dotenv();
    Cli::try_parse_from(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli(std::env::args_os()).unwrap_or_else(|e| e.exit());

    // Initialize logging
    let filter = if cli.verbose {
        "depot=debug,info"
    } else {
        "depot=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(port, &bind).await,
        Commands::Weather {
            city,
            api_key,
            api_base,
            lat,
            lon,
            timeout,
            json,
        } => {
            let config = WeatherConfig::new(api_key)
                .with_api_base(api_base)
                .with_timeout_seconds(timeout);
            let known = match (lat, lon) {
                (Some(lat), Some(lon)) => {
                    Some(Coordinates::new(lat, lon).context("invalid coordinates")?)
                }
                _ => None,
            };
            cmd_weather(&city, config, known, json).await
        }
    }
}

/// Run API server
async fn cmd_serve(port: u16, bind: &str) -> Result<()> {
    let config = ApiConfig::from_env();
    debug!(?config, "Loaded server configuration");

    println!("{}", "🚀 Starting Depot API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!(
        "   {} {}s{}",
        "Weather freshness:".dimmed(),
        config.cache_ttl.as_secs(),
        if config.serve_stale { " (stale on failure)" } else { "" }
    );
    if config.warehouses.is_empty() {
        println!(
            "   {}",
            "No warehouses configured (set DEPOT_WAREHOUSES=Denver:DEN,...)".yellow()
        );
    }
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("failed to configure weather client")?;

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", bind, port))?;
    server.run(addr).await.context("API server stopped")?;

    Ok(())
}

/// One-shot weather lookup
async fn cmd_weather(
    city: &str,
    config: WeatherConfig,
    known: Option<Coordinates>,
    json: bool,
) -> Result<()> {
    let client = WeatherClient::with_config(config).context("failed to configure weather client")?;

    let coordinates = match known {
        Some(coordinates) => coordinates,
        None => {
            if !json {
                println!("{} {}", "🔍 Geocoding:".cyan().bold(), city);
            }
            client
                .geocode(city)
                .await
                .with_context(|| format!("could not locate {}", city))?
        }
    };

    let report = client
        .current_weather(coordinates)
        .await
        .context("weather lookup failed")?;

    if json {
        let out = serde_json::json!({
            "city": city,
            "lat": coordinates.lat,
            "lon": coordinates.lon,
            "description": report.description,
            "temperature": report.temperature,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n{} {}", "✅ Current weather in".green().bold(), city.bold());
    println!(
        "   {} {:.4}, {:.4}",
        "Coordinates:".dimmed(),
        coordinates.lat,
        coordinates.lon
    );
    println!("   {} {}", "Conditions:".yellow(), report.description);
    println!("   {} {:.1}°F", "Temperature:".yellow(), report.temperature);

    Ok(())
}
