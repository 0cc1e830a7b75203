//! AqiWatch - air quality lookups and the backend proxy.
//!
//! Run with: `cargo run -- overview --place "San Francisco"`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use aqiwatch_aqi::{AqiClient, AqiDataPoint, AqiOverview};
use aqiwatch_core::{AppError, Config, ReqwestErrorExt};
use aqiwatch_geocoding::{GeocodingClient, Location};
use aqiwatch_state::{AqiState, AqiStore, LocationSelector};

/// AqiWatch - air quality overview, place search and backend proxy.
#[derive(Parser, Debug)]
#[command(name = "aqiwatch")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the AQI proxy server.
    Serve {
        /// Bind address (overrides config).
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Search places by name.
    Search {
        /// Free-text place query (at least 3 characters).
        query: String,
    },

    /// Name the place at a coordinate pair.
    Reverse {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },

    /// Fetch and show the air quality overview for a location.
    Overview {
        /// Latitude (requires --lon).
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude (requires --lat).
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Use the first search match for this place.
        #[arg(long, conflicts_with_all = ["lat", "here"])]
        place: Option<String>,

        /// Current position as LAT,LNG (e.g. -33.87,151.21).
        #[arg(
            long,
            value_name = "LAT,LNG",
            value_parser = parse_position,
            allow_hyphen_values = true,
            conflicts_with = "lat"
        )]
        here: Option<(f64, f64)>,

        /// No current position is available; use the fallback location.
        #[arg(long, conflicts_with_all = ["lat", "place", "here"])]
        no_position: bool,

        /// Request demo data regardless of backend health.
        #[arg(long)]
        demo: bool,
    },

    /// Check backend health.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    aqiwatch_core::init()?;

    let (mut config, _) = Config::load_validated(args.config.as_deref()).map_err(report)?;
    tracing::debug!("Using AQI endpoint {}", config.client.base_url);

    match args.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            aqiwatch_proxy::serve(&config).await
        }
        Command::Search { query } => search(&config, &query).await,
        Command::Reverse { lat, lng } => reverse(&config, lat, lng).await,
        Command::Overview {
            lat,
            lon,
            place,
            here,
            no_position,
            demo,
        } => {
            let target = match (lat.zip(lon), place, here) {
                (Some((lat, lon)), _, _) => Target::Coordinates(lat, lon),
                (None, Some(query), _) => Target::Place(query),
                (None, None, Some(position)) => Target::Here(Some(position)),
                (None, None, None) if no_position => Target::Here(None),
                (None, None, None) => Target::Default,
            };
            overview(&config, target, demo).await
        }
        Command::Health => health(&config).await,
    }
}

/// Where the overview command should look.
#[derive(Debug)]
enum Target {
    Coordinates(f64, f64),
    Place(String),
    Here(Option<(f64, f64)>),
    Default,
}

fn parse_position(raw: &str) -> Result<(f64, f64), String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got '{}'", raw))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid longitude '{}': {}", lng.trim(), e))?;
    Ok((lat, lng))
}

/// Print the user-facing message and keep the full error for the exit report.
fn report(err: impl Into<AppError>) -> anyhow::Error {
    let err = err.into();
    eprintln!("{}", err.user_message());
    anyhow::Error::new(err)
}

fn geocoder(config: &Config) -> Result<GeocodingClient> {
    GeocodingClient::with_options(
        &config.geocoding.base_url,
        &config.geocoding.user_agent,
        config.http.timeout(),
    )
    .map_err(report)
}

fn aqi_client(config: &Config) -> Result<AqiClient> {
    AqiClient::with_timeout(&config.client.base_url, config.http.timeout())
        .map_err(|e| report((&e).into_network_error()))
}

async fn search(config: &Config, query: &str) -> Result<()> {
    let results = geocoder(config)?
        .search_location(query)
        .await
        .map_err(report)?;

    if results.is_empty() {
        println!("Query too short; enter at least 3 characters.");
        return Ok(());
    }

    for result in results {
        println!("{}  ({:.4}, {:.4})  [{}]", result.name, result.lat, result.lng, result.kind);
        println!("    {}", result.display_name);
    }
    Ok(())
}

async fn reverse(config: &Config, lat: f64, lng: f64) -> Result<()> {
    let result = geocoder(config)?
        .reverse_geocode(lat, lng)
        .await
        .map_err(report)?;

    println!("{}", result.name);
    if !result.display_name.is_empty() {
        println!("    {}", result.display_name);
    }
    Ok(())
}

async fn health(config: &Config) -> Result<()> {
    let status = aqi_client(config)?.health_check().await.map_err(report)?;

    println!("Status:           {}", status.status);
    println!("Predictor loaded: {}", if status.predictor_loaded { "yes" } else { "no" });
    if !status.timestamp.is_empty() {
        println!("Timestamp:        {}", status.timestamp);
    }
    Ok(())
}

async fn overview(config: &Config, target: Target, demo: bool) -> Result<()> {
    let client = aqi_client(config)?;
    let store = if demo {
        Arc::new(AqiStore::new(client, false))
    } else {
        Arc::new(AqiStore::initialize(client).await)
    };
    let selector = LocationSelector::new(
        geocoder(config)?,
        store.clone(),
        config.locations.fallback.clone(),
    );

    let location = match target {
        Target::Coordinates(lat, lon) => {
            let location = Location::new(lat, lon, format!("{:.4}, {:.4}", lat, lon));
            selector.select(location.clone()).await;
            location
        }
        Target::Place(query) => {
            let suggestions = selector.search_suggestions(&query).await;
            let Some(first) = suggestions.first() else {
                eprintln!("No matching places found for '{}'.", query);
                anyhow::bail!("No locations found");
            };
            selector.select_suggestion(first).await
        }
        Target::Here(position) => selector.use_current_position(position).await,
        Target::Default => {
            let location = config.locations.default.clone();
            selector.select(location.clone()).await;
            location
        }
    };

    render(&location, &store.snapshot())
}

fn render(location: &Location, state: &AqiState) -> Result<()> {
    println!("{} ({:.4}, {:.4})", location.name, location.lat, location.lng);

    if let Some(error) = &state.error {
        anyhow::bail!("{}", error);
    }

    match &state.aqi_data {
        Some(data) => {
            render_overview(data);
            if let Some(fetched_at) = state.fetched_at {
                println!();
                println!("Fetched {}", fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        None => println!("No data."),
    }
    Ok(())
}

fn render_overview(data: &AqiOverview) {
    if data.is_demo() {
        println!("(demo data)");
    }

    println!();
    println!(
        "AQI {:.0}  {}",
        data.current_aqi.value, data.current_aqi.category
    );
    if !data.current_aqi.description.is_empty() {
        println!("{}", data.current_aqi.description);
    }

    let pollutants = data.pollutant_breakdown.entries();
    if !pollutants.is_empty() {
        println!();
        println!("Pollutants");
        for (label, pollutant) in pollutants {
            println!(
                "  {:<6} {:>7.1} {:<6} {}",
                label, pollutant.value, pollutant.unit, pollutant.category
            );
        }
        if let Some(dominant) = &data.pollutant_breakdown.dominant_pollutant {
            println!(
                "  Dominant: {} ({:.0}% of AQI)",
                dominant.name, dominant.contribution
            );
        }
    }

    let trend = &data.trend_analysis;
    if !trend.overall_trend.is_empty() {
        println!();
        println!("Trend: {} ({})", trend.overall_trend, trend.trend_strength);
        if !trend.description.is_empty() {
            println!("  {}", trend.description);
        }
        println!(
            "  Historical change {:+.1}, predicted change {:+.1}",
            trend.historical_change, trend.predicted_change
        );
    }

    if !data.air_quality_alerts.is_empty() {
        println!();
        println!("Alerts");
        for alert in &data.air_quality_alerts {
            println!("  [{}] {}", alert.level, alert.message);
            if !alert.action.is_empty() {
                println!("      {}", alert.action);
            }
        }
    }

    if !data.health_impact.recommendations.is_empty() {
        println!();
        println!("Recommendations");
        for recommendation in &data.health_impact.recommendations {
            println!("  - {}", recommendation);
        }
    }

    render_series("History", &data.historical_data);
    render_series("Forecast", &data.predicted_data);
}

fn render_series(title: &str, points: &[AqiDataPoint]) {
    if points.is_empty() {
        return;
    }
    println!();
    println!("{}", title);
    for point in points {
        println!("  {}  {:>4.0}  {}", point.date, point.aqi, point.category);
    }
}
