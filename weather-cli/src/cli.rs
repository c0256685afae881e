use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use weather_core::{
    Config, CsvWriter, Endpoints, Forecast, HttpTransport, Location, MemoryStore, ProviderId,
    Store, Transport, Weather,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Collects and normalizes weather data")]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweathermap" or "weatherbit".
        provider: ProviderId,

        /// Also make this the default provider.
        #[arg(long)]
        default: bool,
    },

    /// List supported providers and whether they are configured.
    Providers,

    /// Parse a previously saved provider response.
    Parse {
        provider: ProviderId,

        /// File holding the raw JSON response.
        file: PathBuf,

        /// The file is a forecast response.
        #[arg(long, conflicts_with = "locations")]
        forecast: bool,

        /// The file is a location search response.
        #[arg(long)]
        locations: bool,

        /// Write the records to this CSV file instead of printing them.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Request data from a provider and normalize it.
    Collect {
        /// Provider to ask; defaults to the configured default provider.
        #[arg(long)]
        provider: Option<ProviderId>,

        /// Request a forecast instead of current weather.
        #[arg(long, conflicts_with = "locations")]
        forecast: bool,

        /// Search for stations around the given coordinates.
        #[arg(long)]
        locations: bool,

        #[command(flatten)]
        location: LocationArgs,

        /// Write the records to this CSV file instead of printing them.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Location given on the command line; falls back to the configured one.
#[derive(Debug, Args, Default)]
pub struct LocationArgs {
    /// Provider specific location id.
    #[arg(long)]
    pub id: Option<u32>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Place name, e.g. "Berlin".
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub postcode: Option<String>,

    /// ISO 3166 alpha-2 country code.
    #[arg(long)]
    pub country: Option<String>,
}

impl LocationArgs {
    fn into_location(self) -> Location {
        let mut location = Location {
            id: self.id,
            name: self.name,
            postcode: self.postcode,
            country_code: self.country,
            ..Location::default()
        };
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            location.coordinates = Location::from_coordinates(lat, lon).coordinates;
        }
        location
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider, default } => configure(provider, default),
            Command::Providers => list_providers(),
            Command::Parse {
                provider,
                file,
                forecast,
                locations,
                csv,
            } => parse_file(provider, &file, forecast, locations, csv),
            Command::Collect {
                provider,
                forecast,
                locations,
                location,
                csv,
            } => collect(provider, forecast, locations, location, csv).await,
        }
    }
}

fn configure(provider: ProviderId, make_default: bool) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new(&format!("API key for {provider}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    config.upsert_provider_api_key(provider, api_key.trim().to_owned());
    if make_default {
        config.set_default_provider(provider);
    }
    config.save()?;

    println!(
        "Saved API key for {provider} to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn list_providers() -> anyhow::Result<()> {
    let config = Config::load()?;
    let default = config.default_provider_id().ok();

    for id in ProviderId::all() {
        let state = if config.is_provider_configured(*id) {
            "configured"
        } else {
            "not configured"
        };
        let marker = if default == Some(*id) { " (default)" } else { "" };
        println!("{id:<16}{state}{marker}");
    }
    Ok(())
}

fn parse_file(
    provider: ProviderId,
    file: &Path,
    forecast: bool,
    locations: bool,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let location = Location::from_name(file.display().to_string());
    let store = MemoryStore::new();

    if locations {
        let found = provider
            .parse_locations(&json)
            .with_context(|| format!("Failed to parse {}", file.display()))?;
        for (found_location, weather) in &found {
            // Entries identified only by their weather are filed under the input file.
            let location = if found_location.is_empty() {
                &location
            } else {
                found_location
            };
            store.save_current_weather(provider, location, weather)?;
        }
        info!(count = found.len(), "parsed locations");
    } else if forecast {
        let parsed = provider
            .parse_forecast(&json)
            .with_context(|| format!("Failed to parse {}", file.display()))?;
        store.save_forecast(provider, &location, &parsed)?;
    } else {
        let parsed = provider
            .parse_current_weather(&json)
            .with_context(|| format!("Failed to parse {}", file.display()))?;
        store.save_current_weather(provider, &location, &parsed)?;
    }

    emit(&store, csv)
}

async fn collect(
    provider: Option<ProviderId>,
    forecast: bool,
    locations: bool,
    location: LocationArgs,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = match provider {
        Some(id) => id,
        None => config.default_provider_id()?,
    };
    let api_key = config.require_api_key(provider)?;

    let mut location = location.into_location();
    if location.is_empty() {
        location = config.location.clone().ok_or_else(|| {
            anyhow!("No location given.\nHint: pass --name, --id or --lat/--lon, or set [location] in the config file.")
        })?;
    }

    let endpoints: &dyn Endpoints = provider.endpoints();
    let url = if locations {
        endpoints.locations_url(&location, api_key)
    } else if forecast {
        endpoints.forecast_url(&location, api_key)
    } else {
        endpoints.current_url(&location, api_key)
    }
    .ok_or_else(|| anyhow!("{provider} cannot look up location '{location}'"))?;

    let transport = HttpTransport::new(config.http.timeout())?;
    let request_time = Utc::now();
    info!(%provider, %location, forecast, locations, "requesting data");
    let body = transport
        .get(&url)
        .await
        .with_context(|| format!("Failed to request data from {provider}"))?;

    let store = MemoryStore::new();
    if locations {
        let found = provider
            .parse_locations(&body)
            .with_context(|| format!("Failed to parse {provider} location search"))?;
        for (found_location, weather) in found {
            let found_location = if found_location.is_empty() {
                location.clone()
            } else {
                found_location
            };
            store.save_current_weather(
                provider,
                &found_location,
                &weather.with_request_time(request_time),
            )?;
        }
    } else if forecast {
        let parsed = provider
            .parse_forecast(&body)
            .with_context(|| format!("Failed to parse {provider} forecast"))?
            .with_request_time(request_time);
        store.save_forecast(provider, &location, &parsed)?;
    } else {
        let parsed = provider
            .parse_current_weather(&body)
            .with_context(|| format!("Failed to parse {provider} current weather"))?
            .with_request_time(request_time);
        store.save_current_weather(provider, &location, &parsed)?;
    }

    emit(&store, csv)
}

/// Writes everything in `store` to a CSV file, or prints it.
fn emit(store: &MemoryStore, csv: Option<PathBuf>) -> anyhow::Result<()> {
    let weather = store.all_current_weather()?;
    let forecasts = store.all_forecasts()?;

    match csv {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = CsvWriter::new(BufWriter::new(file));
            for (provider, location, w) in &weather {
                writer.write_weather(*provider, location, w)?;
            }
            for (provider, location, f) in &forecasts {
                writer.write_forecast(*provider, location, f)?;
            }
            writer.finish()?;
            println!("Wrote CSV to {}", path.display());
        }
        None => {
            for (provider, location, w) in &weather {
                println!("{provider} @ {location}: {}", describe(w));
            }
            for (provider, location, f) in &forecasts {
                print_forecast(*provider, location, f);
            }
        }
    }
    Ok(())
}

fn print_forecast(provider: ProviderId, location: &Location, forecast: &Forecast) {
    println!(
        "{provider} @ {location}: forecast with {} points",
        forecast.data.len()
    );
    for w in &forecast.data {
        println!("  {}", describe(w));
    }
}

/// Single-line, human-friendly rendering of the fields that are present.
fn describe(w: &Weather) -> String {
    let mut parts = Vec::new();
    if let Some(t) = w.data_time {
        parts.push(t.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    if let Some(c) = w.temperature_celsius {
        parts.push(format!("{c:.1} °C"));
    }
    if let Some(h) = w.humidity {
        parts.push(format!("{h}% humidity"));
    }
    if let Some(p) = w.pressure {
        parts.push(format!("{p} hPa"));
    }
    if let Some(s) = w.wind_speed {
        let dir = w
            .wind_degrees
            .map(|d| format!(" from {d}°"))
            .unwrap_or_default();
        parts.push(format!("wind {s:.1} m/s{dir}"));
    }
    if let Some(c) = w.cloudiness {
        parts.push(format!("{c}% clouds"));
    }
    if let Some(r) = w.rain.filter(|r| *r > 0.0) {
        parts.push(format!("rain {r} mm"));
    }
    if let Some(s) = w.snow.filter(|s| *s > 0.0) {
        parts.push(format!("snow {s} mm"));
    }
    if parts.is_empty() {
        "no data".to_owned()
    } else {
        parts.join(", ")
    }
}
