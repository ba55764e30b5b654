use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, Text};
use std::sync::Arc;
use weatherboard_core::{
    CityQuery, Config, FavoritesStore, JsonFileStore, LocationConfig, WeatherSession,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherboard", version, about = "Weather, forecast and alerts for your cities")]
pub struct Cli {
    /// Log what the session is doing to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, default city and device location.
    Configure,

    /// Show weather for the current location (the default).
    Here,

    /// Show weather for a city.
    Show {
        /// City name, e.g. "Rabat".
        city: String,
    },

    /// Show weather for a favorite city.
    Open {
        city: String,
    },

    /// Add or remove a city from favorites.
    Star {
        city: String,
    },

    /// List favorite cities.
    Favorites,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Here) {
            Command::Configure => configure(),
            Command::Here => {
                let session = open_session().await?;
                session.use_current_location().await;
                print_state(&session)
            }
            Command::Show { city } => {
                let session = open_session().await?;
                session.submit_query(CityQuery::name(&city)).await;
                print_state(&session)
            }
            Command::Open { city } => {
                let session = open_session().await?;
                if !session.is_favorite(&city) {
                    println!("{city} is not a favorite; showing it anyway.");
                }
                session.select_favorite(&city).await;
                print_state(&session)
            }
            Command::Star { city } => {
                let favorites = open_favorites().await?.toggle(&city).await;
                let verb = if favorites.contains(&city) { "Added" } else { "Removed" };
                println!("{verb} {city}.");
                print!("{}", render::favorites(&favorites));
                Ok(())
            }
            Command::Favorites => {
                print!("{}", render::favorites(&open_favorites().await?.snapshot()));
                Ok(())
            }
        }
    }
}

async fn open_session() -> anyhow::Result<WeatherSession> {
    let config = Config::load()?;
    tracing::debug!(default_city = %config.default_city, "Loaded configuration");
    WeatherSession::from_config(&config).await
}

/// Favorites alone need no API key.
async fn open_favorites() -> anyhow::Result<FavoritesStore> {
    let config = Config::load()?;
    let store = JsonFileStore::new(config.favorites_file_path()?);
    Ok(FavoritesStore::load(Arc::new(store)).await)
}

fn print_state(session: &WeatherSession) -> anyhow::Result<()> {
    print!("{}", render::state(&session.state(), &session.favorites())?);
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.default_city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()
        .context("Failed to read default city")?;

    let enabled = Confirm::new("Allow use of your location?")
        .with_default(config.location.enabled)
        .prompt()
        .context("Failed to read location permission")?;

    config.location = if enabled {
        let lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read latitude")?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read longitude")?;
        LocationConfig { enabled, lat: Some(lat), lon: Some(lon) }
    } else {
        LocationConfig { enabled, ..config.location }
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
