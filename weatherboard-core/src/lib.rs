//! Core library for `weatherboard`.
//!
//! This crate defines:
//! - The weather provider client and its OpenWeather implementation
//! - Geolocation and favorites ports, with file and in-memory stores
//! - Forecast reduction from 3-hour samples to daily points
//! - `WeatherSession`, which sequences fetches and publishes a single `SessionState`
//!
//! Rendering is left to the caller, which observes the session through `subscribe()`.

pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod forecast;
pub mod geo;
pub mod model;
pub mod persistence;
pub mod session;

pub use client::{OpenWeatherClient, WeatherClient};
pub use config::{Config, LocationConfig};
pub use error::{FetchErrorKind, ForecastError, GeoError, WeatherError};
pub use favorites::FavoritesStore;
pub use geo::{ConfiguredLocation, GeoResolver, LocationProvider, ResolvedLocation};
pub use model::{
    Alert, CityQuery, Condition, Coordinate, FavoritesSet, ForecastPoint, RawForecast,
    RawForecastSample, SessionState, WeatherSnapshot, Wind,
};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceAdapter};
pub use session::WeatherSession;
