use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::{ForecastError, WeatherError},
    model::{Alert, CityQuery, Coordinate, RawForecast, WeatherSnapshot},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// The weather provider as the session sees it. Every call is idempotent and safe to retry.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current(&self, query: &CityQuery) -> Result<WeatherSnapshot, WeatherError>;

    /// 3-hour samples, oldest first.
    async fn fetch_forecast_raw(&self, query: &CityQuery) -> Result<RawForecast, ForecastError>;

    /// Best effort: any failure yields an empty list.
    async fn fetch_alerts(&self, coord: Coordinate) -> Vec<Alert>;
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherClient>> {
    let api_key = config.api_key()?;
    let client = OpenWeatherClient::with_base_url(
        api_key,
        config.base_url.clone(),
        config.request_timeout(),
    )?;
    Ok(Arc::new(client))
}
