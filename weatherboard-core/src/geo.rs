//! Device location and reverse lookup to a city.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    client::WeatherClient,
    config::LocationConfig,
    error::GeoError,
    model::{CityQuery, Coordinate, WeatherSnapshot},
};

/// One-shot read of the device position.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, GeoError>;
}

/// Location taken from configuration rather than hardware.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    allowed: bool,
    coordinate: Option<Coordinate>,
}

impl ConfiguredLocation {
    pub fn new(allowed: bool, coordinate: Option<Coordinate>) -> Self {
        Self { allowed, coordinate }
    }
}

impl From<&LocationConfig> for ConfiguredLocation {
    fn from(cfg: &LocationConfig) -> Self {
        Self::new(cfg.enabled, cfg.coordinate())
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocation {
    async fn current_position(&self) -> Result<Coordinate, GeoError> {
        if !self.allowed {
            return Err(GeoError::Denied);
        }
        self.coordinate.ok_or(GeoError::Unavailable)
    }
}

/// A located city together with the current conditions fetched while naming it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub query: CityQuery,
    pub snapshot: WeatherSnapshot,
}

#[derive(Debug, Clone)]
pub struct GeoResolver {
    locator: Arc<dyn LocationProvider>,
    client: Arc<dyn WeatherClient>,
}

impl GeoResolver {
    pub fn new(locator: Arc<dyn LocationProvider>, client: Arc<dyn WeatherClient>) -> Self {
        Self { locator, client }
    }

    pub async fn locate(&self) -> Result<Coordinate, GeoError> {
        let coord = self.locator.current_position().await?;
        tracing::info!(lat = coord.lat, lon = coord.lon, "Got device location");
        Ok(coord)
    }

    /// Name the city at `coord` via the current-conditions endpoint.
    pub async fn reverse_lookup(&self, coord: Coordinate) -> Result<ResolvedLocation, GeoError> {
        let snapshot = self
            .client
            .fetch_current(&CityQuery::Coordinates(coord))
            .await
            .map_err(GeoError::ReverseLookupFailed)?;

        tracing::info!(city = %snapshot.city, "Reverse resolved location");
        Ok(ResolvedLocation { query: CityQuery::name(&snapshot.city), snapshot })
    }

    pub async fn resolve(&self) -> Result<ResolvedLocation, GeoError> {
        let coord = self.locate().await?;
        self.reverse_lookup(coord).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_location_is_denied() {
        let loc = ConfiguredLocation::new(false, Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(loc.current_position().await, Err(GeoError::Denied));
    }

    #[tokio::test]
    async fn enabled_without_coordinate_is_unavailable() {
        let loc = ConfiguredLocation::from(&LocationConfig { enabled: true, lat: None, lon: None });
        assert_eq!(loc.current_position().await, Err(GeoError::Unavailable));
    }

    #[tokio::test]
    async fn enabled_with_coordinate_returns_it() {
        let cfg = LocationConfig { enabled: true, lat: Some(34.02), lon: Some(-6.83) };
        let loc = ConfiguredLocation::from(&cfg);
        assert_eq!(loc.current_position().await, Ok(Coordinate::new(34.02, -6.83)));
    }
}
