use std::fmt;

use thiserror::Error;

/// Failure of a current-conditions fetch. The only kind of failure a session surfaces.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl WeatherError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            WeatherError::CityNotFound(_) => FetchErrorKind::CityNotFound,
            WeatherError::Network(_) => FetchErrorKind::NetworkError,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network(err.to_string())
    }
}

/// The error tag carried by `SessionState::Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    CityNotFound,
    NetworkError,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::CityNotFound => f.write_str("city not found"),
            FetchErrorKind::NetworkError => f.write_str("network error"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("Forecast not available: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeoError {
    #[error("Location permission denied")]
    Denied,

    #[error("Location service unavailable")]
    Unavailable,

    #[error("Could not resolve a city for the current location: {0}")]
    ReverseLookupFailed(#[source] WeatherError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_error_maps_to_session_kind() {
        assert_eq!(
            WeatherError::CityNotFound("Atlantis".into()).kind(),
            FetchErrorKind::CityNotFound
        );
        assert_eq!(WeatherError::Network("reset".into()).kind(), FetchErrorKind::NetworkError);
    }

    #[test]
    fn error_messages_name_the_cause() {
        assert!(WeatherError::CityNotFound("Atlantis".into()).to_string().contains("Atlantis"));
        assert!(GeoError::Denied.to_string().contains("denied"));
        let nested = GeoError::ReverseLookupFailed(WeatherError::Network("timeout".into()));
        assert!(nested.to_string().contains("timeout"));
    }
}
