use std::{fmt, sync::Arc};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::FetchErrorKind;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What a single fetch targets: a free-text city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CityQuery {
    Name(String),
    Coordinates(Coordinate),
}

impl CityQuery {
    /// Build a name query, trimming surrounding whitespace.
    pub fn name(name: impl AsRef<str>) -> Self {
        CityQuery::Name(name.as_ref().trim().to_string())
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        CityQuery::Coordinates(Coordinate::new(lat, lon))
    }

    /// A name query with nothing in it cannot be sent to the provider.
    pub fn is_blank(&self) -> bool {
        matches!(self, CityQuery::Name(name) if name.trim().is_empty())
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CityQuery::Name(name) => f.write_str(name),
            CityQuery::Coordinates(coord) => write!(f, "({coord})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Metres per second.
    pub speed: f64,
    /// Meteorological degrees.
    pub direction_deg: f64,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: u32,
    /// Provider icon code, e.g. "10d".
    pub icon: String,
    pub description: String,
}

/// Current conditions for one city at fetch time.
///
/// Never patched after construction; a new fetch produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub coord: Coordinate,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    /// Metres; the provider omits it for some stations.
    pub visibility_m: Option<u32>,
    pub wind: Wind,
    pub clouds_pct: u8,
    pub condition: Condition,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn temperature_display(&self) -> i32 {
        round_celsius(self.temperature_c)
    }

    pub fn feels_like_display(&self) -> i32 {
        round_celsius(self.feels_like_c)
    }

    pub fn min_display(&self) -> i32 {
        round_celsius(self.temp_min_c)
    }

    pub fn max_display(&self) -> i32 {
        round_celsius(self.temp_max_c)
    }

    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility_m.map(|m| f64::from(m) / 1000.0)
    }
}

pub(crate) fn round_celsius(value: f64) -> i32 {
    value.round() as i32
}

/// One 3-hour forecast sample as delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastSample {
    pub at: DateTime<Utc>,
    pub temperature_c: f64,
}

/// The provider's forecast series plus the city's offset from UTC,
/// used to decide which calendar day a sample falls on.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    pub utc_offset: FixedOffset,
    pub samples: Vec<RawForecastSample>,
}

impl RawForecast {
    pub fn utc(samples: Vec<RawForecastSample>) -> Self {
        Self {
            utc_offset: Utc.fix(),
            samples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub temperature_c: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub sender: Option<String>,
    pub event: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Favorited city names in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesSet(IndexSet<String>);

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `city` if present, otherwise append it. Returns whether it is now a favorite.
    pub fn toggle(&mut self, city: &str) -> bool {
        if self.0.shift_remove(city) {
            false
        } else {
            self.0.insert(city.to_string());
            true
        }
    }

    pub fn contains(&self, city: &str) -> bool {
        self.0.contains(city)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FavoritesSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What the presentation layer renders. Exactly one variant is active at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Loading(CityQuery),
    Ready {
        snapshot: Arc<WeatherSnapshot>,
        forecast: Vec<ForecastPoint>,
        alerts: Vec<Alert>,
    },
    Failed {
        query: CityQuery,
        kind: FetchErrorKind,
    },
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading(_))
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            SessionState::Ready { snapshot, .. } => Some(snapshot.as_ref()),
            _ => None,
        }
    }
}
