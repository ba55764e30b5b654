use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    config::DEFAULT_BASE_URL,
    error::{ForecastError, WeatherError},
    model::{
        Alert, CityQuery, Condition, Coordinate, RawForecast, RawForecastSample, WeatherSnapshot,
        Wind,
    },
};

use super::WeatherClient;

const UNITS: &str = "metric";
const ALERTS_EXCLUDE: &str = "current,minutely,hourly,daily";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), Duration::from_secs(10))
    }

    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn params(&self, query: &CityQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            CityQuery::Name(name) => vec![("q", name.clone())],
            CityQuery::Coordinates(coord) => {
                vec![("lat", coord.lat.to_string()), ("lon", coord.lon.to_string())]
            }
        };
        params.push(("units", UNITS.to_string()));
        params.push(("appid", self.api_key.clone()));
        params
    }

    /// GET `{base}/{endpoint}` and hand back the status with the raw body.
    async fn get(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<(StatusCode, String), reqwest::Error> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let res = self.http.get(url).query(params).send().await?;
        let status = res.status();
        let body = res.text().await?;
        Ok((status, body))
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
    gust: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: i64,
    coord: OwCoord,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    visibility: Option<u32>,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
}

#[derive(Debug, Default, Deserialize)]
struct OwForecastCity {
    /// Seconds east of UTC.
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: OwForecastCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwAlert {
    sender_name: Option<String>,
    event: String,
    #[serde(default)]
    description: String,
    start: i64,
    end: i64,
}

#[derive(Debug, Deserialize)]
struct OwAlertsResponse {
    #[serde(default)]
    alerts: Vec<OwAlert>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|w| Condition { id: w.id, icon: w.icon, description: w.description })
            .unwrap_or_else(|| Condition {
                id: 0,
                icon: String::new(),
                description: "Unknown".to_string(),
            });

        WeatherSnapshot {
            city: self.name,
            country: self.sys.country,
            coord: Coordinate::new(self.coord.lat, self.coord.lon),
            observed_at: unix_to_utc(self.dt),
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            temp_min_c: self.main.temp_min,
            temp_max_c: self.main.temp_max,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            visibility_m: self.visibility,
            wind: Wind {
                speed: self.wind.speed,
                direction_deg: self.wind.deg,
                gust: self.wind.gust,
            },
            clouds_pct: self.clouds.all,
            condition,
            sunrise: unix_to_utc(self.sys.sunrise),
            sunset: unix_to_utc(self.sys.sunset),
        }
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_current(&self, query: &CityQuery) -> Result<WeatherSnapshot, WeatherError> {
        tracing::debug!(query = %query, "Fetching current weather");

        let (status, body) = self.get("weather", &self.params(query)).await?;

        if !status.is_success() {
            tracing::debug!(
                status = %status,
                body = %truncate_body(&body),
                "Current weather request rejected"
            );
            return Err(WeatherError::CityNotFound(query.to_string()));
        }

        let parsed: OwCurrentResponse = parse_json(&body).map_err(WeatherError::Network)?;

        if parsed.name.trim().is_empty() {
            return Err(WeatherError::CityNotFound(query.to_string()));
        }

        let snapshot = parsed.into_snapshot();
        tracing::info!(
            city = %snapshot.city,
            temp = %snapshot.temperature_c,
            "Current weather fetched"
        );
        Ok(snapshot)
    }

    async fn fetch_forecast_raw(&self, query: &CityQuery) -> Result<RawForecast, ForecastError> {
        tracing::debug!(query = %query, "Fetching forecast");

        let (status, body) = self.get("forecast", &self.params(query)).await?;

        if !status.is_success() {
            return Err(ForecastError::Unavailable(format!(
                "status {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        let parsed: OwForecastResponse = parse_json(&body).map_err(ForecastError::Network)?;

        let utc_offset = FixedOffset::east_opt(parsed.city.timezone)
            .ok_or_else(|| ForecastError::Unavailable("invalid city timezone".to_string()))?;

        let samples = parsed
            .list
            .into_iter()
            .map(|e| RawForecastSample { at: unix_to_utc(e.dt), temperature_c: e.main.temp })
            .collect();

        Ok(RawForecast { utc_offset, samples })
    }

    async fn fetch_alerts(&self, coord: Coordinate) -> Vec<Alert> {
        let params = [
            ("lat", coord.lat.to_string()),
            ("lon", coord.lon.to_string()),
            ("exclude", ALERTS_EXCLUDE.to_string()),
            ("appid", self.api_key.clone()),
        ];

        let (status, body) = match self.get("onecall", &params).await {
            Ok(res) => res,
            Err(e) => {
                tracing::debug!(error = %e, "Alerts request failed");
                return Vec::new();
            }
        };

        if !status.is_success() {
            tracing::debug!(status = %status, "Alerts request rejected");
            return Vec::new();
        }

        match parse_json::<OwAlertsResponse>(&body) {
            Ok(parsed) => parsed
                .alerts
                .into_iter()
                .map(|a| Alert {
                    sender: a.sender_name,
                    event: a.event,
                    description: a.description,
                    start: unix_to_utc(a.start),
                    end: unix_to_utc(a.end),
                })
                .collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Alerts response unreadable");
                Vec::new()
            }
        }
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, String> {
    serde_json::from_str(body)
        .map_err(|e| format!("invalid provider JSON ({e}): {}", truncate_body(body)))
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
