//! Scripted weather client shared by the session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Notify;

use weatherboard_core::{
    Alert, CityQuery, Condition, Coordinate, ForecastError, RawForecast, RawForecastSample,
    WeatherClient, WeatherError, WeatherSnapshot, Wind,
};

#[derive(Debug, Default)]
pub struct FakeClient {
    cities: Mutex<HashMap<String, WeatherSnapshot>>,
    forecasts: Mutex<HashMap<String, RawForecast>>,
    alerts: Mutex<HashMap<String, Vec<Alert>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    network_down: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a city with a current reading and a 40-sample forecast at `forecast_temp`.
    pub fn add_city(&self, name: &str, coord: Coordinate, temp: f64, forecast_temp: f64) {
        self.cities.lock().insert(name.to_string(), snapshot(name, coord, temp));
        self.forecasts.lock().insert(name.to_string(), forecast_series(40, forecast_temp));
    }

    pub fn remove_forecast(&self, name: &str) {
        self.forecasts.lock().remove(name);
    }

    pub fn set_alerts(&self, name: &str, alerts: Vec<Alert>) {
        self.alerts.lock().insert(name.to_string(), alerts);
    }

    pub fn set_network_down(&self, down: bool) {
        *self.network_down.lock() = down;
    }

    /// Hold the call named `key` (e.g. "current:Paris") until the returned handle is notified.
    pub fn hold(&self, key: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().insert(key.to_string(), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub async fn wait_for_call(&self, key: &str) {
        while !self.calls.lock().iter().any(|c| c == key) {
            tokio::task::yield_now().await;
        }
    }

    fn city_for(&self, query: &CityQuery) -> Option<String> {
        match query {
            CityQuery::Name(name) => Some(name.clone()),
            CityQuery::Coordinates(coord) => self
                .cities
                .lock()
                .values()
                .find(|s| s.coord == *coord)
                .map(|s| s.city.clone()),
        }
    }

    async fn enter(&self, key: String) {
        self.calls.lock().push(key.clone());
        let gate = self.gates.lock().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl WeatherClient for FakeClient {
    async fn fetch_current(&self, query: &CityQuery) -> Result<WeatherSnapshot, WeatherError> {
        let city = self.city_for(query).unwrap_or_else(|| query.to_string());
        self.enter(format!("current:{city}")).await;

        if *self.network_down.lock() {
            return Err(WeatherError::Network("connection refused".into()));
        }
        self.cities
            .lock()
            .get(&city)
            .cloned()
            .ok_or_else(|| WeatherError::CityNotFound(query.to_string()))
    }

    async fn fetch_forecast_raw(&self, query: &CityQuery) -> Result<RawForecast, ForecastError> {
        let city = self.city_for(query).unwrap_or_else(|| query.to_string());
        self.enter(format!("forecast:{city}")).await;

        self.forecasts
            .lock()
            .get(&city)
            .cloned()
            .ok_or_else(|| ForecastError::Unavailable(city.clone()))
    }

    async fn fetch_alerts(&self, coord: Coordinate) -> Vec<Alert> {
        let city = self
            .city_for(&CityQuery::Coordinates(coord))
            .unwrap_or_else(|| coord.to_string());
        self.enter(format!("alerts:{city}")).await;

        self.alerts.lock().get(&city).cloned().unwrap_or_default()
    }
}

pub fn snapshot(city: &str, coord: Coordinate, temp: f64) -> WeatherSnapshot {
    let observed = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    WeatherSnapshot {
        city: city.to_string(),
        country: "MA".to_string(),
        coord,
        observed_at: observed,
        temperature_c: temp,
        feels_like_c: temp - 0.5,
        temp_min_c: temp - 2.0,
        temp_max_c: temp + 2.0,
        humidity_pct: 60,
        pressure_hpa: 1015,
        visibility_m: Some(10_000),
        wind: Wind { speed: 4.1, direction_deg: 270.0, gust: None },
        clouds_pct: 20,
        condition: Condition { id: 800, icon: "01d".into(), description: "clear sky".into() },
        sunrise: observed - Duration::hours(6),
        sunset: observed + Duration::hours(7),
    }
}

pub fn forecast_series(n: usize, temp: f64) -> RawForecast {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    RawForecast::utc(
        (0..n)
            .map(|i| RawForecastSample {
                at: start + Duration::hours(3 * i as i64),
                temperature_c: temp,
            })
            .collect(),
    )
}

pub fn alert(event: &str) -> Alert {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    Alert {
        sender: Some("DMN".into()),
        event: event.to_string(),
        description: "Strong gusts expected".into(),
        start,
        end: start + Duration::hours(12),
    }
}

pub const RABAT: Coordinate = Coordinate { lat: 34.02, lon: -6.83 };
pub const PARIS: Coordinate = Coordinate { lat: 48.85, lon: 2.35 };
