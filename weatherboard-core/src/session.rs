//! The orchestrator behind every screen update.
//!
//! Each trigger takes a fresh token. Anything a trigger publishes is checked against the
//! current token under the state channel's lock, so a trigger that has been overtaken can
//! never overwrite the state of a newer one. Nothing in flight is cancelled; late results
//! are simply dropped.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::watch;

use crate::{
    Config,
    client::{WeatherClient, client_from_config},
    favorites::FavoritesStore,
    forecast,
    geo::{ConfiguredLocation, GeoResolver, LocationProvider},
    model::{Alert, CityQuery, FavoritesSet, ForecastPoint, SessionState, WeatherSnapshot},
    persistence::{JsonFileStore, PersistenceAdapter},
};

#[derive(Debug)]
pub struct WeatherSession {
    client: Arc<dyn WeatherClient>,
    geo: GeoResolver,
    favorites: FavoritesStore,
    default_query: CityQuery,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
    last_resolved: Mutex<Option<CityQuery>>,
}

impl WeatherSession {
    /// Wire the session to its collaborators and load the stored favorites.
    pub async fn start(
        client: Arc<dyn WeatherClient>,
        locator: Arc<dyn LocationProvider>,
        persistence: Arc<dyn PersistenceAdapter>,
        default_query: CityQuery,
    ) -> Self {
        let favorites = FavoritesStore::load(persistence).await;
        let geo = GeoResolver::new(locator, client.clone());
        let (state, _) = watch::channel(SessionState::Idle);

        Self {
            client,
            geo,
            favorites,
            default_query,
            state,
            generation: AtomicU64::new(0),
            last_resolved: Mutex::new(None),
        }
    }

    /// OpenWeather client, configured device location and on-disk favorites.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = client_from_config(config)?;
        let locator = Arc::new(ConfiguredLocation::from(&config.location));
        let store = Arc::new(JsonFileStore::new(config.favorites_file_path()?));

        Ok(Self::start(client, locator, store, config.default_query()).await)
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn favorites(&self) -> FavoritesSet {
        self.favorites.snapshot()
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.favorites.contains(city)
    }

    pub async fn toggle_favorite(&self, city: &str) -> FavoritesSet {
        self.favorites.toggle(city).await
    }

    /// Search submit. Blank names are ignored.
    pub async fn submit_query(&self, query: CityQuery) {
        if query.is_blank() {
            tracing::debug!("Ignoring blank city query");
            return;
        }

        let token = self.begin(Some(query.clone()));
        self.fetch_sequence(token, query, None).await;
    }

    pub async fn select_favorite(&self, city: &str) {
        self.submit_query(CityQuery::name(city)).await;
    }

    /// Locate the device and show its city. When that is not possible, quietly show the
    /// last resolved city instead, or the default one.
    pub async fn use_current_location(&self) {
        let token = self.begin(None);

        let located = match self.geo.locate().await {
            Ok(coord) => {
                if !self.publish(token, SessionState::Loading(CityQuery::Coordinates(coord))) {
                    tracing::debug!(token, "Location trigger superseded");
                    return;
                }
                self.geo.reverse_lookup(coord).await
            }
            Err(e) => Err(e),
        };

        match located {
            Ok(resolved) => {
                self.fetch_sequence(token, resolved.query, Some(resolved.snapshot)).await;
            }
            Err(e) => {
                let fallback = self
                    .last_resolved
                    .lock()
                    .clone()
                    .unwrap_or_else(|| self.default_query.clone());
                tracing::info!(error = %e, fallback = %fallback, "Falling back from geolocation");

                if self.publish(token, SessionState::Loading(fallback.clone())) {
                    self.fetch_sequence(token, fallback, None).await;
                }
            }
        }
    }

    /// Current conditions first, then forecast and alerts side by side.
    async fn fetch_sequence(
        &self,
        token: u64,
        query: CityQuery,
        prefetched: Option<WeatherSnapshot>,
    ) {
        let snapshot = match prefetched {
            Some(snapshot) => snapshot,
            None => match self.client.fetch_current(&query).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Current weather fetch failed");
                    self.publish(token, SessionState::Failed { query, kind: e.kind() });
                    return;
                }
            },
        };

        let coord = snapshot.coord;
        let ready = SessionState::Ready {
            snapshot: Arc::new(snapshot),
            forecast: Vec::new(),
            alerts: Vec::new(),
        };
        if !self.publish(token, ready) {
            tracing::debug!(query = %query, "Dropping stale current weather");
            return;
        }
        *self.last_resolved.lock() = Some(query);

        let forecast_query = CityQuery::Coordinates(coord);
        tokio::join!(
            async {
                match self.client.fetch_forecast_raw(&forecast_query).await {
                    Ok(raw) => {
                        let points = forecast::reduce(&raw);
                        self.patch_ready(token, |forecast, _| *forecast = points);
                    }
                    Err(e) => tracing::debug!(error = %e, "Forecast unavailable"),
                }
            },
            async {
                let fetched = self.client.fetch_alerts(coord).await;
                if !fetched.is_empty() {
                    self.patch_ready(token, |_, alerts| *alerts = fetched);
                }
            },
        );
    }

    /// Take a new token, optionally publishing `Loading` in the same step.
    fn begin(&self, loading: Option<CityQuery>) -> u64 {
        let mut token = 0;
        self.state.send_if_modified(|state| {
            token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            match loading {
                Some(query) => {
                    *state = SessionState::Loading(query);
                    true
                }
                None => false,
            }
        });
        token
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// Replace the state if `token` is still the latest. Returns whether it was.
    fn publish(&self, token: u64, next: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(token) {
                return false;
            }
            *state = next;
            true
        })
    }

    /// Fill in forecast or alerts on the `Ready` state this token published.
    fn patch_ready(
        &self,
        token: u64,
        patch: impl FnOnce(&mut Vec<ForecastPoint>, &mut Vec<Alert>),
    ) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if !self.is_current(token) {
                return false;
            }
            match state {
                SessionState::Ready { forecast, alerts, .. } => {
                    patch(forecast, alerts);
                    true
                }
                _ => false,
            }
        });
        if !applied {
            tracing::debug!(token, "Dropping stale forecast or alerts");
        }
        applied
    }
}
