//! View-state controller: drives fetches and owns the application state.

use chrono::Utc;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
use tracing::{debug, info, warn};

use crate::{
    Config,
    client::{WeatherSource, source_from_config},
    error::{DashboardError, WeatherError},
    geo::{Geolocator, UnsupportedGeolocator},
    metrics::{FixedUvIndex, NoUvIndex, UvSource},
    model::{CurrentConditions, Forecast, ForecastSample, LocationQuery, UnitSystem},
    view::{Notice, Presenter, ViewModel, build_view_model},
};

/// Conditions and forecast from the same fetch, always stored together.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub forecast: Forecast,
    /// Units the data was fetched in.
    pub units: UnitSystem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    weather: Option<WeatherSnapshot>,
    units: UnitSystem,
    last_location: String,
}

impl AppState {
    pub fn new(default_location: impl Into<String>, units: UnitSystem) -> Self {
        Self { weather: None, units, last_location: default_location.into() }
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.weather.as_ref().map(|w| &w.current)
    }

    pub fn forecast_samples(&self) -> Option<&[ForecastSample]> {
        self.weather.as_ref().map(|w| w.forecast.samples.as_slice())
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// `"city,country"` after a successful fetch, the default location before.
    pub fn last_location(&self) -> &str {
        &self.last_location
    }

    /// City part of the last location, without the country code.
    pub fn last_city(&self) -> &str {
        self.last_location.split(',').next().unwrap_or_default().trim()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// State was replaced and the view rendered.
    Updated(Box<ViewModel>),
    /// A newer fetch started meanwhile; this result was dropped.
    Stale,
}

impl FetchOutcome {
    pub fn view(&self) -> Option<&ViewModel> {
        match self {
            FetchOutcome::Updated(view) => Some(view),
            FetchOutcome::Stale => None,
        }
    }
}

/// Marks the dashboard busy for as long as it lives.
struct BusyGuard<'a> {
    in_flight: &'a AtomicUsize,
    presenter: &'a dyn Presenter,
}

impl<'a> BusyGuard<'a> {
    fn acquire(in_flight: &'a AtomicUsize, presenter: &'a dyn Presenter) -> Self {
        if in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            presenter.set_loading(true);
        }
        Self { in_flight, presenter }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.presenter.set_loading(false);
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    source: Arc<dyn WeatherSource>,
    presenter: Arc<dyn Presenter>,
    geolocator: Arc<dyn Geolocator>,
    uv: Arc<dyn UvSource>,
    icon_base_url: String,
    state: Mutex<AppState>,
    generation: AtomicU64,
    in_flight: AtomicUsize,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        presenter: Arc<dyn Presenter>,
        initial: AppState,
    ) -> Self {
        Self {
            source,
            presenter,
            geolocator: Arc::new(UnsupportedGeolocator),
            uv: Arc::new(NoUvIndex),
            icon_base_url: crate::config::DEFAULT_ICON_BASE_URL.to_string(),
            state: Mutex::new(initial),
            generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Wires the OpenWeather client, UV source and defaults from `config`.
    pub fn from_config(config: &Config, presenter: Arc<dyn Presenter>) -> anyhow::Result<Self> {
        let source: Arc<dyn WeatherSource> = Arc::from(source_from_config(config)?);
        let uv: Arc<dyn UvSource> = match config.uv_index {
            Some(index) => Arc::new(FixedUvIndex(index)),
            None => Arc::new(NoUvIndex),
        };

        Ok(Self::new(source, presenter, AppState::new(&config.default_location, config.units))
            .with_uv_source(uv)
            .with_icon_base_url(&config.icon_base_url))
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = geolocator;
        self
    }

    pub fn with_uv_source(mut self, uv: Arc<dyn UvSource>) -> Self {
        self.uv = uv;
        self
    }

    pub fn with_icon_base_url(mut self, url: &str) -> Self {
        self.icon_base_url = url.to_string();
        self
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Initial load of the default location.
    pub async fn startup(&self) -> Result<FetchOutcome, DashboardError> {
        let (location, units) = {
            let state = self.lock();
            (state.last_location.clone(), state.units)
        };
        let result = self.fetch(LocationQuery::Place(location), units).await;
        self.report(result)
    }

    pub async fn search(&self, text: &str) -> Result<FetchOutcome, DashboardError> {
        let text = text.trim();
        if text.is_empty() {
            return self.report(Err(DashboardError::Validation(
                "Please enter a location".to_string(),
            )));
        }

        let units = self.lock().units;
        let result = self.fetch(LocationQuery::place(text), units).await;
        self.report(result)
    }

    /// Locates the device, resolves the coordinates to a place name and loads it.
    pub async fn use_current_location(&self) -> Result<FetchOutcome, DashboardError> {
        let result = self.fetch_current_location().await;
        self.report(result)
    }

    /// Switches units and reloads the last city under them.
    pub async fn switch_units(&self, units: UnitSystem) -> Result<FetchOutcome, DashboardError> {
        let city = {
            let mut state = self.lock();
            state.units = units;
            state.last_city().to_string()
        };
        debug!(%units, %city, "switching units");

        let result = self.fetch(LocationQuery::Place(city), units).await;
        self.report(result)
    }

    async fn fetch_current_location(&self) -> Result<FetchOutcome, DashboardError> {
        let _busy = BusyGuard::acquire(&self.in_flight, self.presenter.as_ref());

        let coords = self.geolocator.locate().await?;
        let units = self.lock().units;
        let here = self
            .source
            .fetch_current(&LocationQuery::Coordinates(coords), units)
            .await
            .map_err(DashboardError::CurrentLocation)?;
        debug!(location = %here.location_key(), "resolved coordinates");

        self.fetch(LocationQuery::Place(here.location_key()), units).await
    }

    /// The single path that replaces weather data.
    ///
    /// Both requests must succeed; the state is left untouched otherwise.
    pub async fn fetch(
        &self,
        query: LocationQuery,
        units: UnitSystem,
    ) -> Result<FetchOutcome, DashboardError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _busy = BusyGuard::acquire(&self.in_flight, self.presenter.as_ref());
        debug!(%query, %units, generation, "fetch started");

        let fetched = self.fetch_snapshot(&query, units).await;

        // Failures of a superseded fetch are dropped along with its data.
        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(%query, generation, ok = fetched.is_ok(), "discarding stale fetch result");
            return Ok(FetchOutcome::Stale);
        }
        let (current, forecast, uv_index) = fetched?;

        let view =
            build_view_model(&current, &forecast, units, uv_index, &self.icon_base_url, Utc::now());

        state.last_location = current.location_key();
        state.weather = Some(WeatherSnapshot { current, forecast, units });
        info!(location = %state.last_location, %units, "weather updated");

        self.presenter.render(&view);
        Ok(FetchOutcome::Updated(Box::new(view)))
    }

    async fn fetch_snapshot(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<(CurrentConditions, Forecast, Option<f64>), WeatherError> {
        let current = self.source.fetch_current(query, units).await?;
        let forecast = self.source.fetch_forecast(query, units).await?;
        let uv_index = self.uv.uv_index(&current).await;
        Ok((current, forecast, uv_index))
    }

    fn report(
        &self,
        result: Result<FetchOutcome, DashboardError>,
    ) -> Result<FetchOutcome, DashboardError> {
        if let Err(err) = &result {
            warn!(error = %err, "dashboard action failed");
            self.presenter.notify(&Notice::from(err));
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
