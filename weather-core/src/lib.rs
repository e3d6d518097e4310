//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather client and its OpenWeather implementation
//! - Forecast aggregation, derived metrics and display formatting
//! - The view model and the controller that keeps it in sync with fetches
//!
//! It is used by `weather-cli`, but any presenter can drive a [`Dashboard`].

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod format;
pub mod geo;
pub mod metrics;
pub mod model;
pub mod view;

pub use client::{WeatherSource, openweather::OpenWeatherClient};
pub use config::Config;
pub use dashboard::{AppState, Dashboard, FetchOutcome, WeatherSnapshot};
pub use error::{DashboardError, GeolocationError, WeatherError};
pub use geo::Geolocator;
pub use metrics::UvSource;
pub use model::{
    Condition, Coordinates, CurrentConditions, Forecast, ForecastSample, LocationQuery, UnitSystem,
};
pub use view::{Notice, NoticeKind, Presenter, ViewModel};
