use crate::{
    Config,
    client::openweather::OpenWeatherClient,
    error::WeatherError,
    model::{CurrentConditions, Forecast, LocationQuery, UnitSystem},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only access to current conditions and the 3-hourly forecast.
///
/// Each call is a single attempt; failures are returned to the caller as-is.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<Forecast, WeatherError>;
}

/// Construct the OpenWeather client from the configured key and base URL.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = config.api_key()?;
    let client = OpenWeatherClient::with_base_url(api_key.to_owned(), &config.base_url)?;
    Ok(Box::new(client))
}
