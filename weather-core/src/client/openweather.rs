use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    error::WeatherError,
    model::{Condition, CurrentConditions, Forecast, ForecastSample, LocationQuery, UnitSystem},
};

use super::WeatherSource;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { api_key, base_url, http })
    }

    async fn get(
        &self,
        endpoint: &str,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<String, WeatherError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut params: Vec<(&str, String)> = match query {
            LocationQuery::Place(name) => vec![("q", name.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
        };
        params.push(("units", units.as_query().to_string()));
        params.push(("appid", self.api_key.clone()));

        debug!(endpoint, %query, %units, "sending OpenWeather request");

        let res = self.http.get(&url).query(&params).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "OpenWeather request failed");
            return Err(WeatherError::Api { status: status.as_u16(), body });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<CurrentConditions, WeatherError> {
        let body = self.get("weather", query, units).await?;
        parse_current(&body)
    }

    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        units: UnitSystem,
    ) -> Result<Forecast, WeatherError> {
        let body = self.get("forecast", query, units).await?;
        parse_forecast(&body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    humidity: Option<u8>,
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    visibility: Option<u32>,
    sys: Option<OwSys>,
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Option<Vec<OwForecastEntry>>,
    city: Option<OwCity>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, WeatherError> {
    value.ok_or_else(|| WeatherError::malformed(format!("missing field `{field}`")))
}

fn condition(weather: Vec<OwWeather>, field: &str) -> Result<Condition, WeatherError> {
    let first = required(weather.into_iter().next(), field)?;
    Ok(Condition { main: first.main, description: first.description, icon: first.icon })
}

fn timestamp(secs: i64, field: &str) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| WeatherError::malformed(format!("invalid timestamp in `{field}`")))
}

fn utc_offset(secs: Option<i32>) -> FixedOffset {
    secs.and_then(FixedOffset::east_opt).unwrap_or_else(|| Utc.fix())
}

fn parse_json<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, WeatherError> {
    serde_json::from_str(body).map_err(|e| WeatherError::malformed(format!("invalid JSON: {e}")))
}

pub(crate) fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let parsed: OwCurrentResponse = parse_json(body)?;

    let city = required(parsed.name, "name")?;
    let sys = required(parsed.sys, "sys")?;
    let country = required(sys.country, "sys.country")?;
    let main = required(parsed.main, "main")?;
    let temperature = required(main.temp, "main.temp")?;
    let condition = condition(parsed.weather, "weather[0]")?;

    let observed_at = match parsed.dt {
        Some(dt) => timestamp(dt, "dt")?,
        None => Utc::now(),
    };

    Ok(CurrentConditions {
        city,
        country,
        observed_at,
        condition,
        temperature,
        wind_speed: parsed.wind.and_then(|w| w.speed).unwrap_or_default(),
        humidity: main.humidity.unwrap_or_default(),
        pressure: main.pressure.unwrap_or_default(),
        visibility_meters: parsed.visibility,
        sunrise: sys.sunrise.map(|s| timestamp(s, "sys.sunrise")).transpose()?,
        sunset: sys.sunset.map(|s| timestamp(s, "sys.sunset")).transpose()?,
        utc_offset: utc_offset(parsed.timezone),
    })
}

pub(crate) fn parse_forecast(body: &str) -> Result<Forecast, WeatherError> {
    let parsed: OwForecastResponse = parse_json(body)?;
    let list = required(parsed.list, "list")?;

    let mut samples = list
        .into_iter()
        .enumerate()
        .map(|(i, entry)| -> Result<ForecastSample, WeatherError> {
            let dt = required(entry.dt, &format!("list[{i}].dt"))?;
            let main = required(entry.main, &format!("list[{i}].main"))?;
            Ok(ForecastSample {
                timestamp: timestamp(dt, &format!("list[{i}].dt"))?,
                temperature: required(main.temp, &format!("list[{i}].main.temp"))?,
                condition: condition(entry.weather, &format!("list[{i}].weather[0]"))?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    samples.sort_by_key(|s| s.timestamp);

    Ok(Forecast { samples, utc_offset: utc_offset(parsed.city.and_then(|c| c.timezone)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "coord": {"lon": 71.5785, "lat": 34.008},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 24.6, "feels_like": 24.1, "pressure": 1014, "humidity": 38},
        "visibility": 10000,
        "wind": {"speed": 2.06, "deg": 340},
        "dt": 1792400400,
        "sys": {"country": "PK", "sunrise": 1792375800, "sunset": 1792416600},
        "timezone": 18000,
        "name": "Peshawar",
        "cod": 200
    }"#;

    #[test]
    fn parses_full_current_payload() {
        let current = parse_current(CURRENT).expect("valid payload");
        assert_eq!(current.city, "Peshawar");
        assert_eq!(current.country, "PK");
        assert_eq!(current.condition.main, "Clear");
        assert_eq!(current.condition.icon, "01d");
        assert_eq!(current.temperature, 24.6);
        assert_eq!(current.humidity, 38);
        assert_eq!(current.pressure, 1014);
        assert_eq!(current.visibility_meters, Some(10_000));
        assert_eq!(current.utc_offset.local_minus_utc(), 18_000);
        assert!(current.sunrise.is_some());
        assert_eq!(current.location_key(), "Peshawar,PK");
    }

    #[test]
    fn optional_current_fields_default() {
        let body = r#"{
            "name": "Nowhere",
            "sys": {"country": "XX"},
            "main": {"temp": 1.0},
            "weather": [{"main": "Mist", "description": "mist", "icon": "50n"}]
        }"#;
        let current = parse_current(body).expect("required fields present");
        assert_eq!(current.wind_speed, 0.0);
        assert_eq!(current.visibility_meters, None);
        assert_eq!(current.sunset, None);
        assert_eq!(current.utc_offset.local_minus_utc(), 0);
    }

    #[test]
    fn missing_required_current_fields_are_malformed() {
        let cases = [
            (r#"{"sys":{"country":"PK"},"main":{"temp":1.0},"weather":[{}]}"#, "name"),
            (r#"{"name":"A","sys":{},"main":{"temp":1.0},"weather":[{}]}"#, "sys.country"),
            (r#"{"name":"A","sys":{"country":"PK"},"main":{},"weather":[{}]}"#, "main.temp"),
            (r#"{"name":"A","sys":{"country":"PK"},"main":{"temp":1.0},"weather":[]}"#, "weather[0]"),
        ];

        for (body, field) in cases {
            match parse_current(body) {
                Err(WeatherError::MalformedResponse(msg)) => {
                    assert!(msg.contains(field), "{msg} should name {field}")
                }
                other => panic!("expected malformed response for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_current("<html>oops</html>").unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn forecast_is_sorted_and_keeps_offset() {
        let body = r#"{
            "list": [
                {"dt": 1792411200, "main": {"temp": 20.0}, "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}]},
                {"dt": 1792400400, "main": {"temp": 25.0}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}]}
            ],
            "city": {"name": "Peshawar", "country": "PK", "timezone": 18000}
        }"#;
        let forecast = parse_forecast(body).expect("valid forecast");
        assert_eq!(forecast.samples.len(), 2);
        assert_eq!(forecast.samples[0].temperature, 25.0);
        assert_eq!(forecast.samples[1].condition.main, "Rain");
        assert_eq!(forecast.utc_offset.local_minus_utc(), 18_000);
    }

    #[test]
    fn forecast_entry_without_weather_is_malformed() {
        let body = r#"{"list": [{"dt": 1792400400, "main": {"temp": 25.0}, "weather": []}]}"#;
        let err = parse_forecast(body).unwrap_err();
        assert!(err.to_string().contains("list[0].weather[0]"));
    }

    #[test]
    fn forecast_without_list_is_malformed() {
        let err = parse_forecast(r#"{"cod":"200"}"#).unwrap_err();
        assert!(err.to_string().contains("`list`"));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = OpenWeatherClient::with_base_url("k".into(), "http://localhost:1234").unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/");
    }
}
