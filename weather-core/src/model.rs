use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement system sent to the API and used for display suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(UnitSystem::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What the remote API is asked about: a place name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Place(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn place(name: impl Into<String>) -> Self {
        LocationQuery::Place(name.into())
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Place(name) => f.write_str(name),
            LocationQuery::Coordinates(c) => write!(f, "{:.4},{:.4}", c.latitude, c.longitude),
        }
    }
}

/// Condition block reported with every observation and forecast sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition group such as "Clear" or "Rain".
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// Current conditions for a resolved location, replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub city: String,
    pub country: String,
    pub observed_at: DateTime<Utc>,
    pub condition: Condition,
    pub temperature: f64,
    pub wind_speed: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub visibility_meters: Option<u32>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    /// Offset of the location's local time from UTC.
    pub utc_offset: FixedOffset,
}

impl CurrentConditions {
    /// `"city,country"`, the form remembered as the last location.
    pub fn location_key(&self) -> String {
        format!("{},{}", self.city, self.country)
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

/// One 3-hourly forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub condition: Condition,
}

/// Forecast samples in ascending time order plus the location's UTC offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub samples: Vec<ForecastSample>,
    pub utc_offset: FixedOffset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_system_as_str_roundtrip() {
        for units in UnitSystem::all() {
            let parsed = UnitSystem::try_from(units.as_query()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unit_system_accepts_short_forms() {
        assert_eq!(UnitSystem::try_from("F").unwrap(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::try_from(" c ").unwrap(), UnitSystem::Metric);
    }

    #[test]
    fn unknown_unit_system_error() {
        let err = UnitSystem::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown unit system"));
    }

    #[test]
    fn query_display_uses_place_or_coordinates() {
        assert_eq!(LocationQuery::place("Peshawar").to_string(), "Peshawar");
        let coords = LocationQuery::Coordinates(Coordinates::new(34.0, 71.5));
        assert_eq!(coords.to_string(), "34.0000,71.5000");
    }
}
