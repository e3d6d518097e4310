//! Derived metrics: visibility class, UV risk and weather theme.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use crate::model::CurrentConditions;

/// Top of the UV scale used for the progress percentage.
pub const UV_SCALE_MAX: f64 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Perfect,
    Good,
    Moderate,
    Poor,
}

impl Visibility {
    pub fn label(&self) -> &'static str {
        match self {
            Visibility::Perfect => "Perfect",
            Visibility::Good => "Good",
            Visibility::Moderate => "Moderate",
            Visibility::Poor => "Poor",
        }
    }

    /// "Perfect visibility"
    pub fn description(&self) -> String {
        format!("{} visibility", self.label())
    }
}

/// Thresholds are exclusive: exactly 10 km is "Good", not "Perfect".
pub fn classify_visibility(km: f64) -> Visibility {
    if km > 10.0 {
        Visibility::Perfect
    } else if km > 5.0 {
        Visibility::Good
    } else if km > 2.0 {
        Visibility::Moderate
    } else {
        Visibility::Poor
    }
}

/// Meters to kilometers, rounded to one decimal place.
pub fn visibility_km(meters: u32) -> f64 {
    (f64::from(meters) / 100.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn label(&self) -> &'static str {
        match self {
            UvLevel::Low => "Low",
            UvLevel::Moderate => "Moderate",
            UvLevel::High => "High",
            UvLevel::VeryHigh => "Very High",
            UvLevel::Extreme => "Extreme",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            UvLevel::Low => "#4cc9f0",
            UvLevel::Moderate => "#4361ee",
            UvLevel::High => "#7209b7",
            UvLevel::VeryHigh => "#f72585",
            UvLevel::Extreme => "#d90429",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UvRisk {
    pub level: UvLevel,
    pub label: &'static str,
    pub color: &'static str,
    /// Share of the 0..11 scale; not clamped, so indices above 11 exceed 100.
    pub percentage: f64,
}

pub fn classify_uv_risk(index: f64) -> UvRisk {
    let level = if index < 3.0 {
        UvLevel::Low
    } else if index < 6.0 {
        UvLevel::Moderate
    } else if index < 8.0 {
        UvLevel::High
    } else if index < 11.0 {
        UvLevel::VeryHigh
    } else {
        UvLevel::Extreme
    };

    UvRisk {
        level,
        label: level.label(),
        color: level.color(),
        percentage: index / UV_SCALE_MAX * 100.0,
    }
}

/// Visual theme derived from the condition group of the current weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherTheme {
    ClearSky,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
    Default,
}

impl WeatherTheme {
    pub fn token(&self) -> &'static str {
        match self {
            WeatherTheme::ClearSky => "clear-sky",
            WeatherTheme::Cloudy => "cloudy",
            WeatherTheme::Rainy => "rainy",
            WeatherTheme::Snowy => "snowy",
            WeatherTheme::Stormy => "stormy",
            WeatherTheme::Default => "default-weather",
        }
    }
}

pub fn classify_weather_theme(condition: &str) -> WeatherTheme {
    match condition.trim().to_lowercase().as_str() {
        "clear" => WeatherTheme::ClearSky,
        "clouds" => WeatherTheme::Cloudy,
        "rain" => WeatherTheme::Rainy,
        "snow" => WeatherTheme::Snowy,
        "thunderstorm" => WeatherTheme::Stormy,
        _ => WeatherTheme::Default,
    }
}

/// Source of the UV index, which the forecast API does not report.
#[async_trait]
pub trait UvSource: Send + Sync + Debug {
    /// `None` when no reading is available for these conditions.
    async fn uv_index(&self, current: &CurrentConditions) -> Option<f64>;
}

/// Always reports the same index.
#[derive(Debug, Clone, Copy)]
pub struct FixedUvIndex(pub f64);

#[async_trait]
impl UvSource for FixedUvIndex {
    async fn uv_index(&self, _current: &CurrentConditions) -> Option<f64> {
        Some(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoUvIndex;

#[async_trait]
impl UvSource for NoUvIndex {
    async fn uv_index(&self, _current: &CurrentConditions) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_boundaries_are_exclusive() {
        assert_eq!(classify_visibility(10.1), Visibility::Perfect);
        assert_eq!(classify_visibility(10.0), Visibility::Good);
        assert_eq!(classify_visibility(5.0), Visibility::Moderate);
        assert_eq!(classify_visibility(2.0), Visibility::Poor);
        assert_eq!(classify_visibility(0.0), Visibility::Poor);
    }

    #[test]
    fn visibility_description() {
        assert_eq!(classify_visibility(6.0).description(), "Good visibility");
    }

    #[test]
    fn visibility_km_rounds_to_one_decimal() {
        assert_eq!(visibility_km(10_000), 10.0);
        assert_eq!(visibility_km(10_049), 10.0);
        assert_eq!(visibility_km(10_051), 10.1);
        assert_eq!(visibility_km(0), 0.0);
    }

    #[test]
    fn uv_thresholds() {
        assert_eq!(classify_uv_risk(2.9).label, "Low");
        assert_eq!(classify_uv_risk(3.0).label, "Moderate");
        assert_eq!(classify_uv_risk(6.0).label, "High");
        assert_eq!(classify_uv_risk(8.0).label, "Very High");
        assert_eq!(classify_uv_risk(11.0).label, "Extreme");
    }

    #[test]
    fn uv_percentage_is_unclamped() {
        let risk = classify_uv_risk(5.5);
        assert!((risk.percentage - 50.0).abs() < 1e-9);
        assert!(classify_uv_risk(13.2).percentage > 100.0);
        assert_eq!(classify_uv_risk(12.0).color, "#d90429");
    }

    #[test]
    fn theme_is_case_insensitive() {
        assert_eq!(classify_weather_theme("Clear"), WeatherTheme::ClearSky);
        assert_eq!(classify_weather_theme("CLOUDS"), WeatherTheme::Cloudy);
        assert_eq!(classify_weather_theme("rain"), WeatherTheme::Rainy);
        assert_eq!(classify_weather_theme("Snow"), WeatherTheme::Snowy);
        assert_eq!(classify_weather_theme("Thunderstorm"), WeatherTheme::Stormy);
    }

    #[test]
    fn unmatched_theme_falls_back_to_default() {
        let theme = classify_weather_theme("Mist");
        assert_eq!(theme, WeatherTheme::Default);
        assert_eq!(theme.token(), "default-weather");
    }
}
