//! Presentation-ready view model and the sink that renders it.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::Serialize;
use std::fmt::Debug;

use crate::{
    error::DashboardError,
    forecast::{self, DAILY_SLOTS, DailyBucket, HOURLY_SLOTS},
    format,
    metrics::{self, UvRisk, Visibility, WeatherTheme},
    model::{Condition, CurrentConditions, Forecast, ForecastSample, UnitSystem},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub location: String,
    pub date: String,
    pub updated: String,
    pub units: UnitSystem,
    pub current: CurrentPanel,
    pub theme: WeatherTheme,
    pub hourly: Vec<HourlySlot>,
    pub daily: Vec<DaySummary>,
    pub uv: Option<UvReport>,
    pub visibility: Option<VisibilityReport>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPanel {
    pub description: String,
    pub icon_url: String,
    pub temperature: i64,
    pub wind_speed: i64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub hour: String,
    pub icon_url: String,
    pub description: String,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub date: NaiveDate,
    pub icon_url: String,
    pub description: String,
    pub max_temperature: i64,
    pub min_temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UvReport {
    pub index: f64,
    pub risk: UvRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibilityReport {
    pub km: f64,
    pub class: Visibility,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    Validation,
    FetchFailed,
    Geolocation,
}

/// A one-off message for the user; the controller never stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&DashboardError> for Notice {
    fn from(err: &DashboardError) -> Self {
        let kind = match err {
            DashboardError::Validation(_) => NoticeKind::Validation,
            DashboardError::Fetch(_) => NoticeKind::FetchFailed,
            DashboardError::Geolocation(_) | DashboardError::CurrentLocation(_) => {
                NoticeKind::Geolocation
            }
        };
        Notice { kind, message: err.user_message() }
    }
}

/// Rendering surface. Only `render` is required.
pub trait Presenter: Send + Sync + Debug {
    fn render(&self, view: &ViewModel);

    fn notify(&self, _notice: &Notice) {}

    fn set_loading(&self, _loading: bool) {}
}

fn icon_url(base: &str, icon: &str, large: bool) -> String {
    if large { format!("{base}{icon}@2x.png") } else { format!("{base}{icon}.png") }
}

fn hourly_slot(sample: &ForecastSample, tz: &FixedOffset, base: &str) -> HourlySlot {
    let local = sample.timestamp.with_timezone(tz);
    HourlySlot {
        hour: format::format_hour(local.hour()),
        icon_url: icon_url(base, &sample.condition.icon, false),
        description: sample.condition.description.clone(),
        temperature: format::round_half_up(sample.temperature),
    }
}

fn day_summary(bucket: &DailyBucket, base: &str) -> DaySummary {
    let Condition { description, icon, .. } = &bucket.condition;
    DaySummary {
        day: format::format_day(&bucket.date),
        date: bucket.date,
        icon_url: icon_url(base, icon, false),
        description: description.clone(),
        max_temperature: format::round_half_up(bucket.max_temperature()),
        min_temperature: format::round_half_up(bucket.min_temperature()),
    }
}

/// Projects fetched data into what the presenter shows.
///
/// Times are rendered in the forecast's UTC offset, so hourly labels and day
/// boundaries always agree. `uv_index` is `None` when no UV source has a reading.
pub fn build_view_model(
    current: &CurrentConditions,
    forecast: &Forecast,
    units: UnitSystem,
    uv_index: Option<f64>,
    icon_base_url: &str,
    updated_at: DateTime<Utc>,
) -> ViewModel {
    let tz = forecast.utc_offset;
    let observed = current.observed_at.with_timezone(&tz);

    let hourly = forecast::next_hours(&forecast.samples, HOURLY_SLOTS)
        .iter()
        .map(|s| hourly_slot(s, &tz, icon_base_url))
        .collect();

    let buckets = forecast::group_by_day(&forecast.samples, &tz);
    let daily = forecast::next_days(buckets, DAILY_SLOTS)
        .iter()
        .map(|b| day_summary(b, icon_base_url))
        .collect();

    let visibility = current.visibility_meters.map(|meters| {
        let km = metrics::visibility_km(meters);
        let class = metrics::classify_visibility(km);
        VisibilityReport { km, class, description: class.description() }
    });

    ViewModel {
        location: current.display_name(),
        date: format::format_date(&observed),
        updated: format::format_updated(&updated_at.with_timezone(&tz)),
        units,
        current: CurrentPanel {
            description: current.condition.description.clone(),
            icon_url: icon_url(icon_base_url, &current.condition.icon, true),
            temperature: format::round_half_up(current.temperature),
            wind_speed: format::round_half_up(current.wind_speed),
            humidity: current.humidity,
            pressure: current.pressure,
        },
        theme: metrics::classify_weather_theme(&current.condition.main),
        hourly,
        daily,
        uv: uv_index.map(|index| UvReport { index, risk: metrics::classify_uv_risk(index) }),
        visibility,
        sunrise: current.sunrise.map(|t| format::format_time(&t.with_timezone(&tz))),
        sunset: current.sunset.map(|t| format::format_time(&t.with_timezone(&tz))),
    }
}
