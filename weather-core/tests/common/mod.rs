#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Mutex;
use weather_core::{Notice, Presenter, ViewModel};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const API_KEY: &str = "TEST_KEY";
/// 2026-10-19 09:00 UTC, 14:00 in Peshawar.
pub const FORECAST_START: i64 = 1_792_400_400;
pub const PESHAWAR_OFFSET: i64 = 18_000;

pub fn current_payload(city: &str, country: &str, temp: f64) -> Value {
    json!({
        "coord": {"lon": 71.5785, "lat": 34.008},
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": temp, "feels_like": temp, "pressure": 1014, "humidity": 38},
        "visibility": 10000,
        "wind": {"speed": 2.06, "deg": 340},
        "dt": FORECAST_START,
        "sys": {"country": country, "sunrise": FORECAST_START - 25_000, "sunset": FORECAST_START + 16_000},
        "timezone": PESHAWAR_OFFSET,
        "name": city,
        "cod": 200
    })
}

/// Temperature of sample `i`: a sawtooth so each day has a distinct max/min.
pub fn sample_temp(i: i64) -> f64 {
    20.0 + (i % 8) as f64 * 1.5
}

pub fn forecast_payload(count: i64) -> Value {
    let list: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "dt": FORECAST_START + i * 3 * 3600,
                "main": {"temp": sample_temp(i), "humidity": 40, "pressure": 1012},
                "weather": [{"main": "Clouds", "description": format!("sample {i}"), "icon": format!("{:02}d", i % 10)}],
            })
        })
        .collect();

    json!({
        "cod": "200",
        "cnt": count,
        "list": list,
        "city": {"name": "Peshawar", "country": "PK", "timezone": PESHAWAR_OFFSET}
    })
}

pub async fn mount_city(server: &MockServer, query: &str, units: &str, city: &str, temp: f64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", query))
        .and(query_param("units", units))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_payload(city, "PK", temp)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", query))
        .and(query_param("units", units))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_payload(40)))
        .mount(server)
        .await;
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub renders: Mutex<Vec<ViewModel>>,
    pub notices: Mutex<Vec<Notice>>,
}

impl Presenter for RecordingPresenter {
    fn render(&self, view: &ViewModel) {
        self.renders.lock().unwrap().push(view.clone());
    }

    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn query_of(request: &wiremock::Request, key: &str) -> Option<String> {
    request.url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
}
