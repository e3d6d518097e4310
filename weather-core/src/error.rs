use thiserror::Error;

const MAX_BODY: usize = 200;

/// Failure of a single request to the weather API.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {}", truncate_body(.body))]
    Api { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        WeatherError::MalformedResponse(detail.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Geolocation is not supported")]
    Unsupported,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the dashboard controller.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] WeatherError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Device coordinates were found but could not be resolved to a place.
    #[error("Failed to resolve the current location: {0}")]
    CurrentLocation(#[source] WeatherError),
}

impl DashboardError {
    /// Text shown to the user in a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Validation(message) => message.clone(),
            DashboardError::Fetch(_) => {
                "Failed to fetch weather data. Please check the location and try again.".to_string()
            }
            DashboardError::Geolocation(GeolocationError::Unsupported) => {
                "Geolocation is not supported on this device.".to_string()
            }
            DashboardError::Geolocation(GeolocationError::PermissionDenied) => {
                "Location access denied. Please enable location services.".to_string()
            }
            DashboardError::Geolocation(GeolocationError::Unavailable(_))
            | DashboardError::CurrentLocation(_) => {
                "Failed to get weather for your location.".to_string()
            }
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() > MAX_BODY {
        let mut end = MAX_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_truncates_long_bodies() {
        let err = WeatherError::Api { status: 500, body: "x".repeat(500) };
        let msg = err.to_string();
        assert!(msg.starts_with("API request failed with status 500: "));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 260);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn fetch_errors_share_one_user_message() {
        let api = DashboardError::from(WeatherError::Api { status: 404, body: "city not found".into() });
        let malformed = DashboardError::from(WeatherError::malformed("name"));
        assert_eq!(api.user_message(), malformed.user_message());
    }

    #[test]
    fn geolocation_message_differs_from_fetch_message() {
        let geo = DashboardError::from(GeolocationError::PermissionDenied);
        let fetch = DashboardError::from(WeatherError::malformed("name"));
        assert_ne!(geo.user_message(), fetch.user_message());
        assert!(geo.user_message().contains("Location access denied"));
    }

    #[test]
    fn reverse_lookup_failure_keeps_location_message() {
        let err = DashboardError::CurrentLocation(WeatherError::Api { status: 401, body: "bad key".into() });
        assert_eq!(err.user_message(), "Failed to get weather for your location.");
        assert!(err.to_string().contains("status 401"));
    }
}
