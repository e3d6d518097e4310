//! Device location providers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::debug;

use crate::{error::GeolocationError, model::Coordinates};

pub const IPAPI_URL: &str = "https://ipapi.co/json/";

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// Coordinates supplied up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeolocator;

#[async_trait]
impl Geolocator for UnsupportedGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Approximate location from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl IpGeolocator {
    pub fn new() -> Result<Self, GeolocationError> {
        Self::with_url(IPAPI_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, GeolocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| GeolocationError::Unavailable(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        let unavailable = |e: reqwest::Error| GeolocationError::Unavailable(e.to_string());

        let response: IpApiResponse = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        match (response.latitude, response.longitude) {
            (Some(lat), Some(lon)) => {
                debug!(lat, lon, "resolved location from IP");
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(GeolocationError::Unavailable("lookup returned no coordinates".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_geolocator_returns_its_coordinates() {
        let geo = FixedGeolocator(Coordinates::new(34.0, 71.5));
        assert_eq!(geo.locate().await.unwrap(), Coordinates::new(34.0, 71.5));
    }

    #[tokio::test]
    async fn unsupported_geolocator_fails() {
        let err = UnsupportedGeolocator.locate().await.unwrap_err();
        assert_eq!(err, GeolocationError::Unsupported);
    }
}
