//! Weather API client.
//!
//! Geocodes city names and fetches current conditions from an
//! OpenWeather-compatible API. The API key comes from [`WeatherConfig`] and
//! is attached to each request; it is never read from the environment here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use depot_core::constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_WEATHER_API_BASE, WEATHER_UNITS};
use depot_core::error::{DepotError, Result};
use depot_core::traits::WeatherProvider;
use depot_core::types::{Coordinates, WeatherReport};

const GEOCODE_PATH: &str = "geo/1.0/direct";
const CURRENT_WEATHER_PATH: &str = "data/2.5/weather";

/// Weather client configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key sent as `appid`
    pub api_key: String,
    /// Base URL shared by the geocoding and weather endpoints
    pub api_base: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl WeatherConfig {
    /// Creates config for the public API with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_WEATHER_API_BASE.into(),
            timeout_seconds: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }

    /// Points the client at a different base URL (proxies, test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// HTTP client for geocoding and current weather.
pub struct WeatherClient {
    config: WeatherConfig,
    base: Url,
    http_client: reqwest::Client,
}

impl WeatherClient {
    /// Creates a client, validating the key and base URL.
    pub fn with_config(config: WeatherConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DepotError::ConfigError("weather API key is empty".into()));
        }

        // A trailing slash makes `join` append instead of replacing the last segment.
        let base = format!("{}/", config.api_base.trim_end_matches('/'));
        let base = Url::parse(&base)
            .map_err(|e| DepotError::ConfigError(format!("invalid weather API base URL: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DepotError::ConfigError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            base,
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| DepotError::InternalError(format!("bad endpoint path {path}: {e}")))
    }

    async fn get_json<T>(&self, url: Url, query: &[(&str, String)]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .query(&[("appid", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                // The request URL carries the API key.
                let e = e.without_url();
                if e.is_timeout() {
                    DepotError::ConnectionTimeout(e.to_string())
                } else {
                    DepotError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DepotError::WeatherApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DepotError::MalformedResponse(e.without_url().to_string()))
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[instrument(skip(self))]
    async fn geocode(&self, city_name: &str) -> Result<Coordinates> {
        let url = self.endpoint(GEOCODE_PATH)?;
        let matches: Vec<GeoMatch> = self
            .get_json(url, &[("q", city_name.to_string()), ("limit", "1".into())])
            .await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| DepotError::CityNotFound(city_name.to_string()))?;

        debug!(lat = first.lat, lon = first.lon, "Geocoded city");
        Coordinates::new(first.lat, first.lon)
            .map_err(|e| DepotError::MalformedResponse(e.to_string()))
    }

    #[instrument(skip(self), fields(lat = coordinates.lat, lon = coordinates.lon))]
    async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherReport> {
        let url = self.endpoint(CURRENT_WEATHER_PATH)?;
        let body: CurrentWeatherResponse = self
            .get_json(
                url,
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                    ("units", WEATHER_UNITS.to_string()),
                ],
            )
            .await?;

        let condition = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| DepotError::MalformedResponse("no weather conditions in response".into()))?;

        debug!(description = %condition.description, temperature = body.main.temp, "Fetched current weather");
        Ok(WeatherReport::new(condition.description, body.main.temp))
    }
}

#[derive(Debug, Deserialize)]
struct GeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}
