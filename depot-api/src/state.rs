//! App state: warehouse directory, cached weather, config.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use depot_cache::{CacheConfig, TimedLookupCache};
use depot_core::constants::{DEFAULT_FETCH_TIMEOUT, DEFAULT_WEATHER_API_BASE, DEFAULT_WEATHER_TTL};
use depot_core::error::{DepotError, Result};
use depot_core::traits::{WarehouseDirectory, WeatherProvider};
use depot_core::types::NewWarehouse;
use depot_registry::MemoryWarehouseDirectory;
use depot_weather::{WarehouseWeather, WeatherClient, WeatherConfig};

/// Server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Weather API key
    pub weather_api_key: Option<String>,
    /// Weather API base URL
    pub weather_api_base: String,
    /// How long a weather report stays fresh
    pub cache_ttl: Duration,
    /// Upper bound on a single weather fetch
    pub fetch_timeout: Duration,
    /// LRU bound on cached reports
    pub cache_max_entries: Option<usize>,
    /// Serve the last known report when a refresh fails
    pub serve_stale: bool,
    /// Warehouses loaded at startup, as (city name, city code)
    pub warehouses: Vec<(String, String)>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("weather_api_key", &self.weather_api_key.as_ref().map(|_| "<redacted>"))
            .field("weather_api_base", &self.weather_api_base)
            .field("cache_ttl", &self.cache_ttl)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("serve_stale", &self.serve_stale)
            .field("warehouses", &self.warehouses)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            weather_api_base: DEFAULT_WEATHER_API_BASE.into(),
            cache_ttl: DEFAULT_WEATHER_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cache_max_entries: None,
            serve_stale: false,
            warehouses: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Loads `.env` and reads configuration from the environment.
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            weather_api_key: std::env::var("OPENWEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            weather_api_base: std::env::var("OPENWEATHER_API_BASE")
                .unwrap_or(defaults.weather_api_base),
            cache_ttl: env_secs("WEATHER_CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl),
            fetch_timeout: env_secs("WEATHER_FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout),
            cache_max_entries: std::env::var("WEATHER_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &usize| n > 0),
            serve_stale: std::env::var("WEATHER_SERVE_STALE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            warehouses: std::env::var("DEPOT_WAREHOUSES")
                .map(|v| parse_warehouse_list(&v))
                .unwrap_or_default(),
        }
    }

    /// Cache configuration derived from these settings.
    pub fn cache_config(&self) -> CacheConfig {
        let mut config = CacheConfig::default().with_fetch_timeout(self.fetch_timeout);
        if let Some(max_entries) = self.cache_max_entries {
            config = config.with_max_entries(max_entries);
        }
        if self.serve_stale {
            config = config.serve_stale_on_failure();
        }
        config
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            warn!(name, value = %raw, "Ignoring unparsable duration");
            None
        }
    }
}

/// Parses `Denver:DEN,Austin:AUS` into (name, code) pairs.
fn parse_warehouse_list(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|item| {
            let (name, code) = item.split_once(':')?;
            Some((name.trim().to_string(), code.trim().to_string()))
        })
        .collect()
}

/// Shared handler state.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// Warehouse records
    pub directory: MemoryWarehouseDirectory,
    /// Cached weather per warehouse
    pub weather: WarehouseWeather,
}

impl AppState {
    /// Builds state backed by the live weather API.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let api_key = config.weather_api_key.clone().ok_or_else(|| {
            DepotError::ConfigError("OPENWEATHER_API_KEY is not set".into())
        })?;

        let client = WeatherClient::with_config(
            WeatherConfig::new(api_key)
                .with_api_base(config.weather_api_base.clone())
                .with_timeout_seconds(config.fetch_timeout.as_secs().max(1)),
        )?;

        Ok(Self::with_provider(config, Arc::new(client)))
    }

    /// Builds state around any weather provider.
    pub fn with_provider(config: ApiConfig, provider: Arc<dyn WeatherProvider>) -> Self {
        let cache = TimedLookupCache::with_config(config.cache_config());
        let weather = WarehouseWeather::with_cache(provider, cache, config.cache_ttl);

        Self {
            config,
            directory: MemoryWarehouseDirectory::new(),
            weather,
        }
    }

    /// Adds the configured startup warehouses to the directory.
    pub async fn seed_directory(&self) -> Result<usize> {
        for (name, code) in &self.config.warehouses {
            let added = self.directory.add(NewWarehouse::parse(name, code)?).await?;
            info!(
                id = added.warehouse_id,
                city = %added.city_name,
                code = %added.city_code,
                "Loaded warehouse"
            );
        }
        Ok(self.config.warehouses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_cache::RefreshFailurePolicy;

    #[test]
    fn test_parse_warehouse_list() {
        let parsed = parse_warehouse_list("Denver:DEN, san francisco : sfo ,bogus");
        assert_eq!(
            parsed,
            vec![
                ("Denver".to_string(), "DEN".to_string()),
                ("san francisco".to_string(), "sfo".to_string()),
            ]
        );
    }

    #[test]
    fn test_cache_config_from_settings() {
        let config = ApiConfig {
            fetch_timeout: Duration::from_secs(3),
            cache_max_entries: Some(64),
            serve_stale: true,
            ..ApiConfig::default()
        };

        let cache = config.cache_config();
        assert_eq!(cache.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(cache.max_entries, Some(64));
        assert_eq!(cache.on_refresh_failure, RefreshFailurePolicy::ServeStale);
    }

    #[test]
    fn test_live_state_requires_api_key() {
        let err = AppState::new(ApiConfig::default()).err().unwrap();
        assert!(matches!(err, DepotError::ConfigError(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ApiConfig {
            weather_api_key: Some("super-secret".into()),
            ..ApiConfig::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
