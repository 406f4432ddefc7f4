//! Cached weather for warehouse detail views.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use depot_cache::{CacheConfig, CacheLookup, CacheStats, TimedLookupCache};
use depot_core::constants::DEFAULT_WEATHER_TTL;
use depot_core::error::Result;
use depot_core::traits::WeatherProvider;
use depot_core::types::{Warehouse, WarehouseId, WeatherReport};

/// Per-warehouse weather, memoized for a freshness window.
///
/// Keys the cache by warehouse id and builds the fetch from the warehouse's
/// coordinates or city name.
pub struct WarehouseWeather {
    provider: Arc<dyn WeatherProvider>,
    cache: TimedLookupCache<WarehouseId, WeatherReport>,
    freshness: Duration,
}

impl WarehouseWeather {
    /// Creates a service with a default cache and a one hour freshness window.
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_cache(
            provider,
            TimedLookupCache::with_config(CacheConfig::default()),
            DEFAULT_WEATHER_TTL,
        )
    }

    /// Creates a service around an existing cache.
    pub fn with_cache(
        provider: Arc<dyn WeatherProvider>,
        cache: TimedLookupCache<WarehouseId, WeatherReport>,
        freshness: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            freshness,
        }
    }

    /// Current weather for a warehouse, from cache when fresh.
    #[instrument(skip(self, warehouse), fields(warehouse_id = warehouse.warehouse_id))]
    pub async fn weather_for(&self, warehouse: &Warehouse) -> Result<CacheLookup<WeatherReport>> {
        let provider = Arc::clone(&self.provider);
        let target = warehouse.clone();

        let found = self
            .cache
            .lookup(warehouse.warehouse_id, self.freshness, move || async move {
                provider.weather_for(&target).await
            })
            .await?;

        debug!(source = ?found.source, fetched_at = %found.fetched_at, "Weather resolved");
        Ok(found)
    }

    /// Freshness window applied to every lookup.
    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use depot_cache::{LookupSource, ManualClock};
    use depot_core::error::DepotError;
    use depot_core::types::{Coordinates, NewWarehouse};
    use std::sync::Mutex;

    /// Provider replaying a fixed script of results.
    struct Script {
        replies: Mutex<Vec<Result<WeatherReport>>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(mut replies: Vec<Result<WeatherReport>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for Script {
        async fn geocode(&self, _city_name: &str) -> Result<Coordinates> {
            Ok(Coordinates { lat: 0.0, lon: 0.0 })
        }

        async fn current_weather(&self, _coordinates: Coordinates) -> Result<WeatherReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(DepotError::InternalError("script exhausted".into())))
        }
    }

    fn service(
        replies: Vec<Result<WeatherReport>>,
        config: CacheConfig,
    ) -> (WarehouseWeather, Arc<Script>, Arc<ManualClock>) {
        let script = Arc::new(Script::new(replies));
        let clock = Arc::new(ManualClock::at_epoch());
        let cache = TimedLookupCache::with_clock(config, clock.clone());
        let svc = WarehouseWeather::with_cache(script.clone(), cache, DEFAULT_WEATHER_TTL);
        (svc, script, clock)
    }

    fn denver() -> Warehouse {
        Warehouse::from_new(1, NewWarehouse::parse("Denver", "DEN").unwrap())
    }

    #[tokio::test]
    async fn test_second_view_within_hour_is_cached() {
        let (svc, script, clock) = service(
            vec![Ok(WeatherReport::new("clear", 70.0))],
            CacheConfig::default(),
        );

        let first = svc.weather_for(&denver()).await.unwrap();
        assert_eq!(first.source, LookupSource::Fetched);

        clock.advance(Duration::from_secs(1800));
        let second = svc.weather_for(&denver()).await.unwrap();
        assert_eq!(second.source, LookupSource::Cached);
        assert_eq!(second.value, WeatherReport::new("clear", 70.0));
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_after_hour() {
        let (svc, script, clock) = service(
            vec![
                Ok(WeatherReport::new("clear", 70.0)),
                Ok(WeatherReport::new("rain", 60.0)),
            ],
            CacheConfig::default(),
        );

        svc.weather_for(&denver()).await.unwrap();
        clock.advance(Duration::from_secs(3601));
        let refreshed = svc.weather_for(&denver()).await.unwrap();

        assert_eq!(refreshed.value, WeatherReport::new("rain", 60.0));
        assert_eq!(refreshed.fetched_at.timestamp(), 3601);
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unavailable_weather_surfaces() {
        let (svc, _script, clock) = service(
            vec![
                Ok(WeatherReport::new("clear", 70.0)),
                Err(DepotError::HttpError("503".into())),
            ],
            CacheConfig::default(),
        );

        svc.weather_for(&denver()).await.unwrap();
        clock.advance(Duration::from_secs(3601));
        let err = svc.weather_for(&denver()).await.unwrap_err();
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_last_known_weather_when_configured() {
        let (svc, _script, clock) = service(
            vec![
                Ok(WeatherReport::new("clear", 70.0)),
                Err(DepotError::HttpError("503".into())),
            ],
            CacheConfig::default().serve_stale_on_failure(),
        );

        svc.weather_for(&denver()).await.unwrap();
        clock.advance(Duration::from_secs(3601));
        let found = svc.weather_for(&denver()).await.unwrap();
        assert!(found.is_stale());
        assert_eq!(found.value, WeatherReport::new("clear", 70.0));
    }

    #[tokio::test]
    async fn test_warehouses_cached_independently() {
        let (svc, script, _clock) = service(
            vec![
                Ok(WeatherReport::new("clear", 70.0)),
                Ok(WeatherReport::new("fog", 52.0)),
            ],
            CacheConfig::default(),
        );
        let sfo = Warehouse::from_new(2, NewWarehouse::parse("San Francisco", "SFO").unwrap());

        assert_eq!(svc.weather_for(&denver()).await.unwrap().value.description, "clear");
        assert_eq!(svc.weather_for(&sfo).await.unwrap().value.description, "fog");
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
        assert_eq!(svc.stats().entries, 2);
    }
}
