use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        forecast::{SolarForecast, SolarSite},
        provider::ForecastProvider,
    },
    error::Failure,
    prelude::*,
    storage::BlobStore,
};

/// Contents of the cache slot.
#[derive(Serialize, Deserialize)]
struct Cached {
    site: SolarSite,
    forecast: SolarForecast,
}

/// Single-slot forecast cache which refreshes once the cached forecast is outdated.
///
/// The slot is replaced as a whole and the last write wins.
pub struct ForecastCache<S, P> {
    store: S,
    provider: P,
}

impl<S: BlobStore, P: ForecastProvider> ForecastCache<S, P> {
    pub const fn new(store: S, provider: P) -> Self {
        Self { store, provider }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn get_forecast(&self, site: &SolarSite) -> Result<SolarForecast> {
        self.get_forecast_on(site, Local::now().date_naive()).await
    }

    /// Return the cached forecast if it is still valid on the date, fetch and cache a fresh one otherwise.
    #[instrument(skip_all, fields(site = %site, today = %today))]
    pub async fn get_forecast_on(&self, site: &SolarSite, today: NaiveDate) -> Result<SolarForecast> {
        if let Some(cached) = self.load()
            && cached.site == *site
            && cached.forecast.is_fresh_on(today)
        {
            info!(begin_at = %cached.forecast.info.begin_at, "using the cached forecast");
            return Ok(cached.forecast);
        }

        info!("fetching a fresh forecast…");
        let cached = Cached { site: *site, forecast: self.provider.estimate(site).await? };
        info!(n_points = cached.forecast.intervals.len(), "fetched");
        self.save(&cached);
        Ok(cached.forecast)
    }

    /// Read the slot, treating an unreadable or corrupted one as empty.
    fn load(&self) -> Option<Cached> {
        let blob = match self.store.load() {
            Ok(blob) => blob?,
            Err(error) => {
                warn!("failed to read the forecast cache: {error:#}");
                return None;
            }
        };
        match serde_json::from_slice(&blob) {
            Ok(cached) => Some(cached),
            Err(error) => {
                let failure = Failure::CacheCorruption(error.to_string());
                warn!("{failure}, discarding");
                None
            }
        }
    }

    fn save(&self, cached: &Cached) {
        let result = serde_json::to_vec(cached)
            .context("failed to serialize the forecast")
            .and_then(|blob| self.store.save(&blob));
        if let Err(error) = result {
            error!("failed to write the forecast cache: {error:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use chrono::{DateTime, TimeDelta};

    use super::*;
    use crate::{
        core::{forecast::tests::forecast, provider::SiteCheck},
        error::FailureKind,
    };

    const SITE: SolarSite = SolarSite {
        latitude: 51.27,
        longitude: 9.54,
        declination: 50.0,
        azimuth: 45.0,
        max_power_kw: 3.5,
    };

    #[derive(Default)]
    struct MemoryBlob(Mutex<Option<Vec<u8>>>);

    impl BlobStore for MemoryBlob {
        fn load(&self) -> Result<Option<Vec<u8>>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn save(&self, blob: &[u8]) -> Result {
            *self.0.lock().unwrap() = Some(blob.to_vec());
            Ok(())
        }
    }

    struct CountingProvider {
        begin_at: DateTime<Local>,
        n_calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        const fn new(begin_at: DateTime<Local>) -> Self {
            Self { begin_at, n_calls: AtomicUsize::new(0), fail: false }
        }
    }

    #[async_trait]
    impl ForecastProvider for CountingProvider {
        async fn estimate(&self, _site: &SolarSite) -> Result<SolarForecast> {
            self.n_calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                return Err(Failure::UpstreamFailure("503 Service Unavailable".into()).into());
            }
            Ok(forecast(&[(self.begin_at, 0.0), (self.begin_at + TimeDelta::hours(1), 250.0)]))
        }

        async fn check(&self, _site: &SolarSite) -> Result<SiteCheck> {
            unreachable!()
        }
    }

    fn prefilled(begin_at: DateTime<Local>, site: SolarSite) -> Result<MemoryBlob> {
        let blob = MemoryBlob::default();
        let forecast = forecast(&[(begin_at, 0.0), (begin_at + TimeDelta::hours(1), 100.0)]);
        blob.save(&serde_json::to_vec(&Cached { site, forecast })?)?;
        Ok(blob)
    }

    #[tokio::test]
    async fn test_fresh_cache_is_reused() -> Result {
        let now = Local::now();
        let cache = ForecastCache::new(prefilled(now, SITE)?, CountingProvider::new(now));
        let forecast = cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 0);
        assert_eq!(forecast.info.begin_at, now);
        Ok(())
    }

    #[tokio::test]
    async fn test_future_forecast_is_reused() -> Result {
        let now = Local::now();
        let tomorrow = now + TimeDelta::days(1);
        let cache = ForecastCache::new(prefilled(tomorrow, SITE)?, CountingProvider::new(now));
        cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_cache_is_refreshed() -> Result {
        let now = Local::now();
        let yesterday = now - TimeDelta::days(1);
        let cache = ForecastCache::new(prefilled(yesterday, SITE)?, CountingProvider::new(now));

        let forecast = cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 1);
        assert_eq!(forecast.info.begin_at, now);

        // The refreshed forecast replaced the slot:
        cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_cache_is_filled() -> Result {
        let now = Local::now();
        let cache = ForecastCache::new(MemoryBlob::default(), CountingProvider::new(now));
        cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 1);
        assert!(cache.store.load()?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_cache_is_refreshed() -> Result {
        let now = Local::now();
        let blob = MemoryBlob::default();
        blob.save(b"{\"info\": ")?;
        let cache = ForecastCache::new(blob, CountingProvider::new(now));
        cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_other_site_is_refreshed() -> Result {
        let now = Local::now();
        let other_site = SolarSite { azimuth: -90.0, ..SITE };
        let cache = ForecastCache::new(prefilled(now, other_site)?, CountingProvider::new(now));
        cache.get_forecast_on(&SITE, now.date_naive()).await?;
        assert_eq!(cache.provider.n_calls.load(Ordering::Relaxed), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upstream_failure_is_propagated() -> Result {
        let now = Local::now();
        let yesterday = now - TimeDelta::days(1);
        let provider = CountingProvider { fail: true, ..CountingProvider::new(now) };
        let cache = ForecastCache::new(prefilled(yesterday, SITE)?, provider);

        let error = cache.get_forecast_on(&SITE, now.date_naive()).await.unwrap_err();
        assert_eq!(Failure::kind_of(&error), Some(FailureKind::UpstreamFailure));

        // The stale slot is left untouched:
        let cached: Cached = serde_json::from_slice(&cache.store.load()?.unwrap())?;
        assert_eq!(cached.forecast.info.begin_at, yesterday);
        Ok(())
    }
}
