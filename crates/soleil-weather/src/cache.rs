//! In-memory forecast cache keyed by grid cell and date

use std::collections::HashMap;
use std::time::{Duration, Instant};

use soleil_core::{WeatherDay, WeatherKey, WeatherSource};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cached forecasts are refetched after this long
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

pub struct WeatherCache<S> {
    source: S,
    ttl: Duration,
    entries: Mutex<HashMap<WeatherKey, (Instant, WeatherDay)>>,
}

impl<S: WeatherSource> WeatherCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, DEFAULT_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    async fn cached(&self, key: &WeatherKey) -> Option<WeatherDay> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|(stored, _)| stored.elapsed() < self.ttl)
            .map(|(_, day)| day.clone())
    }

    /// Cached day for `key`, fetching it on a miss or after expiry
    pub async fn lookup(&self, key: &WeatherKey) -> anyhow::Result<WeatherDay> {
        if let Some(day) = self.cached(key).await {
            debug!(key = %key, "Weather cache hit");
            return Ok(day);
        }

        let day = self.source.fetch_day(key).await?;

        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        entries.insert(*key, (Instant::now(), day.clone()));

        Ok(day)
    }

    /// Like [`lookup`](Self::lookup) but an unavailable provider yields an
    /// empty day, so every hour falls back to the default cloud cover.
    pub async fn lookup_or_default(&self, key: &WeatherKey) -> WeatherDay {
        match self.lookup(key).await {
            Ok(day) => day,
            Err(e) => {
                warn!(key = %key, error = %e, "Weather unavailable, assuming defaults");
                WeatherDay::empty()
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl<S: WeatherSource> WeatherSource for WeatherCache<S> {
    async fn fetch_day(&self, key: &WeatherKey) -> anyhow::Result<WeatherDay> {
        self.lookup(key).await
    }
}
