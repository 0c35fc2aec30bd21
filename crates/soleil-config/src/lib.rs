use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocationConfig {
    /// IANA zone used for naive times, sunrise/sunset and weather hours
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HorizonConfig {
    pub search_radius_m: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NearbyConfig {
    pub radius_m: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchConfig {
    pub workers: Option<usize>,
    pub batch_size: Option<usize>,
    pub progress_every: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub location: Option<LocationConfig>,
    pub horizon: Option<HorizonConfig>,
    pub nearby: Option<NearbyConfig>,
    pub weather: Option<WeatherConfig>,
    pub database: Option<DatabaseConfig>,
    pub batch: Option<BatchConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from SOLEIL_CONFIG path (TOML) if present, with reasonable defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SOLEIL_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(path)
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Reference timezone name (default Europe/Paris)
    pub fn timezone(&self) -> String {
        self.location
            .as_ref()
            .and_then(|l| l.timezone.clone())
            .unwrap_or_else(|| "Europe/Paris".to_string())
    }

    /// Obstacle search radius in metres (default 200)
    pub fn search_radius_m(&self) -> f64 {
        self.horizon
            .as_ref()
            .and_then(|h| h.search_radius_m)
            .unwrap_or(200.0)
    }

    /// Nearby query radius in metres (default 500)
    pub fn nearby_radius_m(&self) -> f64 {
        self.nearby
            .as_ref()
            .and_then(|n| n.radius_m)
            .unwrap_or(500.0)
    }

    pub fn weather_base_url(&self) -> String {
        self.weather
            .as_ref()
            .and_then(|w| w.base_url.clone())
            .unwrap_or_else(|| "https://api.open-meteo.com/v1/forecast".to_string())
    }

    /// Weather request timeout in seconds (default 10)
    pub fn weather_timeout_secs(&self) -> u64 {
        self.weather
            .as_ref()
            .and_then(|w| w.timeout_secs)
            .unwrap_or(10)
    }

    /// Weather cache lifetime in seconds (default 3600)
    pub fn weather_cache_ttl_secs(&self) -> u64 {
        self.weather
            .as_ref()
            .and_then(|w| w.cache_ttl_secs)
            .unwrap_or(3600)
    }

    pub fn database_url(&self) -> Option<String> {
        self.database.as_ref().and_then(|d| d.url.clone())
    }

    /// Worker count override; `None` means pick from the available cores
    pub fn batch_workers(&self) -> Option<usize> {
        self.batch.as_ref().and_then(|b| b.workers)
    }

    /// Profiles per save transaction (default 100)
    pub fn batch_size(&self) -> usize {
        self.batch
            .as_ref()
            .and_then(|b| b.batch_size)
            .unwrap_or(100)
    }

    /// Log progress every this many points (default 100)
    pub fn progress_every(&self) -> usize {
        self.batch
            .as_ref()
            .and_then(|b| b.progress_every)
            .unwrap_or(100)
    }
}
