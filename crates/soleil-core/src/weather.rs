//! Weather samples, grid quantisation and day summaries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::classify::{MIXED_ABOVE_PCT, OVERCAST_ABOVE_PCT};
use crate::types::ObservationPoint;

/// Weather lookups share one fetch per grid cell of this size
pub const GRID_RESOLUTION_DEG: f64 = 0.05;

/// Assumed cloud cover when the hour has no sample
pub const DEFAULT_CLOUD_COVER: u8 = 50;

/// Hours averaged for the morning part of the summary
pub const MORNING_HOURS: std::ops::Range<u32> = 8..12;

/// Hours averaged for the afternoon part of the summary
pub const AFTERNOON_HOURS: std::ops::Range<u32> = 12..18;

/// Grid cell of the weather cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    lat_index: i64,
    lon_index: i64,
}

impl GridCell {
    pub fn containing(point: &ObservationPoint) -> Self {
        Self {
            lat_index: (point.latitude() / GRID_RESOLUTION_DEG).round() as i64,
            lon_index: (point.longitude() / GRID_RESOLUTION_DEG).round() as i64,
        }
    }

    /// Quantised latitude, three decimals
    pub fn latitude(&self) -> f64 {
        grid_coordinate(self.lat_index)
    }

    /// Quantised longitude, three decimals
    pub fn longitude(&self) -> f64 {
        grid_coordinate(self.lon_index)
    }
}

fn grid_coordinate(index: i64) -> f64 {
    (index as f64 * GRID_RESOLUTION_DEG * 1000.0).round() / 1000.0
}

/// Cache key: one grid cell on one calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeatherKey {
    pub cell: GridCell,
    pub date: NaiveDate,
}

impl WeatherKey {
    pub fn new(point: &ObservationPoint, date: NaiveDate) -> Self {
        Self {
            cell: GridCell::containing(point),
            date,
        }
    }
}

impl fmt::Display for WeatherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "meteo:{}:{}:{}",
            self.cell.latitude(),
            self.cell.longitude(),
            self.date.format("%Y-%m-%d")
        )
    }
}

/// One hourly weather sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    /// Percent
    pub cloud_cover: u8,

    /// W/m²
    pub direct_radiation: f64,

    /// Percent
    pub precipitation_probability: u8,
}

/// Hourly samples for one grid cell and date, keyed by local hour 0-23
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherDay {
    hours: BTreeMap<u32, HourlyWeather>,
}

impl WeatherDay {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hour: u32, sample: HourlyWeather) {
        self.hours.insert(hour, sample);
    }

    pub fn hour(&self, hour: u32) -> Option<&HourlyWeather> {
        self.hours.get(&hour)
    }

    pub fn cloud_cover_at(&self, hour: u32) -> u8 {
        self.hour(hour)
            .map(|s| s.cloud_cover)
            .unwrap_or(DEFAULT_CLOUD_COVER)
    }

    pub fn precipitation_at(&self, hour: u32) -> u8 {
        self.hour(hour)
            .map(|s| s.precipitation_probability)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    fn average_cloud_cover(&self, hours: std::ops::Range<u32>) -> f64 {
        let count = hours.len().max(1);
        let total: u32 = hours.map(|h| u32::from(self.cloud_cover_at(h))).sum();
        f64::from(total) / count as f64
    }

    /// Short text such as `morning sunny, afternoon some clouds`
    pub fn summary(&self) -> String {
        let morning = SkyTier::from_average(self.average_cloud_cover(MORNING_HOURS));
        let afternoon = SkyTier::from_average(self.average_cloud_cover(AFTERNOON_HOURS));
        format!("morning {}, afternoon {}", morning, afternoon)
    }
}

/// Weather-only status shown next to nearby results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherStatus {
    Clear,
    Mixed,
    Overcast,
}

impl WeatherStatus {
    pub fn from_cloud_cover(cloud_cover: u8) -> Self {
        if cloud_cover > OVERCAST_ABOVE_PCT {
            WeatherStatus::Overcast
        } else if cloud_cover > MIXED_ABOVE_PCT {
            WeatherStatus::Mixed
        } else {
            WeatherStatus::Clear
        }
    }
}

/// Coarse sky tier used by the day summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyTier {
    Sunny,
    SomeClouds,
    Cloudy,
}

impl SkyTier {
    pub fn from_average(cloud_cover: f64) -> Self {
        if cloud_cover < 30.0 {
            SkyTier::Sunny
        } else if cloud_cover < 60.0 {
            SkyTier::SomeClouds
        } else {
            SkyTier::Cloudy
        }
    }
}

impl fmt::Display for SkyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkyTier::Sunny => "sunny",
            SkyTier::SomeClouds => "some clouds",
            SkyTier::Cloudy => "cloudy",
        };
        f.write_str(label)
    }
}
