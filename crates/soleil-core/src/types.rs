//! Core data types for observation points, obstacles and query results

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::horizon::HorizonProfile;
use crate::weather::WeatherStatus;
use crate::{CoreError, CoreResult};

/// Identifier of a stored observation point (a venue row)
pub type PointId = i64;

/// A location on the ground, WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationPoint {
    latitude: f64,
    longitude: f64,
}

impl ObservationPoint {
    pub fn new(latitude: f64, longitude: f64) -> CoreResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoreError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoreError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A building approximated as a flat-roofed prism
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingObstacle {
    /// Exterior ring, x = longitude, y = latitude
    pub footprint: LineString<f64>,

    /// Height above local ground, metres
    pub height: f64,

    /// Ground altitude of the footprint, metres. Carried for completeness,
    /// the flat-ground model does not use it.
    pub ground_altitude: f64,
}

/// Sun position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// 0 = horizon, 90 = zenith, negative below the horizon
    pub altitude: f64,

    /// Clockwise from north, always in [0, 360)
    pub azimuth: f64,
}

/// Verdict for one location at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SunStatus {
    Night,
    UrbanShade,
    Overcast,
    Mixed,
    ClearSun,
}

impl SunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunStatus::Night => "night",
            SunStatus::UrbanShade => "urban-shade",
            SunStatus::Overcast => "overcast",
            SunStatus::Mixed => "mixed",
            SunStatus::ClearSun => "clear-sun",
        }
    }
}

/// Status as rendered in a day timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStatus {
    Night,
    ShadeFromBuilding,
    Overcast,
    Mixed,
    ClearSun,
}

impl From<SunStatus> for SlotStatus {
    fn from(status: SunStatus) -> Self {
        match status {
            SunStatus::Night => SlotStatus::Night,
            SunStatus::UrbanShade => SlotStatus::ShadeFromBuilding,
            SunStatus::Overcast => SlotStatus::Overcast,
            SunStatus::Mixed => SlotStatus::Mixed,
            SunStatus::ClearSun => SlotStatus::ClearSun,
        }
    }
}

/// One 15-minute step of a day timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSlot {
    pub time: DateTime<Tz>,

    /// Solar altitude rounded to one decimal
    pub sun_altitude: f64,

    /// Sun clears the local obstruction profile
    pub urban_clear: bool,

    /// Cloud cover percentage for the slot's hour
    pub cloud_cover: u8,

    pub status: SlotStatus,
}

/// Longest uninterrupted clear-sun run in a timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub duration_minutes: u32,
}

/// Full day timeline for one location
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub date: NaiveDate,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub slots: Vec<TimelineSlot>,
    pub best_window: Option<BestWindow>,
    pub weather_summary: String,
}

/// Observation point waiting for a horizon profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPoint {
    pub id: PointId,
    pub point: ObservationPoint,
}

/// Freshly computed profile ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedProfile {
    pub point_id: PointId,
    pub profile: HorizonProfile,
    pub computed_at: DateTime<Utc>,
}

/// A stored venue with its precomputed profile, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: PointId,
    pub name: String,
    pub address: Option<String>,
    pub point: ObservationPoint,
    pub profile: Option<HorizonProfile>,
}

/// Venue returned by a radius search
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyVenue {
    pub venue: Venue,
    pub distance_m: f64,
}

/// Weather at the queried hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherInfo {
    pub cloud_cover: u8,
    pub status: WeatherStatus,
    pub precipitation_probability: u8,
}

/// Status of one venue at the queried instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStatus {
    pub id: PointId,
    pub name: String,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_m: u32,
    pub status: SunStatus,

    /// First instant within the next four hours at which the sun is lost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunny_until: Option<DateTime<Tz>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyReport {
    pub weather: WeatherInfo,
    pub venues: Vec<NearbyStatus>,
}
