use anyhow::Result;

use crate::horizon::HorizonProfile;
use crate::types::{
    BuildingObstacle, ComputedProfile, NearbyVenue, ObservationPoint, PendingPoint, PointId, Venue,
};
use crate::weather::{WeatherDay, WeatherKey};

/// Building footprints around a point
#[async_trait::async_trait]
pub trait ObstacleSource: Send + Sync {
    async fn obstacles_near(
        &self,
        point: &ObservationPoint,
        radius_m: f64,
    ) -> Result<Vec<BuildingObstacle>>;
}

/// Opens one obstacle source per batch worker
#[async_trait::async_trait]
pub trait ObstacleSourceFactory: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ObstacleSource>>;
}

/// Persistence for horizon profiles
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Points without a stored profile, ordered by id
    async fn pending_points(&self) -> Result<Vec<PendingPoint>>;

    /// Insert or replace profiles in one transaction
    async fn upsert_profiles(&self, profiles: &[ComputedProfile]) -> Result<()>;

    async fn load_profile(&self, id: PointId) -> Result<Option<HorizonProfile>>;
}

/// Day of hourly weather for one grid cell
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_day(&self, key: &WeatherKey) -> Result<WeatherDay>;
}

/// Stored venues
#[async_trait::async_trait]
pub trait VenueSource: Send + Sync {
    async fn venue(&self, id: PointId) -> Result<Option<Venue>>;

    /// Venues within `radius_m`, nearest first, at most `limit`
    async fn venues_near(
        &self,
        center: &ObservationPoint,
        radius_m: f64,
        limit: usize,
    ) -> Result<Vec<NearbyVenue>>;
}
