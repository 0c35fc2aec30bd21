//! Database client and connection management

use crate::DbResult;
use soleil_core::{
    BuildingObstacle, ComputedProfile, HorizonProfile, NearbyVenue, ObservationPoint,
    ObstacleSource, ObstacleSourceFactory, PendingPoint, PointId, ProfileStore, Venue, VenueSource,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Database client wrapping sqlx connection pool
#[derive(Clone)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    /// Create a new database client from connection string
    pub async fn new(database_url: &str) -> DbResult<Self> {
        Self::with_max_connections(database_url, 10).await
    }

    /// Client holding at most `max_connections` connections
    pub async fn with_max_connections(database_url: &str, max_connections: u32) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get reference to underlying pool for direct queries
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Test the database connection
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl ObstacleSource for DbClient {
    async fn obstacles_near(
        &self,
        point: &ObservationPoint,
        radius_m: f64,
    ) -> anyhow::Result<Vec<BuildingObstacle>> {
        Ok(self.buildings_near(point, radius_m).await?)
    }
}

#[async_trait::async_trait]
impl ProfileStore for DbClient {
    async fn pending_points(&self) -> anyhow::Result<Vec<PendingPoint>> {
        Ok(self.points_without_profile().await?)
    }

    async fn upsert_profiles(&self, profiles: &[ComputedProfile]) -> anyhow::Result<()> {
        Ok(self.save_profiles(profiles).await?)
    }

    async fn load_profile(&self, id: PointId) -> anyhow::Result<Option<HorizonProfile>> {
        Ok(self.get_profile(id).await?)
    }
}

#[async_trait::async_trait]
impl VenueSource for DbClient {
    async fn venue(&self, id: PointId) -> anyhow::Result<Option<Venue>> {
        Ok(self.get_venue(id).await?)
    }

    async fn venues_near(
        &self,
        center: &ObservationPoint,
        radius_m: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<NearbyVenue>> {
        Ok(self.venues_within(center, radius_m, limit).await?)
    }
}

/// Opens a single-connection client per batch worker
pub struct PgObstacleSourceFactory {
    database_url: String,
}

impl PgObstacleSourceFactory {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl ObstacleSourceFactory for PgObstacleSourceFactory {
    async fn connect(&self) -> anyhow::Result<Box<dyn ObstacleSource>> {
        let client = DbClient::with_max_connections(&self.database_url, 1).await?;
        Ok(Box::new(client))
    }
}
