//! Spatial queries and profile persistence

use crate::footprint::footprints_to_obstacles;
use crate::schema::{keep_valid, BuildingRow, NearbyRow, PendingRow, VenueRow};
use crate::{DbClient, DbResult};
use soleil_core::{
    BuildingObstacle, ComputedProfile, HorizonProfile, NearbyVenue, ObservationPoint,
    PendingPoint, PointId, Venue,
};
use tracing::{debug, instrument};

impl DbClient {
    /// Venues without a stored profile, ordered by id
    #[instrument(skip(self))]
    pub async fn points_without_profile(&self) -> DbResult<Vec<PendingPoint>> {
        let rows = sqlx::query_as::<_, PendingRow>(
            r#"
            SELECT v.id, ST_X(v.geometry) AS lon, ST_Y(v.geometry) AS lat
            FROM venues v
            LEFT JOIN horizon_profiles hp ON hp.venue_id = v.id
            WHERE hp.venue_id IS NULL
            ORDER BY v.id
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let points = keep_valid(rows, |row| row.id, PendingRow::into_pending);
        debug!("Found {} venues without a profile", points.len());
        Ok(points)
    }

    /// Building footprints within `radius_m` metres of `point`
    #[instrument(skip(self))]
    pub async fn buildings_near(
        &self,
        point: &ObservationPoint,
        radius_m: f64,
    ) -> DbResult<Vec<BuildingObstacle>> {
        let rows = sqlx::query_as::<_, BuildingRow>(
            r#"
            SELECT
                ST_AsGeoJSON(geometry) AS footprint,
                height,
                COALESCE(ground_altitude, 0) AS ground_altitude
            FROM buildings
            WHERE ST_DWithin(
                geometry::geography,
                ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
                $3
            )
            "#,
        )
        .bind(point.longitude())
        .bind(point.latitude())
        .bind(radius_m)
        .fetch_all(self.pool())
        .await?;

        let obstacles: Vec<BuildingObstacle> = rows
            .iter()
            .flat_map(|row| footprints_to_obstacles(&row.footprint, row.height, row.ground_altitude))
            .collect();

        debug!(
            "Loaded {} obstacles from {} buildings",
            obstacles.len(),
            rows.len()
        );
        Ok(obstacles)
    }

    /// Insert or replace profiles in a single transaction
    #[instrument(skip(self, profiles), fields(count = profiles.len()))]
    pub async fn save_profiles(&self, profiles: &[ComputedProfile]) -> DbResult<()> {
        let mut tx = self.pool().begin().await?;

        for computed in profiles {
            sqlx::query(
                r#"
                INSERT INTO horizon_profiles (venue_id, profile, computed_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (venue_id) DO UPDATE
                SET profile = EXCLUDED.profile, computed_at = EXCLUDED.computed_at
                "#,
            )
            .bind(computed.point_id)
            .bind(computed.profile.to_vec())
            .bind(computed.computed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!("Saved {} profiles", profiles.len());
        Ok(())
    }

    /// Stored profile for one venue
    #[instrument(skip(self))]
    pub async fn get_profile(&self, id: PointId) -> DbResult<Option<HorizonProfile>> {
        let values: Option<Vec<f64>> = sqlx::query_scalar(
            r#"
            SELECT profile FROM horizon_profiles WHERE venue_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(values.map(HorizonProfile::try_from).transpose()?)
    }

    /// One venue with its profile, if stored
    #[instrument(skip(self))]
    pub async fn get_venue(&self, id: PointId) -> DbResult<Option<Venue>> {
        let row = sqlx::query_as::<_, VenueRow>(
            r#"
            SELECT
                v.id, v.name, v.address,
                ST_X(v.geometry) AS lon, ST_Y(v.geometry) AS lat,
                hp.profile
            FROM venues v
            LEFT JOIN horizon_profiles hp ON hp.venue_id = v.id
            WHERE v.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(VenueRow::into_venue).transpose()
    }

    /// Venues within `radius_m` metres of `center`, nearest first
    #[instrument(skip(self))]
    pub async fn venues_within(
        &self,
        center: &ObservationPoint,
        radius_m: f64,
        limit: usize,
    ) -> DbResult<Vec<NearbyVenue>> {
        let rows = sqlx::query_as::<_, NearbyRow>(
            r#"
            SELECT
                v.id, v.name, v.address,
                ST_X(v.geometry) AS lon, ST_Y(v.geometry) AS lat,
                hp.profile,
                ST_Distance(
                    v.geometry::geography,
                    ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography
                ) AS distance_m
            FROM venues v
            LEFT JOIN horizon_profiles hp ON hp.venue_id = v.id
            WHERE ST_DWithin(
                v.geometry::geography,
                ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography,
                $3
            )
            ORDER BY distance_m
            LIMIT $4
            "#,
        )
        .bind(center.longitude())
        .bind(center.latitude())
        .bind(radius_m)
        .bind(limit as i64)
        .fetch_all(self.pool())
        .await?;

        let venues = keep_valid(rows, |row| row.venue.id, NearbyRow::into_nearby);
        debug!("Found {} venues within {} m", venues.len(), radius_m);
        Ok(venues)
    }
}
