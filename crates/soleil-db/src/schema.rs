//! Row types for the venue, building and profile queries

use soleil_core::{HorizonProfile, NearbyVenue, ObservationPoint, PendingPoint, PointId, Venue};
use sqlx::FromRow;
use tracing::warn;

use crate::DbResult;

/// Venue still missing a horizon profile
#[derive(Debug, Clone, FromRow)]
pub struct PendingRow {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
}

impl PendingRow {
    pub fn into_pending(self) -> DbResult<PendingPoint> {
        Ok(PendingPoint {
            id: self.id,
            point: ObservationPoint::new(self.lat, self.lon)?,
        })
    }
}

/// Building with its footprint as GeoJSON text
#[derive(Debug, Clone, FromRow)]
pub struct BuildingRow {
    pub footprint: String,
    pub height: f64,
    pub ground_altitude: f64,
}

/// Venue joined with its stored profile
#[derive(Debug, Clone, FromRow)]
pub struct VenueRow {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub lon: f64,
    pub lat: f64,
    pub profile: Option<Vec<f64>>,
}

impl VenueRow {
    pub fn into_venue(self) -> DbResult<Venue> {
        let profile = self.profile.map(HorizonProfile::try_from).transpose()?;
        Ok(Venue {
            id: self.id,
            name: self.name,
            address: self.address,
            point: ObservationPoint::new(self.lat, self.lon)?,
            profile,
        })
    }
}

/// Venue row from a radius search
#[derive(Debug, Clone, FromRow)]
pub struct NearbyRow {
    #[sqlx(flatten)]
    pub venue: VenueRow,
    pub distance_m: f64,
}

impl NearbyRow {
    pub fn into_nearby(self) -> DbResult<NearbyVenue> {
        Ok(NearbyVenue {
            venue: self.venue.into_venue()?,
            distance_m: self.distance_m,
        })
    }
}

/// Convert fetched rows, logging and dropping the ones that fail validation
pub fn keep_valid<R, T>(
    rows: Vec<R>,
    row_id: impl Fn(&R) -> PointId,
    convert: impl Fn(R) -> DbResult<T>,
) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| {
            let point_id = row_id(&row);
            match convert(row) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(point_id, error = %e, "Skipping invalid row");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbError;

    fn row(profile: Option<Vec<f64>>) -> VenueRow {
        venue_row(7, profile)
    }

    fn venue_row(id: i64, profile: Option<Vec<f64>>) -> VenueRow {
        VenueRow {
            id,
            name: "Le Zinc".to_string(),
            address: Some("3 rue des Arts".to_string()),
            lon: 2.3522,
            lat: 48.8566,
            profile,
        }
    }

    #[test]
    fn test_venue_row_without_profile() {
        let venue = row(None).into_venue().unwrap();
        assert_eq!(venue.id, 7);
        assert!(venue.profile.is_none());
        assert_eq!(venue.point.latitude(), 48.8566);
    }

    #[test]
    fn test_venue_row_with_profile() {
        let mut values = vec![0.0; 360];
        values[180] = 32.5;
        let venue = row(Some(values)).into_venue().unwrap();
        assert_eq!(venue.profile.unwrap().bucket(180), 32.5);
    }

    #[test]
    fn test_venue_row_rejects_short_profile() {
        let err = row(Some(vec![0.0; 12])).into_venue().unwrap_err();
        assert!(matches!(err, DbError::InvalidData(_)));
    }

    #[test]
    fn test_pending_row_validates_coordinates() {
        let bad = PendingRow {
            id: 1,
            lon: 2.35,
            lat: 123.0,
        };
        assert!(bad.into_pending().is_err());
    }

    #[test]
    fn test_invalid_pending_rows_are_skipped() {
        let rows = vec![
            PendingRow {
                id: 1,
                lon: 2.35,
                lat: 48.85,
            },
            PendingRow {
                id: 2,
                lon: 2.35,
                lat: 123.0,
            },
            PendingRow {
                id: 3,
                lon: 2.36,
                lat: 48.86,
            },
        ];
        let points = keep_valid(rows, |row| row.id, PendingRow::into_pending);
        let ids: Vec<PointId> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_corrupt_profile_drops_only_that_venue() {
        let rows = vec![
            NearbyRow {
                venue: venue_row(1, None),
                distance_m: 40.0,
            },
            NearbyRow {
                venue: venue_row(2, Some(vec![0.0; 12])),
                distance_m: 80.0,
            },
            NearbyRow {
                venue: venue_row(3, Some(vec![0.0; 360])),
                distance_m: 120.0,
            },
        ];
        let venues = keep_valid(rows, |row| row.venue.id, NearbyRow::into_nearby);
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].venue.id, 1);
        assert_eq!(venues[1].venue.id, 3);
        assert_eq!(venues[1].distance_m, 120.0);
    }
}
