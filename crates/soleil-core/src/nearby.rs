//! Sun status of nearby venues at a single instant

use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;

use crate::classify::{classify, is_urban_clear};
use crate::horizon::HorizonProfile;
use crate::solar::sun_position;
use crate::timeline::STEP_MINUTES;
use crate::types::{NearbyReport, NearbyStatus, NearbyVenue, ObservationPoint, SunStatus, WeatherInfo};
use crate::weather::{WeatherDay, WeatherStatus};
use crate::CoreResult;

/// Default search radius around the centre, metres
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 500.0;

/// Radius searches return at most this many venues
pub const NEARBY_LIMIT: usize = 50;

/// Look-ahead for "sunny until", in timeline steps (four hours)
pub const SUN_UNTIL_STEPS: u32 = 16;

/// First instant within the look-ahead at which the point loses direct sun
/// behind its obstructions. `None` when it stays clear the whole time.
pub fn estimate_sun_until(
    profile: &HorizonProfile,
    point: &ObservationPoint,
    from: DateTime<Tz>,
) -> CoreResult<Option<DateTime<Tz>>> {
    let mut check = from;
    for _ in 0..SUN_UNTIL_STEPS {
        check += Duration::minutes(STEP_MINUTES);
        let sun = sun_position(point, &check)?;
        if !is_urban_clear(profile, &sun) {
            return Ok(Some(check));
        }
    }
    Ok(None)
}

/// Classify every venue around `center` at instant `at`.
///
/// The sun position is taken once at the centre; venues keep the order they
/// were given in (nearest first).
pub fn assess_nearby(
    center: &ObservationPoint,
    at: DateTime<Tz>,
    venues: Vec<NearbyVenue>,
    weather: &WeatherDay,
) -> CoreResult<NearbyReport> {
    let sun = sun_position(center, &at)?;
    let hour = at.hour();
    let cloud_cover = weather.cloud_cover_at(hour);

    let mut statuses = Vec::with_capacity(venues.len());
    for NearbyVenue { venue, distance_m } in venues {
        let status = classify(venue.profile.as_ref(), &sun, cloud_cover);

        let sunny_until = match (&venue.profile, status) {
            (Some(profile), SunStatus::ClearSun) => {
                estimate_sun_until(profile, &venue.point, at)?
            }
            _ => None,
        };

        statuses.push(NearbyStatus {
            id: venue.id,
            name: venue.name,
            address: venue.address,
            latitude: venue.point.latitude(),
            longitude: venue.point.longitude(),
            distance_m: distance_m.max(0.0).round() as u32,
            status,
            sunny_until,
        });
    }

    Ok(NearbyReport {
        weather: WeatherInfo {
            cloud_cover,
            status: WeatherStatus::from_cloud_cover(cloud_cover),
            precipitation_probability: weather.precipitation_at(hour),
        },
        venues: statuses,
    })
}
