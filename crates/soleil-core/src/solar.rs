//! Solar position and daylight bounds
//!
//! Positions come from the NREL SPA implementation with standard
//! atmospheric refraction, observer at sea level.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use solar_positioning::{spa, time::DeltaT, RefractionCorrection};

use crate::time::{at_local, clock, localize};
use crate::types::{ObservationPoint, SunPosition};
use crate::CoreResult;

/// Daylight scan starts at this local hour
pub const SCAN_START_HOUR: u32 = 4;

/// Daylight scan step
pub const SCAN_STEP_MINUTES: i64 = 5;

/// Daylight scan length, 04:00 up to 23:55
pub const SCAN_WINDOW_MINUTES: i64 = 20 * 60;

/// Returned when the scan finds no daylight at all
pub const FALLBACK_SUNRISE: (u32, u32) = (8, 0);
pub const FALLBACK_SUNSET: (u32, u32) = (18, 0);

/// Sunrise and sunset as local wall-clock times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaylightBounds {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Sun altitude and azimuth at an instant, both rounded to two decimals
pub fn sun_position<Z: TimeZone>(
    point: &ObservationPoint,
    at: &DateTime<Z>,
) -> CoreResult<SunPosition> {
    let delta_t = DeltaT::estimate_from_date_like(at.naive_utc().date())?;
    let position = spa::solar_position(
        at.clone(),
        point.latitude(),
        point.longitude(),
        0.0,
        delta_t,
        Some(RefractionCorrection::standard()),
    )?;

    Ok(SunPosition {
        altitude: round_to(position.elevation_angle(), 2),
        azimuth: round_to(position.azimuth(), 2).rem_euclid(360.0),
    })
}

/// Same as [`sun_position`] for an instant without timezone information
pub fn sun_position_naive(
    point: &ObservationPoint,
    at: NaiveDateTime,
    tz: Tz,
) -> CoreResult<SunPosition> {
    sun_position(point, &localize(at, tz))
}

/// Scan the day in 5-minute steps for the first and last instant with the
/// sun above the horizon.
pub fn daylight_bounds(
    point: &ObservationPoint,
    date: NaiveDate,
    tz: Tz,
) -> CoreResult<DaylightBounds> {
    let start = at_local(date, clock(SCAN_START_HOUR, 0), tz);

    let mut sunrise = None;
    let mut sunset = None;

    for offset in (0..SCAN_WINDOW_MINUTES).step_by(SCAN_STEP_MINUTES as usize) {
        let at = start + Duration::minutes(offset);
        let position = sun_position(point, &at)?;
        if position.altitude > 0.0 {
            let local = at.time();
            sunrise.get_or_insert(local);
            sunset = Some(local);
        }
    }

    Ok(DaylightBounds {
        sunrise: sunrise.unwrap_or_else(|| clock(FALLBACK_SUNRISE.0, FALLBACK_SUNRISE.1)),
        sunset: sunset.unwrap_or_else(|| clock(FALLBACK_SUNSET.0, FALLBACK_SUNSET.1)),
    })
}
