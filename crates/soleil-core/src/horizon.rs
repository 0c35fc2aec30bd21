//! Horizon obstruction profiles
//!
//! A profile holds, for every integer azimuth degree (0 = north, clockwise),
//! the highest elevation angle at which a building blocks the sky as seen
//! from an observer seated at a venue. Buildings are flat-roofed prisms;
//! each footprint edge is projected into a local tangent plane around the
//! observer and swept across the azimuth buckets it covers.

use serde::{Deserialize, Serialize};

use crate::types::{BuildingObstacle, ObservationPoint};
use crate::CoreError;

/// Number of azimuth buckets
pub const PROFILE_LEN: usize = 360;

/// Observer eye height above ground (seated at a table)
pub const EYE_HEIGHT_M: f64 = 1.5;

/// Default radius for the obstacle range query
pub const SEARCH_RADIUS_M: f64 = 200.0;

/// Metres per degree of latitude
pub const M_PER_DEG_LAT: f64 = 111_320.0;

/// Edges with both endpoints closer than this belong to the observer's own building
pub const SELF_SHADOW_DISTANCE_M: f64 = 2.0;

/// Distance floor for elevation angles
pub const MIN_ELEVATION_DISTANCE_M: f64 = 1.0;

/// Arcs wider than this only update their endpoint buckets
pub const WIDE_ARC_DEG: usize = 90;

/// Per-degree maximum obstruction elevation, in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<f64>", try_from = "Vec<f64>")]
pub struct HorizonProfile([f64; PROFILE_LEN]);

impl HorizonProfile {
    /// Unobstructed sky
    pub fn flat() -> Self {
        Self([0.0; PROFILE_LEN])
    }

    /// Elevation stored for the bucket nearest to `azimuth`
    pub fn elevation_at(&self, azimuth: f64) -> f64 {
        self.0[bucket_index(azimuth)]
    }

    pub fn bucket(&self, index: usize) -> f64 {
        self.0[index % PROFILE_LEN]
    }

    /// Raise a bucket to `elevation` if it is higher than the stored value
    pub fn raise(&mut self, index: usize, elevation: f64) {
        let slot = &mut self.0[index % PROFILE_LEN];
        if elevation > *slot {
            *slot = elevation;
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn is_flat(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Default for HorizonProfile {
    fn default() -> Self {
        Self::flat()
    }
}

impl From<HorizonProfile> for Vec<f64> {
    fn from(profile: HorizonProfile) -> Self {
        profile.to_vec()
    }
}

impl TryFrom<Vec<f64>> for HorizonProfile {
    type Error = CoreError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let len = values.len();
        let buckets: [f64; PROFILE_LEN] = values
            .try_into()
            .map_err(|_| CoreError::ProfileLength(len))?;
        Ok(Self(buckets))
    }
}

/// Integer azimuth bucket for a bearing in degrees, wrapping at 360
pub fn bucket_index(azimuth: f64) -> usize {
    (azimuth.round() as i64).rem_euclid(PROFILE_LEN as i64) as usize
}

/// Local tangent plane centred on the observer, metres east/north
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin_lat: f64,
    origin_lon: f64,
    m_per_deg_lon: f64,
}

impl LocalFrame {
    pub fn new(origin: &ObservationPoint) -> Self {
        Self {
            origin_lat: origin.latitude(),
            origin_lon: origin.longitude(),
            m_per_deg_lon: M_PER_DEG_LAT * origin.latitude().to_radians().cos(),
        }
    }

    /// Offset of a (lon, lat) vertex as (east, north) metres
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            (lon - self.origin_lon) * self.m_per_deg_lon,
            (lat - self.origin_lat) * M_PER_DEG_LAT,
        )
    }

    /// Distance in metres and bearing in [0, 360) of a (lon, lat) vertex
    pub fn polar(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (east, north) = self.project(lon, lat);
        let distance = east.hypot(north);
        let bearing = east.atan2(north).to_degrees().rem_euclid(360.0);
        (distance, bearing)
    }
}

/// Compute the horizon profile of `point` from the surrounding obstacles
pub fn build_profile(point: &ObservationPoint, obstacles: &[BuildingObstacle]) -> HorizonProfile {
    let frame = LocalFrame::new(point);
    let mut profile = HorizonProfile::flat();

    for obstacle in obstacles {
        if obstacle.height <= EYE_HEIGHT_M {
            continue;
        }
        add_obstacle(&mut profile, &frame, obstacle);
    }

    profile
}

fn add_obstacle(profile: &mut HorizonProfile, frame: &LocalFrame, obstacle: &BuildingObstacle) {
    if obstacle.footprint.0.len() < 2 {
        return;
    }

    let apparent_height = obstacle.height - EYE_HEIGHT_M;

    let mut ring = obstacle.footprint.clone();
    ring.close();

    for edge in ring.lines() {
        let (lon1, lat1) = edge.start.x_y();
        let (lon2, lat2) = edge.end.x_y();
        if ![lon1, lat1, lon2, lat2].iter().all(|v| v.is_finite()) {
            continue;
        }

        let (dist1, az1) = frame.polar(lon1, lat1);
        let (dist2, az2) = frame.polar(lon2, lat2);

        if dist1 < SELF_SHADOW_DISTANCE_M && dist2 < SELF_SHADOW_DISTANCE_M {
            continue;
        }

        let elev1 = elevation_angle(apparent_height, dist1);
        let elev2 = elevation_angle(apparent_height, dist2);

        fill_arc(profile, az1, elev1, az2, elev2);
    }
}

fn elevation_angle(apparent_height: f64, distance: f64) -> f64 {
    apparent_height
        .atan2(distance.max(MIN_ELEVATION_DISTANCE_M))
        .to_degrees()
}

/// Sweep the shorter arc between two bearings, interpolating elevation
/// linearly and keeping the running maximum in every bucket touched.
pub fn fill_arc(profile: &mut HorizonProfile, az1: f64, elev1: f64, az2: f64, elev2: f64) {
    let idx1 = bucket_index(az1);
    let idx2 = bucket_index(az2);

    if idx1 == idx2 {
        profile.raise(idx1, elev1.max(elev2));
        return;
    }

    let mut start = idx1;
    let (mut from, mut to) = (elev1, elev2);
    let mut span = (idx2 + PROFILE_LEN - idx1) % PROFILE_LEN;
    if span > PROFILE_LEN / 2 {
        start = idx2;
        std::mem::swap(&mut from, &mut to);
        span = PROFILE_LEN - span;
    }

    if span > WIDE_ARC_DEG {
        profile.raise(idx1, elev1);
        profile.raise(idx2, elev2);
        return;
    }

    for step in 0..=span {
        let t = step as f64 / span as f64;
        profile.raise(start + step, from + t * (to - from));
    }
}
