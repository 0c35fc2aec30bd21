//! Sunniness classification

use crate::horizon::HorizonProfile;
use crate::types::{SunPosition, SunStatus};

/// Cloud cover above this is overcast
pub const OVERCAST_ABOVE_PCT: u8 = 80;

/// Cloud cover above this is mixed
pub const MIXED_ABOVE_PCT: u8 = 50;

/// Whether the sun is up and strictly clears the obstruction at its azimuth.
///
/// An altitude equal to the stored elevation counts as blocked.
pub fn is_urban_clear(profile: &HorizonProfile, sun: &SunPosition) -> bool {
    if sun.altitude <= 0.0 {
        return false;
    }
    sun.altitude > profile.elevation_at(sun.azimuth)
}

/// Classify one instant. A missing profile means an unobstructed sky.
pub fn classify(profile: Option<&HorizonProfile>, sun: &SunPosition, cloud_cover: u8) -> SunStatus {
    if sun.altitude <= 0.0 {
        return SunStatus::Night;
    }

    if let Some(profile) = profile {
        if !is_urban_clear(profile, sun) {
            return SunStatus::UrbanShade;
        }
    }

    if cloud_cover > OVERCAST_ABOVE_PCT {
        SunStatus::Overcast
    } else if cloud_cover > MIXED_ABOVE_PCT {
        SunStatus::Mixed
    } else {
        SunStatus::ClearSun
    }
}
