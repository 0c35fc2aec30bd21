//! Sunlight queries against stored venues
//!
//! [`SunService`] owns the venue source, the weather cache and the
//! reference timezone. Binaries build one at startup and drop it at exit.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use soleil_core::time::localize;
use soleil_core::{
    assess_nearby, build_timeline, CoreError, HorizonProfile, NearbyReport, ObservationPoint,
    PointId, Timeline, VenueSource, WeatherKey, WeatherSource, DEFAULT_NEARBY_RADIUS_M,
    NEARBY_LIMIT,
};
use soleil_weather::WeatherCache;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Venue not found: {0}")]
    NotFound(PointId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct SunService<V, W> {
    venues: V,
    weather: WeatherCache<W>,
    timezone: Tz,
    nearby_radius_m: f64,
}

impl<V: VenueSource, W: WeatherSource> SunService<V, W> {
    pub fn new(venues: V, weather: WeatherCache<W>, timezone: Tz) -> Self {
        Self {
            venues,
            weather,
            timezone,
            nearby_radius_m: DEFAULT_NEARBY_RADIUS_M,
        }
    }

    pub fn with_nearby_radius(mut self, radius_m: f64) -> Self {
        self.nearby_radius_m = radius_m;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current instant in the reference timezone
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    /// Read a wall-clock time in the reference timezone
    pub fn local(&self, naive: NaiveDateTime) -> DateTime<Tz> {
        localize(naive, self.timezone)
    }

    /// Day timeline for a stored venue. A venue without a profile is treated
    /// as unobstructed.
    #[instrument(skip(self))]
    pub async fn timeline(&self, venue_id: PointId, date: NaiveDate) -> ServiceResult<Timeline> {
        let venue = self
            .venues
            .venue(venue_id)
            .await?
            .ok_or(ServiceError::NotFound(venue_id))?;

        let profile = venue.profile.unwrap_or_else(HorizonProfile::flat);
        let key = WeatherKey::new(&venue.point, date);
        let weather = self.weather.lookup_or_default(&key).await;

        debug!(venue = %venue.name, weather_hours = weather.len(), "Building timeline");
        Ok(build_timeline(
            &profile,
            &venue.point,
            date,
            &weather,
            self.timezone,
        )?)
    }

    /// Sun status of venues around `center` at `at`, nearest first
    #[instrument(skip(self))]
    pub async fn nearby(
        &self,
        center: ObservationPoint,
        at: DateTime<Tz>,
        radius_m: Option<f64>,
    ) -> ServiceResult<NearbyReport> {
        let radius_m = radius_m.unwrap_or(self.nearby_radius_m);
        let venues = self
            .venues
            .venues_near(&center, radius_m, NEARBY_LIMIT)
            .await?;

        let key = WeatherKey::new(&center, at.date_naive());
        let weather = self.weather.lookup_or_default(&key).await;

        debug!(venues = venues.len(), radius_m, "Assessing nearby venues");
        Ok(assess_nearby(&center, at, venues, &weather)?)
    }
}
