use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeZone, Timelike};
use soleil_cli::{ServiceError, SunService};
use soleil_core::time::DEFAULT_TIMEZONE;
use soleil_core::{
    HorizonProfile, HourlyWeather, NearbyVenue, ObservationPoint, PointId, SlotStatus, SunStatus,
    Venue, VenueSource, WeatherDay, WeatherKey, WeatherSource,
};
use soleil_weather::WeatherCache;

struct FixedVenues {
    venues: Vec<Venue>,
    last_radius: Arc<Mutex<Option<f64>>>,
}

impl FixedVenues {
    fn new(venues: Vec<Venue>) -> Self {
        Self {
            venues,
            last_radius: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait::async_trait]
impl VenueSource for FixedVenues {
    async fn venue(&self, id: PointId) -> anyhow::Result<Option<Venue>> {
        Ok(self.venues.iter().find(|v| v.id == id).cloned())
    }

    async fn venues_near(
        &self,
        _center: &ObservationPoint,
        radius_m: f64,
        limit: usize,
    ) -> anyhow::Result<Vec<NearbyVenue>> {
        *self.last_radius.lock().unwrap() = Some(radius_m);
        Ok(self
            .venues
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, venue)| NearbyVenue {
                venue: venue.clone(),
                distance_m: 25.0 * (i + 1) as f64,
            })
            .collect())
    }
}

#[derive(Clone)]
struct StubWeather {
    cloud_cover: Option<u8>,
    calls: Arc<AtomicUsize>,
}

impl StubWeather {
    fn clear() -> Self {
        Self {
            cloud_cover: Some(5),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn down() -> Self {
        Self {
            cloud_cover: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl WeatherSource for StubWeather {
    async fn fetch_day(&self, _key: &WeatherKey) -> anyhow::Result<WeatherDay> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(cloud_cover) = self.cloud_cover else {
            anyhow::bail!("503 Service Unavailable");
        };
        let mut day = WeatherDay::empty();
        for hour in 0..24 {
            day.insert(
                hour,
                HourlyWeather {
                    cloud_cover,
                    direct_radiation: 500.0,
                    precipitation_probability: 0,
                },
            );
        }
        Ok(day)
    }
}

fn paris() -> ObservationPoint {
    ObservationPoint::new(48.8566, 2.3522).unwrap()
}

fn venue(id: PointId, profile: Option<HorizonProfile>) -> Venue {
    Venue {
        id,
        name: format!("Terrasse {}", id),
        address: Some(format!("{} rue de Rivoli", id)),
        point: paris(),
        profile,
    }
}

fn south_wall() -> HorizonProfile {
    let mut profile = HorizonProfile::flat();
    for az in 90..=270 {
        profile.raise(az, 85.0);
    }
    profile
}

fn service(venues: Vec<Venue>, weather: StubWeather) -> SunService<FixedVenues, StubWeather> {
    SunService::new(
        FixedVenues::new(venues),
        WeatherCache::new(weather),
        DEFAULT_TIMEZONE,
    )
}

fn june_21() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
}

#[tokio::test]
async fn timeline_for_unknown_venue_is_not_found() {
    let service = service(vec![venue(1, None)], StubWeather::clear());
    let err = service.timeline(99, june_21()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(99)));
}

#[tokio::test]
async fn timeline_without_profile_is_open_sky() {
    let service = service(vec![venue(1, None)], StubWeather::clear());
    let timeline = service.timeline(1, june_21()).await.unwrap();

    assert_eq!(timeline.slots.first().unwrap().time.hour(), 6);
    assert!(timeline
        .slots
        .iter()
        .all(|s| s.status != SlotStatus::ShadeFromBuilding));
    assert!(timeline.best_window.unwrap().duration_minutes >= 900);
    insta::assert_snapshot!(timeline.weather_summary, @"morning sunny, afternoon sunny");
}

#[tokio::test]
async fn timeline_with_south_wall_has_midday_shade() {
    let service = service(vec![venue(1, Some(south_wall()))], StubWeather::clear());
    let timeline = service.timeline(1, june_21()).await.unwrap();

    let two_pm = timeline
        .slots
        .iter()
        .find(|s| s.time.hour() == 14 && s.time.minute() == 0)
        .unwrap();
    assert_eq!(two_pm.status, SlotStatus::ShadeFromBuilding);
    assert!(!two_pm.urban_clear);
}

#[tokio::test]
async fn timeline_survives_weather_outage() {
    let weather = StubWeather::down();
    let calls = weather.calls.clone();
    let service = service(vec![venue(1, None)], weather);

    let timeline = service.timeline(1, june_21()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(timeline.slots.iter().all(|s| s.cloud_cover == 50));
    insta::assert_snapshot!(timeline.weather_summary, @"morning some clouds, afternoon some clouds");
}

#[tokio::test]
async fn nearby_classifies_each_venue() {
    let venues = FixedVenues::new(vec![venue(1, None), venue(2, Some(south_wall()))]);
    let last_radius = venues.last_radius.clone();
    let service = SunService::new(
        venues,
        WeatherCache::new(StubWeather::clear()),
        DEFAULT_TIMEZONE,
    )
    .with_nearby_radius(350.0);

    let at = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 14, 0, 0).unwrap();
    let report = service.nearby(paris(), at, None).await.unwrap();

    assert_eq!(*last_radius.lock().unwrap(), Some(350.0));
    assert_eq!(report.venues.len(), 2);
    assert_eq!(report.venues[0].status, SunStatus::ClearSun);
    assert_eq!(report.venues[0].distance_m, 25);
    assert_eq!(report.venues[1].status, SunStatus::UrbanShade);
    assert!(report.venues[1].sunny_until.is_none());
    assert_eq!(report.weather.cloud_cover, 5);
}

#[tokio::test]
async fn nearby_weather_is_cached_per_cell() {
    let weather = StubWeather::clear();
    let calls = weather.calls.clone();
    let service = service(vec![venue(1, None)], weather);

    let at = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 14, 0, 0).unwrap();
    service.nearby(paris(), at, Some(100.0)).await.unwrap();
    service
        .nearby(ObservationPoint::new(48.857, 2.353).unwrap(), at, Some(100.0))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn nearby_json_uses_kebab_case_status() {
    let service = service(vec![venue(1, Some(south_wall()))], StubWeather::clear());
    let at = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 14, 0, 0).unwrap();
    let report = service.nearby(paris(), at, None).await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["venues"][0]["status"], "urban-shade");
    assert_eq!(json["weather"]["status"], "clear");
    assert!(json["venues"][0].get("sunny_until").is_none());
}
