//! End-to-end scenarios over the public engine API, Paris reference data

use chrono::{NaiveDate, TimeZone, Timelike};
use geo_types::LineString;
use soleil_core::time::{clock, DEFAULT_TIMEZONE};
use soleil_core::{
    build_profile, build_timeline, classify, daylight_bounds, sun_position, BuildingObstacle,
    HorizonProfile, HourlyWeather, ObservationPoint, SlotStatus, SunStatus, WeatherDay,
    M_PER_DEG_LAT,
};

fn paris() -> ObservationPoint {
    ObservationPoint::new(48.8566, 2.3522).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clear_day() -> WeatherDay {
    let mut day = WeatherDay::empty();
    for hour in 0..24 {
        day.insert(
            hour,
            HourlyWeather {
                cloud_cover: 5,
                direct_radiation: 700.0,
                precipitation_probability: 0,
            },
        );
    }
    day
}

/// Rectangle given in metres east/north of `origin`, as a closed lon/lat ring
fn rectangle(origin: &ObservationPoint, east: (f64, f64), north: (f64, f64)) -> LineString<f64> {
    let m_per_deg_lon = M_PER_DEG_LAT * origin.latitude().to_radians().cos();
    let corner = |e: f64, n: f64| {
        (
            origin.longitude() + e / m_per_deg_lon,
            origin.latitude() + n / M_PER_DEG_LAT,
        )
    };
    vec![
        corner(east.0, north.0),
        corner(east.1, north.0),
        corner(east.1, north.1),
        corner(east.0, north.1),
        corner(east.0, north.0),
    ]
    .into()
}

#[test]
fn summer_solstice_afternoon_sun_is_high_and_south() {
    let at = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 14, 0, 0).unwrap();
    let sun = sun_position(&paris(), &at).unwrap();
    assert!(sun.altitude > 63.0 && sun.altitude < 66.0, "{:?}", sun);
    assert!(sun.azimuth > 170.0 && sun.azimuth < 200.0, "{:?}", sun);
}

#[test]
fn winter_solstice_noon_sun_is_low_and_south() {
    let at = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 12, 21, 13, 0, 0).unwrap();
    let sun = sun_position(&paris(), &at).unwrap();
    assert!(sun.altitude > 16.5 && sun.altitude < 19.0, "{:?}", sun);
    assert!(sun.azimuth > 150.0 && sun.azimuth < 210.0, "{:?}", sun);
}

#[test]
fn sun_is_down_at_two_in_the_morning() {
    let at = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 2, 0, 0).unwrap();
    let sun = sun_position(&paris(), &at).unwrap();
    assert!(sun.altitude < 0.0);
    assert_eq!(
        classify(Some(&HorizonProfile::flat()), &sun, 0),
        SunStatus::Night
    );
}

#[test]
fn daylight_bounds_follow_the_seasons() {
    let june = daylight_bounds(&paris(), date(2024, 6, 21), DEFAULT_TIMEZONE).unwrap();
    assert!(june.sunrise >= clock(5, 35) && june.sunrise <= clock(6, 0), "{:?}", june);
    assert!(june.sunset >= clock(21, 45) && june.sunset <= clock(22, 5), "{:?}", june);

    let december = daylight_bounds(&paris(), date(2024, 12, 21), DEFAULT_TIMEZONE).unwrap();
    assert!(december.sunrise >= clock(8, 30) && december.sunrise <= clock(9, 0));
    assert!(december.sunset >= clock(16, 40) && december.sunset <= clock(17, 5));
}

#[test]
fn building_to_the_north_never_blocks_the_summer_noon_sun() {
    let point = paris();
    let obstacle = BuildingObstacle {
        footprint: rectangle(&point, (-10.0, 10.0), (45.0, 65.0)),
        height: 21.5,
        ground_altitude: 35.0,
    };
    let profile = build_profile(&point, &[obstacle]);

    assert!(profile.bucket(0) > 20.0 && profile.bucket(0) < 25.0);
    assert!(profile.bucket(350) > 15.0);
    assert!(profile.bucket(10) > 15.0);
    assert_eq!(profile.bucket(90), 0.0);
    assert_eq!(profile.bucket(180), 0.0);
    assert_eq!(profile.bucket(270), 0.0);

    let noon = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 14, 0, 0).unwrap();
    let sun = sun_position(&point, &noon).unwrap();
    assert_eq!(classify(Some(&profile), &sun, 10), SunStatus::ClearSun);
}

#[test]
fn twenty_metre_building_fifty_metres_north() {
    let point = paris();
    let obstacle = BuildingObstacle {
        footprint: rectangle(&point, (-10.0, 10.0), (45.0, 55.0)),
        height: 20.0,
        ground_altitude: 0.0,
    };
    let profile = build_profile(&point, &[obstacle]);

    for az in (350..360).chain(0..10) {
        assert!(profile.bucket(az) > 5.0, "bucket {} = {}", az, profile.bucket(az));
    }
    for az in 170..=190 {
        assert_eq!(profile.bucket(az), 0.0, "bucket {}", az);
    }
}

#[test]
fn building_to_the_south_shades_the_winter_noon() {
    let point = paris();
    let obstacle = BuildingObstacle {
        footprint: rectangle(&point, (-15.0, 15.0), (-40.0, -20.0)),
        height: 18.0,
        ground_altitude: 35.0,
    };
    let profile = build_profile(&point, &[obstacle]);
    assert!(profile.bucket(180) > 30.0);

    let noon = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 12, 21, 13, 0, 0).unwrap();
    let sun = sun_position(&point, &noon).unwrap();
    assert_eq!(classify(Some(&profile), &sun, 10), SunStatus::UrbanShade);
}

#[test]
fn summer_timeline_on_open_ground() {
    let timeline = build_timeline(
        &HorizonProfile::flat(),
        &paris(),
        date(2024, 6, 21),
        &clear_day(),
        DEFAULT_TIMEZONE,
    )
    .unwrap();

    assert_eq!(timeline.slots.len(), 65);
    let first = timeline.slots.first().unwrap();
    let last = timeline.slots.last().unwrap();
    assert_eq!((first.time.hour(), first.time.minute()), (6, 0));
    assert_eq!((last.time.hour(), last.time.minute()), (22, 0));
    assert_eq!(last.status, SlotStatus::Night);

    let best = timeline.best_window.unwrap();
    assert!(best.duration_minutes >= 900);
    assert_eq!(best.duration_minutes % 15, 0);
    insta::assert_snapshot!(timeline.weather_summary, @"morning sunny, afternoon sunny");
}

#[test]
fn winter_timeline_window_follows_daylight() {
    let timeline = build_timeline(
        &HorizonProfile::flat(),
        &paris(),
        date(2024, 12, 21),
        &WeatherDay::empty(),
        DEFAULT_TIMEZONE,
    )
    .unwrap();

    let first = timeline.slots.first().unwrap();
    let last = timeline.slots.last().unwrap();
    assert_eq!(first.time.hour(), 7);
    assert_eq!(last.time.hour(), 17);
    assert_eq!(timeline.slots.len(), 41);

    // Missing weather reads as 50 % cloud, which still counts as clear sun
    assert!(timeline
        .slots
        .iter()
        .all(|s| s.cloud_cover == 50));
    assert!(timeline.best_window.is_some());
}

#[test]
fn tall_wall_removes_best_window() {
    let mut wall = HorizonProfile::flat();
    for az in 0..360 {
        wall.raise(az, 89.0);
    }
    let timeline = build_timeline(
        &wall,
        &paris(),
        date(2024, 6, 21),
        &clear_day(),
        DEFAULT_TIMEZONE,
    )
    .unwrap();

    assert!(timeline.best_window.is_none());
    assert!(timeline
        .slots
        .iter()
        .all(|s| matches!(s.status, SlotStatus::Night | SlotStatus::ShadeFromBuilding)));
}
