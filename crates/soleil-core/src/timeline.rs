//! Day timelines and best sunny window

use chrono::{Duration, NaiveDate, Timelike};
use chrono_tz::Tz;

use crate::classify::{classify, is_urban_clear};
use crate::horizon::HorizonProfile;
use crate::solar::{daylight_bounds, sun_position};
use crate::time::{at_local, clock};
use crate::types::{BestWindow, ObservationPoint, SlotStatus, Timeline, TimelineSlot};
use crate::weather::WeatherDay;
use crate::CoreResult;

/// Spacing between timeline slots
pub const STEP_MINUTES: i64 = 15;

/// Timelines never start before this local hour
pub const EARLIEST_HOUR: u32 = 6;

/// Timelines never end after this local hour
pub const LATEST_HOUR: u32 = 22;

/// Build the 15-minute timeline for one location and date.
///
/// The window runs from one hour before sunrise to one hour after sunset,
/// on whole hours, clamped to 06:00-22:00.
pub fn build_timeline(
    profile: &HorizonProfile,
    point: &ObservationPoint,
    date: NaiveDate,
    weather: &WeatherDay,
    tz: Tz,
) -> CoreResult<Timeline> {
    let bounds = daylight_bounds(point, date, tz)?;

    let start_hour = bounds.sunrise.hour().saturating_sub(1).max(EARLIEST_HOUR);
    let end_hour = (bounds.sunset.hour() + 1).min(LATEST_HOUR);

    let mut current = at_local(date, clock(start_hour, 0), tz);
    let end = at_local(date, clock(end_hour, 0), tz);

    let mut slots = Vec::new();
    while current <= end {
        let sun = sun_position(point, &current)?;
        let cloud_cover = weather.cloud_cover_at(current.hour());
        let status = classify(Some(profile), &sun, cloud_cover);

        slots.push(TimelineSlot {
            time: current,
            sun_altitude: (sun.altitude * 10.0).round() / 10.0,
            urban_clear: is_urban_clear(profile, &sun),
            cloud_cover,
            status: status.into(),
        });

        current += Duration::minutes(STEP_MINUTES);
    }

    let best_window = find_best_window(&slots);

    Ok(Timeline {
        date,
        sunrise: bounds.sunrise,
        sunset: bounds.sunset,
        slots,
        best_window,
        weather_summary: weather.summary(),
    })
}

/// Longest run of consecutive clear-sun slots. The earliest run wins a tie.
pub fn find_best_window(slots: &[TimelineSlot]) -> Option<BestWindow> {
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = 0;
    let mut run_len = 0;

    for (index, slot) in slots.iter().enumerate() {
        if slot.status == SlotStatus::ClearSun {
            if run_len == 0 {
                run_start = index;
            }
            run_len += 1;
            if best.map_or(true, |(_, len)| run_len > len) {
                best = Some((run_start, run_len));
            }
        } else {
            run_len = 0;
        }
    }

    best.map(|(start, len)| {
        let minutes = len as i64 * STEP_MINUTES;
        let start = slots[start].time;
        BestWindow {
            start,
            end: start + Duration::minutes(minutes),
            duration_minutes: minutes as u32,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::DEFAULT_TIMEZONE;
    use chrono::TimeZone;

    fn slots_from(statuses: &[SlotStatus]) -> Vec<TimelineSlot> {
        let start = DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 6, 21, 8, 0, 0).unwrap();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| TimelineSlot {
                time: start + Duration::minutes(i as i64 * STEP_MINUTES),
                sun_altitude: 30.0,
                urban_clear: *status != SlotStatus::ShadeFromBuilding,
                cloud_cover: 10,
                status: *status,
            })
            .collect()
    }

    use SlotStatus::{ClearSun as C, Mixed as M, ShadeFromBuilding as S};

    #[test]
    fn test_best_window_picks_longest_run() {
        let slots = slots_from(&[C, C, S, S, C, C, C, C, M, C]);
        let best = find_best_window(&slots).unwrap();
        assert_eq!(best.start, slots[4].time);
        assert_eq!(best.end, slots[8].time);
        assert_eq!(best.duration_minutes, 60);
    }

    #[test]
    fn test_best_window_run_at_end() {
        let slots = slots_from(&[C, S, C, C, C]);
        let best = find_best_window(&slots).unwrap();
        assert_eq!(best.start, slots[2].time);
        assert_eq!(best.duration_minutes, 45);
        assert_eq!(best.end, slots[4].time + Duration::minutes(STEP_MINUTES));
    }

    #[test]
    fn test_best_window_tie_keeps_earliest() {
        let slots = slots_from(&[S, C, C, M, C, C]);
        let best = find_best_window(&slots).unwrap();
        assert_eq!(best.start, slots[1].time);
        assert_eq!(best.duration_minutes, 30);
    }

    #[test]
    fn test_best_window_absent_without_sun() {
        let slots = slots_from(&[S, M, S, SlotStatus::Overcast, SlotStatus::Night]);
        assert!(find_best_window(&slots).is_none());
        assert!(find_best_window(&[]).is_none());
    }
}
