//! Reference timezone policy
//!
//! Every naive timestamp entering the engine goes through [`localize`]
//! before any solar computation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::{CoreError, CoreResult};

/// Civil timezone assumed for naive instants
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Paris;

/// Parse an IANA timezone name such as `Europe/Paris`
pub fn parse_timezone(name: &str) -> CoreResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| CoreError::UnknownTimezone(name.to_string()))
}

/// Attach the reference timezone to a naive instant.
///
/// Ambiguous wall-clock times (DST fall-back) resolve to the earlier offset.
/// Times inside a DST gap are shifted forward by one hour.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Wall-clock time on a date in the given zone
pub fn at_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Tz> {
    localize(date.and_time(time), tz)
}

/// `HH:MM` as a `NaiveTime`; out-of-range input clamps to midnight
pub fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
