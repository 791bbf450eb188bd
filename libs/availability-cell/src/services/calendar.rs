use chrono::{DateTime, Duration, LocalResult, Months, NaiveDate, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;

use crate::models::{AvailabilityError, TimeInterval, WorkingWindow};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const CLOCK_FORMAT: &str = "%H:%M";

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, AvailabilityError> {
    if value.len() != 10 {
        return Err(AvailabilityError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AvailabilityError::InvalidDate(value.to_string()))
}

/// Parse a strict `YYYY-MM` month into its first and last calendar day.
pub fn parse_month(value: &str) -> Result<(NaiveDate, NaiveDate), AvailabilityError> {
    let invalid = || AvailabilityError::InvalidMonth(value.to_string());

    if value.len() != 7 {
        return Err(invalid());
    }
    let first = NaiveDate::parse_from_str(&format!("{}-01", value), DATE_FORMAT)
        .map_err(|_| invalid())?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;

    Ok((first, last))
}

/// Parse a caller-supplied `HH:MM` start time.
pub fn parse_slot_time(value: &str) -> Result<NaiveTime, AvailabilityError> {
    if value.len() != 5 {
        return Err(AvailabilityError::InvalidTime(value.to_string()));
    }
    NaiveTime::parse_from_str(value, CLOCK_FORMAT)
        .map_err(|_| AvailabilityError::InvalidTime(value.to_string()))
}

/// Parse a stored appointment clock time. Rows written as `HH:MM` and
/// Postgres `time` columns rendered as `HH:MM:SS` are both accepted.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Pin a wall-clock time on `date` to an instant in the clinic timezone.
///
/// A time repeated by a DST fold resolves to its first occurrence. A time
/// skipped by a DST gap is read with the offset in force before the gap,
/// which moves it forward by the gap length.
pub fn anchor(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Tz> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let before_gap = tz.offset_from_utc_datetime(&(naive - Duration::days(1))).fix();
            let utc = naive - Duration::seconds(i64::from(before_gap.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Absolute working interval for `date` from the window's stored clock times.
pub fn build_window(window: &WorkingWindow, date: NaiveDate, tz: Tz) -> TimeInterval {
    TimeInterval {
        start: anchor(date, window.start_time, tz),
        end: anchor(date, window.end_time, tz),
    }
}

/// Interval consumed by a booking starting at `clock_time` on `date`.
pub fn build_occupied(
    clock_time: &str,
    date: NaiveDate,
    duration_minutes: u32,
    tz: Tz,
) -> Result<TimeInterval, AvailabilityError> {
    let time = parse_clock_time(clock_time)
        .ok_or_else(|| AvailabilityError::InvalidTime(clock_time.to_string()))?;
    let start = anchor(date, time, tz);

    Ok(TimeInterval {
        start,
        end: start + Duration::minutes(i64::from(duration_minutes)),
    })
}

/// Half-open overlap: intervals that only touch at an endpoint do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

impl TimeInterval {
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}
