//! Calendar helpers shared by the workflow and coverage modules.
//!
//! Everything here is a pure function over `NaiveDate`; `chrono` does the arithmetic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// Parse a loosely formatted ISO date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM` (first of the month), `YYYY` (January 1st) and full
/// datetimes, from which only the calendar date is kept.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    let mut segments = trimmed.split('-');
    let year = segments.next()?.parse::<i32>().ok()?;
    let month = match segments.next() {
        Some(value) => value.parse::<u32>().ok()?,
        None => 1,
    };
    if segments.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !is_weekend(date)
}

/// Inclusive day iterator. Yields nothing when `start > end`.
pub fn iterate_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

pub fn weekdays_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    iterate_range(start, end).filter(|day| is_weekday(*day)).collect()
}

pub fn business_day_count(start: NaiveDate, end: NaiveDate) -> usize {
    iterate_range(start, end).filter(|day| is_weekday(*day)).count()
}

pub fn is_within_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    date >= start && date <= end
}

pub fn clamp_to_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    if date < start {
        start
    } else if date > end {
        end
    } else {
        date
    }
}

/// `date` shifted by `days`, or `None` past the representable calendar.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// Monday of the ISO week containing `date`. `None` when that Monday precedes the first
/// representable date.
pub fn iso_week_start(date: NaiveDate) -> Option<NaiveDate> {
    let offset = i64::from(date.weekday().num_days_from_monday());
    shift_days(date, -offset)
}

/// Monday and Sunday of the ISO week containing `date`, when both are representable.
pub fn iso_week_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let monday = iso_week_start(date)?;
    Some((monday, shift_days(monday, 6)?))
}

/// ISO-week Mondays from the week containing `start` through `end`.
pub fn enumerate_weeks(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut weeks = Vec::new();
    let mut cursor = iso_week_start(start);
    while let Some(monday) = cursor.filter(|monday| *monday <= end) {
        weeks.push(monday);
        cursor = shift_days(monday, 7);
    }
    weeks
}

pub fn spans_weekend(start: NaiveDate, end: NaiveDate) -> bool {
    iterate_range(start, end).any(is_weekend)
}

pub fn diff_in_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Short display form used by board listings, e.g. `Jan 05`.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_partial_and_datetime_inputs() {
        assert_eq!(parse_iso_date("2026-01-06"), Some(date(2026, 1, 6)));
        assert_eq!(parse_iso_date(" 2026-02 "), Some(date(2026, 2, 1)));
        assert_eq!(parse_iso_date("2026"), Some(date(2026, 1, 1)));
        assert_eq!(
            parse_iso_date("2026-01-06T09:30:00Z"),
            Some(date(2026, 1, 6))
        );
        assert_eq!(
            parse_iso_date("2026-01-06T09:30:00"),
            Some(date(2026, 1, 6))
        );
        assert_eq!(parse_iso_date(""), None);
        assert_eq!(parse_iso_date("not-a-date"), None);
        assert_eq!(parse_iso_date("2026-13"), None);
    }

    #[test]
    fn weekday_helpers_skip_weekends() {
        // 2026-01-09 is a Friday, 2026-01-12 the following Monday.
        let weekdays = weekdays_between(date(2026, 1, 9), date(2026, 1, 12));
        assert_eq!(weekdays, vec![date(2026, 1, 9), date(2026, 1, 12)]);
        assert_eq!(business_day_count(date(2026, 2, 2), date(2026, 2, 6)), 5);
        assert!(spans_weekend(date(2026, 1, 9), date(2026, 1, 12)));
        assert!(!spans_weekend(date(2026, 2, 2), date(2026, 2, 6)));
        assert!(is_weekend(date(2026, 1, 10)));
        assert!(is_weekday(date(2026, 1, 19)));
    }

    #[test]
    fn empty_range_when_start_after_end() {
        assert_eq!(iterate_range(date(2026, 1, 8), date(2026, 1, 6)).count(), 0);
        assert_eq!(diff_in_days(date(2026, 1, 8), date(2026, 1, 6)), -2);
    }

    #[test]
    fn iso_week_start_maps_sunday_to_previous_monday() {
        assert_eq!(iso_week_start(date(2026, 1, 11)), Some(date(2026, 1, 5)));
        assert_eq!(iso_week_start(date(2026, 1, 5)), Some(date(2026, 1, 5)));
        assert_eq!(
            enumerate_weeks(date(2026, 1, 7), date(2026, 1, 19)),
            vec![date(2026, 1, 5), date(2026, 1, 12), date(2026, 1, 19)]
        );
    }

    #[test]
    fn clamps_and_formats() {
        let start = date(2026, 1, 5);
        let end = date(2026, 3, 27);
        assert_eq!(clamp_to_range(date(2025, 12, 1), start, end), start);
        assert_eq!(clamp_to_range(date(2026, 4, 1), start, end), end);
        assert!(is_within_range(date(2026, 3, 27), start, end));
        assert_eq!(format_display(start), "Jan 05");
        assert_eq!(to_iso_date(start), "2026-01-05");
    }

    #[test]
    fn week_arithmetic_stops_at_the_calendar_edges() {
        let last = parse_iso_date("+262142-12-31").expect("parses the last representable day");
        assert_eq!(iso_week_bounds(last), None);
        assert_eq!(shift_days(last, 1), None);
        assert!(iso_week_start(NaiveDate::MIN).map_or(true, |monday| monday == NaiveDate::MIN));
        assert_eq!(enumerate_weeks(last, last).len(), 1);

        assert_eq!(
            iso_week_bounds(date(2026, 1, 8)),
            Some((date(2026, 1, 5), date(2026, 1, 11)))
        );
    }
}
