//! Civil-time helpers. Every period boundary in the service is computed here,
//! in the single configured timezone — never in UTC.

use chrono::{Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime, Utc};

/// Current instant as a naive civil-local timestamp.
pub fn civil_now(offset: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&offset).naive_local()
}

/// Half-open `[start, end)` window of the civil day containing `now`.
pub fn day_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = now.date().and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Half-open window of the ISO week (Monday-based) containing `now`.
pub fn week_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let date = now.date();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let start = monday.and_time(NaiveTime::MIN);
    (start, start + Duration::days(7))
}

/// Half-open window of the civil month containing `now`.
pub fn month_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let date = now.date();
    let first = date.with_day(1).unwrap();
    let next_first = if date.month() == 12 {
        first.with_year(date.year() + 1).unwrap().with_month(1).unwrap()
    } else {
        first.with_month(date.month() + 1).unwrap()
    };
    (
        first.and_time(NaiveTime::MIN),
        next_first.and_time(NaiveTime::MIN),
    )
}

/// `"00:00"` … `"23:00"`, one label per hour of the civil day.
pub fn hour_labels() -> Vec<String> {
    (0..24).map(|h| format!("{:02}:00", h)).collect()
}

/// Weekday labels, Monday first, as the dashboard charts expect them.
pub const WEEKDAY_LABELS: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

/// Day-of-month range bucket: days 1-7 → 0, 8-14 → 1, 15-21 → 2,
/// 22-28 → 3, 29 and later → 4.
pub fn month_bucket(day_of_month: u32) -> usize {
    (((day_of_month - 1) / 7) as usize).min(4)
}

/// Decimal hours of a duration, the unit the stats responses report.
pub fn duration_hours(d: Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn day_window_covers_exactly_one_civil_day() {
        let (start, end) = day_window(at(2025, 3, 14, 23, 50));
        assert_eq!(start, at(2025, 3, 14, 0, 0));
        assert_eq!(end, at(2025, 3, 15, 0, 0));
    }

    #[test]
    fn week_window_starts_on_iso_monday() {
        // 2025-03-14 is a Friday; its ISO week starts Monday 2025-03-10.
        let (start, end) = week_window(at(2025, 3, 14, 10, 0));
        assert_eq!(start, at(2025, 3, 10, 0, 0));
        assert_eq!(end, at(2025, 3, 17, 0, 0));

        // A Monday is its own week start.
        let (start, _) = week_window(at(2025, 3, 10, 0, 0));
        assert_eq!(start, at(2025, 3, 10, 0, 0));
    }

    #[test]
    fn month_window_handles_year_rollover() {
        let (start, end) = month_window(at(2024, 12, 31, 23, 59));
        assert_eq!(start, at(2024, 12, 1, 0, 0));
        assert_eq!(end, at(2025, 1, 1, 0, 0));
    }

    #[test]
    fn hour_labels_are_complete_and_ascending() {
        let labels = hour_labels();
        assert_eq!(labels.len(), 24);
        assert_eq!(labels[0], "00:00");
        assert_eq!(labels[23], "23:00");
        for w in labels.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn month_bucket_ranges() {
        assert_eq!(month_bucket(1), 0);
        assert_eq!(month_bucket(7), 0);
        assert_eq!(month_bucket(8), 1);
        assert_eq!(month_bucket(14), 1);
        assert_eq!(month_bucket(21), 2);
        assert_eq!(month_bucket(28), 3);
        assert_eq!(month_bucket(29), 4);
        assert_eq!(month_bucket(31), 4);
    }

    #[test]
    fn duration_hours_is_decimal() {
        assert_eq!(duration_hours(Duration::minutes(90)), 1.5);
    }
}
