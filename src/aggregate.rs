//! Time-bucketed attendance statistics.
//!
//! The handlers fetch raw ledger events for a period window and the functions
//! here do all bucketing and totalling in civil-local time. Empty buckets are
//! pre-populated before events are merged in, so a sparse ledger never makes
//! an hour or weekday disappear from a chart.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::model::attendance::AttendanceEvent;
use crate::utils::time::{duration_hours, hour_labels, month_bucket, WEEKDAY_LABELS};

/// One hour of the current civil day.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct HourBucket {
    pub hora: String,
    pub entradas: i64,
    pub salidas: i64,
}

/// One weekday of the current ISO week.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct DayBucket {
    pub name: String,
    pub entradas: i64,
    pub salidas: i64,
}

/// One day-of-month range ("Semana 1" = days 1-7, …) of the current month.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct WeekBucket {
    pub semana: String,
    pub entradas: i64,
    pub salidas: i64,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct TodayTotals {
    pub asistencias: i64,
    /// Registered volunteers minus today's check-ins. Can go negative when a
    /// volunteer checks in more than once in a day; kept as-is for
    /// compatibility with the dashboard.
    pub ausencias: i64,
    pub horas_totales: f64,
    pub horas_extras: f64,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
pub struct PeriodTotals {
    pub entradas: i64,
    pub salidas: i64,
}

fn in_window(t: NaiveDateTime, window: (NaiveDateTime, NaiveDateTime)) -> bool {
    t >= window.0 && t < window.1
}

/// 24 hour buckets for the civil day `window`, counting raw check-in and
/// check-out events per hour.
pub fn today_chart(
    events: &[AttendanceEvent],
    window: (NaiveDateTime, NaiveDateTime),
) -> Vec<HourBucket> {
    let mut buckets: Vec<HourBucket> = hour_labels()
        .into_iter()
        .map(|hora| HourBucket {
            hora,
            entradas: 0,
            salidas: 0,
        })
        .collect();

    for ev in events {
        if in_window(ev.check_in_time, window) {
            buckets[ev.check_in_time.hour() as usize].entradas += 1;
        }
        if let Some(out) = ev.check_out_time {
            if in_window(out, window) {
                buckets[out.hour() as usize].salidas += 1;
            }
        }
    }
    buckets
}

/// Period totals for the "today" response. Hours only cover sessions that
/// started today; open ones count up to `now`.
pub fn today_totals(
    events: &[AttendanceEvent],
    chart: &[HourBucket],
    window: (NaiveDateTime, NaiveDateTime),
    now: NaiveDateTime,
    total_volunteers: i64,
    workday: Duration,
) -> TodayTotals {
    let asistencias: i64 = chart.iter().map(|b| b.entradas).sum();

    let mut horas_totales = 0.0;
    let mut horas_extras = 0.0;
    for ev in events {
        if !in_window(ev.check_in_time, window) {
            continue;
        }
        match ev.check_out_time {
            Some(out) => {
                let worked = out - ev.check_in_time;
                horas_totales += duration_hours(worked);
                if worked > workday {
                    horas_extras += duration_hours(worked - workday);
                }
            }
            None => horas_totales += duration_hours(now - ev.check_in_time),
        }
    }

    TodayTotals {
        asistencias,
        ausencias: total_volunteers - asistencias,
        horas_totales,
        horas_extras,
    }
}

/// Seven weekday buckets (Mon…Sun) counting DISTINCT volunteers per day.
pub fn week_chart(
    events: &[AttendanceEvent],
    window: (NaiveDateTime, NaiveDateTime),
) -> Vec<DayBucket> {
    let week_start: NaiveDate = window.0.date();
    let mut entradas: [HashSet<Uuid>; 7] = Default::default();
    let mut salidas: [HashSet<Uuid>; 7] = Default::default();

    for ev in events {
        if in_window(ev.check_in_time, window) {
            let idx = (ev.check_in_time.date() - week_start).num_days() as usize;
            entradas[idx].insert(ev.id_user);
        }
        if let Some(out) = ev.check_out_time {
            if in_window(out, window) {
                let idx = (out.date() - week_start).num_days() as usize;
                salidas[idx].insert(ev.id_user);
            }
        }
    }

    WEEKDAY_LABELS
        .iter()
        .enumerate()
        .map(|(i, name)| DayBucket {
            name: name.to_string(),
            entradas: entradas[i].len() as i64,
            salidas: salidas[i].len() as i64,
        })
        .collect()
}

/// Day-of-month range buckets for the current month, DISTINCT volunteers per
/// range. Always at least 4 buckets; a 5th only when days 29+ saw any event.
pub fn month_chart(
    events: &[AttendanceEvent],
    window: (NaiveDateTime, NaiveDateTime),
) -> Vec<WeekBucket> {
    let mut entradas: [HashSet<Uuid>; 5] = Default::default();
    let mut salidas: [HashSet<Uuid>; 5] = Default::default();

    for ev in events {
        if in_window(ev.check_in_time, window) {
            entradas[month_bucket(ev.check_in_time.day())].insert(ev.id_user);
        }
        if let Some(out) = ev.check_out_time {
            if in_window(out, window) {
                salidas[month_bucket(out.day())].insert(ev.id_user);
            }
        }
    }

    let last_nonempty = (0..5)
        .rev()
        .find(|&i| !entradas[i].is_empty() || !salidas[i].is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    let emitted = last_nonempty.max(4);

    (0..emitted)
        .map(|i| WeekBucket {
            semana: format!("Semana {}", i + 1),
            entradas: entradas[i].len() as i64,
            salidas: salidas[i].len() as i64,
        })
        .collect()
}

pub fn period_totals<'a, I>(buckets: I) -> PeriodTotals
where
    I: IntoIterator<Item = (&'a i64, &'a i64)>,
{
    let mut totals = PeriodTotals {
        entradas: 0,
        salidas: 0,
    };
    for (e, s) in buckets {
        totals.entradas += e;
        totals.salidas += s;
    }
    totals
}

/// Hours worked by sessions that started inside `window`: closed sessions
/// contribute their full duration, open ones run until `now`. Used by both
/// the "today" totals and the dashboard summary.
pub fn hours_worked(
    events: &[AttendanceEvent],
    window: (NaiveDateTime, NaiveDateTime),
    now: NaiveDateTime,
) -> f64 {
    events
        .iter()
        .filter(|ev| in_window(ev.check_in_time, window))
        .map(|ev| match ev.check_out_time {
            Some(out) => duration_hours(out - ev.check_in_time),
            None => duration_hours(now - ev.check_in_time),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::{day_window, month_window, week_window};
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn event(user: Uuid, check_in: NaiveDateTime, check_out: Option<NaiveDateTime>) -> AttendanceEvent {
        AttendanceEvent {
            id_user: user,
            check_in_time: check_in,
            check_out_time: check_out,
        }
    }

    #[test]
    fn today_chart_has_all_24_buckets_when_ledger_is_empty() {
        let chart = today_chart(&[], day_window(at(14, 12, 0)));
        assert_eq!(chart.len(), 24);
        assert_eq!(chart[0].hora, "00:00");
        assert_eq!(chart[23].hora, "23:00");
        assert!(chart.iter().all(|b| b.entradas == 0 && b.salidas == 0));
        for w in chart.windows(2) {
            assert!(w[0].hora < w[1].hora);
        }
    }

    #[test]
    fn today_chart_places_events_in_their_hours() {
        let ana = Uuid::new_v4();
        let events = vec![
            event(ana, at(14, 8, 15), Some(at(14, 17, 45))),
            event(Uuid::new_v4(), at(14, 8, 59), None),
        ];
        let chart = today_chart(&events, day_window(at(14, 18, 0)));
        assert_eq!(chart[8].entradas, 2);
        assert_eq!(chart[17].salidas, 1);
        assert_eq!(chart[8].salidas, 0);
    }

    #[test]
    fn asistencias_equals_sum_of_entradas() {
        let events = vec![
            event(Uuid::new_v4(), at(14, 8, 0), Some(at(14, 12, 0))),
            event(Uuid::new_v4(), at(14, 9, 0), None),
            event(Uuid::new_v4(), at(14, 9, 30), None),
        ];
        let window = day_window(at(14, 10, 0));
        let chart = today_chart(&events, window);
        let totals = today_totals(&events, &chart, window, at(14, 10, 0), 10, Duration::hours(8));
        assert_eq!(
            totals.asistencias,
            chart.iter().map(|b| b.entradas).sum::<i64>()
        );
        assert_eq!(totals.asistencias, 3);
        assert_eq!(totals.ausencias, 7);
    }

    #[test]
    fn open_sessions_count_hours_up_to_now() {
        let events = vec![event(Uuid::new_v4(), at(14, 8, 0), None)];
        let window = day_window(at(14, 10, 30));
        let chart = today_chart(&events, window);
        let totals = today_totals(&events, &chart, window, at(14, 10, 30), 1, Duration::hours(8));
        assert_eq!(totals.horas_totales, 2.5);
        assert_eq!(totals.horas_extras, 0.0);
    }

    #[test]
    fn overtime_only_counts_time_past_the_workday_on_closed_sessions() {
        let events = vec![
            // 10h closed -> 2h overtime
            event(Uuid::new_v4(), at(14, 7, 0), Some(at(14, 17, 0))),
            // 12h still open -> hours yes, overtime no
            event(Uuid::new_v4(), at(14, 6, 0), None),
        ];
        let window = day_window(at(14, 18, 0));
        let chart = today_chart(&events, window);
        let totals = today_totals(&events, &chart, window, at(14, 18, 0), 5, Duration::hours(8));
        assert_eq!(totals.horas_totales, 22.0);
        assert_eq!(totals.horas_extras, 2.0);
    }

    #[test]
    fn late_session_from_yesterday_leaves_today_but_stays_in_the_week() {
        // Checked in Friday 23:50, never out. "Today" is Saturday.
        let ana = Uuid::new_v4();
        let events = vec![event(ana, at(14, 23, 50), None)];

        let saturday_noon = at(15, 12, 0);
        let today = today_chart(&events, day_window(saturday_noon));
        assert!(today.iter().all(|b| b.entradas == 0 && b.salidas == 0));

        // Same ISO week (Mon 2025-03-10 .. Sun 2025-03-16): Friday counts her once.
        let week = week_chart(&events, week_window(saturday_noon));
        assert_eq!(week[4].name, "Vie");
        assert_eq!(week[4].entradas, 1);
        assert_eq!(week.iter().map(|b| b.entradas).sum::<i64>(), 1);
    }

    #[test]
    fn week_buckets_count_distinct_volunteers_not_events() {
        let ana = Uuid::new_v4();
        let events = vec![
            // Ana in and out twice on Monday
            event(ana, at(10, 8, 0), Some(at(10, 12, 0))),
            event(ana, at(10, 14, 0), Some(at(10, 18, 0))),
            event(Uuid::new_v4(), at(10, 9, 0), None),
        ];
        let chart = week_chart(&events, week_window(at(12, 10, 0)));
        assert_eq!(chart.len(), 7);
        assert_eq!(chart[0].name, "Lun");
        assert_eq!(chart[0].entradas, 2); // Ana + the other volunteer
        assert_eq!(chart[0].salidas, 1); // only Ana checked out
        let totals = period_totals(chart.iter().map(|b| (&b.entradas, &b.salidas)));
        assert_eq!(totals, PeriodTotals { entradas: 2, salidas: 1 });
    }

    #[test]
    fn month_emits_four_buckets_unless_day_29_plus_has_data() {
        let window = month_window(at(14, 10, 0));
        let early = vec![event(Uuid::new_v4(), at(3, 9, 0), Some(at(3, 17, 0)))];
        let chart = month_chart(&early, window);
        assert_eq!(chart.len(), 4);
        assert_eq!(chart[0].semana, "Semana 1");
        assert_eq!(chart[0].entradas, 1);

        let late = vec![
            event(Uuid::new_v4(), at(3, 9, 0), None),
            event(Uuid::new_v4(), at(30, 9, 0), None),
        ];
        let chart = month_chart(&late, window);
        assert_eq!(chart.len(), 5);
        assert_eq!(chart[4].semana, "Semana 5");
        assert_eq!(chart[4].entradas, 1);
    }

    #[test]
    fn month_buckets_are_restricted_to_the_current_month() {
        let window = month_window(at(14, 10, 0));
        let events = vec![event(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 2, 28)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            None,
        )];
        let chart = month_chart(&events, window);
        assert!(chart.iter().all(|b| b.entradas == 0 && b.salidas == 0));
    }

    #[test]
    fn hours_worked_matches_dashboard_summary_semantics() {
        let window = day_window(at(14, 12, 0));
        let events = vec![
            event(Uuid::new_v4(), at(14, 8, 0), Some(at(14, 12, 0))), // 4h closed
            event(Uuid::new_v4(), at(14, 11, 0), None),               // 1h running
        ];
        assert_eq!(hours_worked(&events, window, at(14, 12, 0)), 5.0);
    }
}
