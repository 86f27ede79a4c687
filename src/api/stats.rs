//! Bucketed attendance statistics for the dashboard charts.

use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::aggregate::{
    month_chart, period_totals, today_chart, today_totals, week_chart, DayBucket, HourBucket,
    PeriodTotals, TodayTotals, WeekBucket,
};
use crate::config::Config;
use crate::ledger::PgLedger;
use crate::utils::time::{civil_now, day_window, month_window, week_window};

#[derive(Deserialize, IntoParams)]
pub struct StatsQuery {
    /// "today" (default), "week" or "month".
    pub period: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct TodayStatsResponse {
    pub period: String,
    pub chart: Vec<HourBucket>,
    pub stats: TodayTotals,
}

#[derive(Serialize, ToSchema)]
pub struct WeekStatsResponse {
    pub period: String,
    pub chart: Vec<DayBucket>,
    pub stats: PeriodTotals,
}

#[derive(Serialize, ToSchema)]
pub struct MonthStatsResponse {
    pub period: String,
    pub chart: Vec<WeekBucket>,
    pub stats: PeriodTotals,
}

/// Attendance stats endpoint
#[utoipa::path(
    get,
    path = "/api/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Bucketed chart plus period totals", body = TodayStatsResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_stats(
    query: web::Query<StatsQuery>,
    ledger: web::Data<PgLedger>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let period = query
        .period
        .as_deref()
        .unwrap_or("today")
        .to_lowercase();

    // One sample of "now"; every window boundary below derives from it.
    let now = civil_now(config.civil_offset());

    let internal = |e: sqlx::Error| {
        error!(error = %e, "Failed to compute attendance stats");
        ErrorInternalServerError("Internal server error")
    };

    match period.as_str() {
        "week" => {
            let window = week_window(now);
            let events = ledger
                .events_overlapping(window.0, window.1)
                .await
                .map_err(internal)?;
            let chart = week_chart(&events, window);
            let stats = period_totals(chart.iter().map(|b| (&b.entradas, &b.salidas)));
            Ok(HttpResponse::Ok().json(WeekStatsResponse {
                period: "week".to_string(),
                chart,
                stats,
            }))
        }
        "month" => {
            let window = month_window(now);
            let events = ledger
                .events_overlapping(window.0, window.1)
                .await
                .map_err(internal)?;
            let chart = month_chart(&events, window);
            let stats = period_totals(chart.iter().map(|b| (&b.entradas, &b.salidas)));
            Ok(HttpResponse::Ok().json(MonthStatsResponse {
                period: "month".to_string(),
                chart,
                stats,
            }))
        }
        _ => {
            let window = day_window(now);
            let events = ledger
                .events_overlapping(window.0, window.1)
                .await
                .map_err(internal)?;
            let total_volunteers = ledger.count_volunteers().await.map_err(internal)?;

            let chart = today_chart(&events, window);
            let stats = today_totals(
                &events,
                &chart,
                window,
                now,
                total_volunteers,
                Duration::hours(config.workday_hours),
            );
            Ok(HttpResponse::Ok().json(TodayStatsResponse {
                period: "today".to_string(),
                chart,
                stats,
            }))
        }
    }
}
