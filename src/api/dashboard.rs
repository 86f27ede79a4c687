//! Headline figures for the dashboard landing page.

use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::aggregate::hours_worked;
use crate::config::Config;
use crate::ledger::PgLedger;
use crate::utils::time::{civil_now, day_window};

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_volunteers: i64,
    /// Volunteers who checked in today and have not checked out.
    pub present_volunteers: i64,
    /// Hours worked today; in-progress sessions count up to now.
    pub hours_worked_today: f64,
    pub unassigned_cards: i64,
}

/// Dashboard summary endpoint
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Dashboard headline figures", body = DashboardSummary),
        (status = 500, description = "Internal server error")
    ),
    tag = "Dashboard"
)]
pub async fn summary(
    ledger: web::Data<PgLedger>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let now = civil_now(config.civil_offset());
    let window = day_window(now);

    let internal = |e: sqlx::Error| {
        error!(error = %e, "Failed to build dashboard summary");
        ErrorInternalServerError("Internal server error")
    };

    let total_volunteers = ledger.count_volunteers().await.map_err(internal)?;
    let present_volunteers = ledger
        .count_present(window.0, window.1)
        .await
        .map_err(internal)?;
    let events = ledger
        .events_overlapping(window.0, window.1)
        .await
        .map_err(internal)?;
    let unassigned_cards = ledger.count_unassigned_cards().await.map_err(internal)?;

    Ok(HttpResponse::Ok().json(DashboardSummary {
        total_volunteers,
        present_volunteers,
        hours_worked_today: hours_worked(&events, window, now),
        unassigned_cards,
    }))
}
