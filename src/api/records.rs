//! Paginated, filtered read view over the attendance ledger.

use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::ledger::{PgLedger, RecordsFilter};
use crate::model::attendance::AttendanceRecordView;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RecordsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Case-insensitive substring match on the volunteer name.
    pub search: Option<String>,
    /// Inclusive check-in date bounds, YYYY-MM-DD (civil dates).
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only sessions that are still open.
    pub only_present: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct RecordsResponse {
    pub records: Vec<AttendanceRecordView>,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    pub total: i64,
}

/// Attendance records endpoint
#[utoipa::path(
    get,
    path = "/api/records",
    params(RecordsQuery),
    responses(
        (status = 200, description = "Paginated attendance records", body = RecordsResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_records(
    query: web::Query<RecordsQuery>,
    ledger: web::Data<PgLedger>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).clamp(1, 100);

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let filter = RecordsFilter {
        page,
        page_size,
        search,
        from: query.from,
        to: query.to,
        only_present: query.only_present.unwrap_or(false),
    };

    let (records, total) = ledger.records_page(&filter).await.map_err(|e| {
        error!(error = %e, ?filter, "Failed to fetch attendance records");
        ErrorInternalServerError("Internal server error")
    })?;

    Ok(HttpResponse::Ok().json(RecordsResponse {
        records,
        page,
        page_size,
        total,
    }))
}
