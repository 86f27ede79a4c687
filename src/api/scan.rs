//! RFID scan endpoint: one scan, one ledger transition.

use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::ledger::{AttendanceLedger, LedgerError, PgLedger};
use crate::model::attendance::AttendanceRecord;
use crate::notify::{scan_event, Notifier};
use crate::utils::time::civil_now;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanAction {
    CheckIn,
    CheckOut,
}

#[derive(Debug)]
pub enum ScanError {
    /// The RFID token is not registered in the card directory.
    UnknownCard,
    /// The card exists but is not linked to a volunteer. Unassigned cards
    /// never create attendance records.
    CardUnassigned,
    /// Both resolution attempts lost the insert race. Not expected in
    /// practice; surfaced as 409 rather than looping.
    Conflict,
    Ledger(LedgerError),
}

impl From<LedgerError> for ScanError {
    fn from(e: LedgerError) -> Self {
        ScanError::Ledger(e)
    }
}

/// Resolves one scan into exactly one ledger mutation.
///
/// An open session for the card's volunteer is closed; otherwise a new one is
/// opened. When the insert collides with a concurrent check-in (partial
/// unique index on open sessions) the scan is retried once and resolves as
/// the matching check-out, so two racing scans yield one check-in and one
/// check-out.
pub async fn resolve_scan<L: AttendanceLedger>(
    ledger: &L,
    rfid: &str,
    now: NaiveDateTime,
) -> Result<(ScanAction, AttendanceRecord), ScanError> {
    let card = ledger
        .find_card(rfid)
        .await?
        .ok_or(ScanError::UnknownCard)?;
    let id_user = card.id_user.ok_or(ScanError::CardUnassigned)?;

    for _ in 0..2 {
        if let Some(record) = ledger.close_open_session(id_user, now).await? {
            return Ok((ScanAction::CheckOut, record));
        }
        match ledger.open_session(id_user, now).await {
            Ok(record) => return Ok((ScanAction::CheckIn, record)),
            Err(LedgerError::SessionAlreadyOpen) => continue,
            Err(e) => return Err(ScanError::Ledger(e)),
        }
    }
    Err(ScanError::Conflict)
}

#[derive(Deserialize, IntoParams)]
pub struct ScanQuery {
    /// RFID token read from the card.
    pub rfid: Option<String>,
}

/// Scan endpoint
#[utoipa::path(
    post,
    path = "/api/scan",
    params(ScanQuery),
    responses(
        (status = 201, description = "Check-in registered", body = Object, example = json!({
            "action": "check_in",
            "record": { "id_record": "…", "check_out_time": null }
        })),
        (status = 200, description = "Check-out registered", body = Object, example = json!({
            "action": "check_out",
            "record": { "id_record": "…", "total_hours": 4.5 }
        })),
        (status = 400, description = "RFID missing"),
        (status = 404, description = "Card unknown or not assigned"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn scan(
    query: web::Query<ScanQuery>,
    ledger: web::Data<PgLedger>,
    notifier: web::Data<Notifier>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let rfid = match query.rfid.as_deref().map(str::trim) {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "RFID is required"
            })));
        }
    };

    let now = civil_now(config.civil_offset());

    match resolve_scan(ledger.get_ref(), &rfid, now).await {
        Ok((action, record)) => {
            info!(?action, id_user = %record.id_user, "Scan resolved");

            // Best-effort notification; a missing profile only degrades the payload.
            let volunteer = match ledger.volunteer_profile(record.id_user).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, id_user = %record.id_user, "Volunteer lookup for notification failed");
                    None
                }
            };
            notifier.send(scan_event(action, &record, volunteer));

            let body = json!({ "action": action, "record": record });
            Ok(match action {
                ScanAction::CheckIn => HttpResponse::Created().json(body),
                ScanAction::CheckOut => HttpResponse::Ok().json(body),
            })
        }
        Err(ScanError::UnknownCard) => Ok(HttpResponse::NotFound().json(json!({
            "error": "unknown card"
        }))),
        Err(ScanError::CardUnassigned) => Ok(HttpResponse::NotFound().json(json!({
            "error": "card not assigned"
        }))),
        Err(ScanError::Conflict) => Ok(HttpResponse::Conflict().json(json!({
            "error": "concurrent scans for this volunteer, retry"
        }))),
        Err(ScanError::Ledger(e)) => {
            error!(error = %e, rfid = %rfid, "Scan failed");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })))
        }
    }
}
