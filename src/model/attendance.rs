use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One attendance session. `check_out_time = NULL` means the session is open
/// and the volunteer is currently present.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id_record: Uuid,
    pub id_user: Uuid,
    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,
    /// Worked time in decimal hours, stamped once at close.
    pub total_hours: Option<f64>,
}

/// Minimal event row the aggregator buckets. The worked duration of a closed
/// session is `check_out_time - check_in_time` by construction, so the stored
/// interval is not re-read here.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceEvent {
    pub id_user: Uuid,
    pub check_in_time: NaiveDateTime,
    pub check_out_time: Option<NaiveDateTime>,
}

/// Ledger row joined with the volunteer name, for the dashboard table.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecordView {
    pub id_record: Uuid,
    pub id_user: Uuid,
    pub name: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,
    pub total_hours: Option<f64>,
}
