use crate::aggregate::{DayBucket, HourBucket, PeriodTotals, TodayTotals, WeekBucket};
use crate::api::dashboard::DashboardSummary;
use crate::api::records::RecordsResponse;
use crate::api::scan::ScanAction;
use crate::api::stats::{MonthStatsResponse, TodayStatsResponse, WeekStatsResponse};
use crate::model::attendance::{AttendanceRecord, AttendanceRecordView};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Volunteer Attendance API",
        version = "1.0.0",
        description = r#"
## Volunteer Attendance Service

Records volunteer check-ins and check-outs from RFID scans and derives
attendance statistics for the admin dashboard.

### Key Features
- **Scan resolution**
  - One RFID scan toggles the volunteer between checked-in and checked-out
- **Statistics**
  - Hourly, weekday and week-of-month charts with worked and overtime hours
- **Records**
  - Paginated, filterable attendance history

All timestamps and period boundaries use one fixed civil timezone.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::scan::scan,
        crate::api::stats::get_stats,
        crate::api::records::list_records,
        crate::api::dashboard::summary,
    ),
    components(
        schemas(
            ScanAction,
            AttendanceRecord,
            AttendanceRecordView,
            RecordsResponse,
            HourBucket,
            DayBucket,
            WeekBucket,
            TodayTotals,
            PeriodTotals,
            TodayStatsResponse,
            WeekStatsResponse,
            MonthStatsResponse,
            DashboardSummary
        )
    ),
    tags(
        (name = "Attendance", description = "Scan resolution and attendance statistics"),
        (name = "Dashboard", description = "Dashboard summary figures"),
    )
)]
pub struct ApiDoc;
