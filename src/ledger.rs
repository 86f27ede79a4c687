//! The attendance ledger: the one piece of persistent state the service owns.
//!
//! The scan path goes through the [`AttendanceLedger`] trait so the resolver
//! can be exercised against an in-memory ledger in tests; everything else
//! (aggregation windows, the paginated table, dashboard counters) is
//! read-only and lives as inherent queries on [`PgLedger`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::{
    attendance::{AttendanceEvent, AttendanceRecord, AttendanceRecordView},
    card::Card,
    volunteer::VolunteerProfile,
};

#[derive(Debug)]
pub enum LedgerError {
    /// An insert raced another scan that already opened a session for the
    /// same volunteer (unique violation on the partial index).
    SessionAlreadyOpen,
    Db(sqlx::Error),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::SessionAlreadyOpen => write!(f, "volunteer already has an open session"),
            LedgerError::Db(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::Db(e)
    }
}

/// Scan-path storage operations. Each method is a single atomic statement in
/// the Postgres implementation; together with the partial unique index on
/// `(id_user) WHERE check_out_time IS NULL` they keep the one-open-session
/// invariant under concurrent scans.
#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    /// Look up a card by its RFID token.
    async fn find_card(&self, rfid: &str) -> Result<Option<Card>, LedgerError>;

    /// Close the volunteer's open session, if any, stamping `check_out_time`
    /// and `total_hours`. Returns the closed record.
    async fn close_open_session(
        &self,
        id_user: Uuid,
        now: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>, LedgerError>;

    /// Open a new session. Fails with [`LedgerError::SessionAlreadyOpen`]
    /// when the volunteer already has one.
    async fn open_session(
        &self,
        id_user: Uuid,
        now: NaiveDateTime,
    ) -> Result<AttendanceRecord, LedgerError>;
}

const RECORD_COLUMNS: &str = "id_record, id_user, check_in_time, check_out_time, \
     CAST(EXTRACT(EPOCH FROM total_hours) / 3600.0 AS DOUBLE PRECISION) AS total_hours";

#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Events whose check-in or check-out falls inside `[from, to)`. A
    /// check-out can belong to a check-in from an earlier day, so both
    /// columns are matched against the window.
    pub async fn events_overlapping(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<AttendanceEvent>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceEvent>(
            r#"
            SELECT id_user, check_in_time, check_out_time
            FROM attendance_record
            WHERE (check_in_time >= $1 AND check_in_time < $2)
               OR (check_out_time >= $1 AND check_out_time < $2)
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_volunteers(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    /// Open sessions that started inside `[from, to)` — "currently present".
    pub async fn count_present(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM attendance_record
            WHERE check_out_time IS NULL
              AND check_in_time >= $1 AND check_in_time < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn count_unassigned_cards(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM card WHERE id_user IS NULL")
            .fetch_one(&self.pool)
            .await
    }

    pub async fn volunteer_profile(
        &self,
        id_user: Uuid,
    ) -> Result<Option<VolunteerProfile>, sqlx::Error> {
        sqlx::query_as::<_, VolunteerProfile>(
            "SELECT id_user, name, email, phone_number FROM users WHERE id_user = $1",
        )
        .bind(id_user)
        .fetch_optional(&self.pool)
        .await
    }

    /// Filtered, paginated read view over the ledger for the dashboard table.
    pub async fn records_page(
        &self,
        filter: &RecordsFilter,
    ) -> Result<(Vec<AttendanceRecordView>, i64), sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<SqlParam> = Vec::new();

        if let Some(search) = &filter.search {
            params.push(SqlParam::Text(format!("%{}%", search.to_lowercase())));
            conditions.push(format!("LOWER(u.name) LIKE ${}", params.len()));
        }
        if let Some(from) = filter.from {
            params.push(SqlParam::Date(from));
            conditions.push(format!("CAST(ar.check_in_time AS DATE) >= ${}", params.len()));
        }
        if let Some(to) = filter.to {
            params.push(SqlParam::Date(to));
            conditions.push(format!("CAST(ar.check_in_time AS DATE) <= ${}", params.len()));
        }
        if filter.only_present {
            conditions.push("ar.check_out_time IS NULL".to_string());
        }

        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM attendance_record ar \
             JOIN users u ON ar.id_user = u.id_user {}",
            where_sql
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &params {
            count_query = match p {
                SqlParam::Text(v) => count_query.bind(v),
                SqlParam::Date(v) => count_query.bind(v),
            };
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT ar.id_record, ar.id_user, u.name, ar.check_in_time, ar.check_out_time, \
             CAST(EXTRACT(EPOCH FROM ar.total_hours) / 3600.0 AS DOUBLE PRECISION) AS total_hours \
             FROM attendance_record ar \
             JOIN users u ON ar.id_user = u.id_user \
             {} ORDER BY ar.check_in_time DESC LIMIT ${} OFFSET ${}",
            where_sql,
            params.len() + 1,
            params.len() + 2
        );
        let mut data_query = sqlx::query_as::<_, AttendanceRecordView>(&data_sql);
        for p in &params {
            data_query = match p {
                SqlParam::Text(v) => data_query.bind(v),
                SqlParam::Date(v) => data_query.bind(v),
            };
        }
        let offset = (filter.page as i64 - 1) * filter.page_size as i64;
        let records = data_query
            .bind(filter.page_size as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }
}

#[async_trait]
impl AttendanceLedger for PgLedger {
    async fn find_card(&self, rfid: &str) -> Result<Option<Card>, LedgerError> {
        let card = sqlx::query_as::<_, Card>("SELECT id, name, id_user FROM card WHERE name = $1")
            .bind(rfid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(card)
    }

    async fn close_open_session(
        &self,
        id_user: Uuid,
        now: NaiveDateTime,
    ) -> Result<Option<AttendanceRecord>, LedgerError> {
        let sql = format!(
            r#"
            UPDATE attendance_record
            SET check_out_time = $2,
                total_hours = $2 - check_in_time,
                updated_at = $2
            WHERE id_user = $1 AND check_out_time IS NULL
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id_user)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn open_session(
        &self,
        id_user: Uuid,
        now: NaiveDateTime,
    ) -> Result<AttendanceRecord, LedgerError> {
        let sql = format!(
            r#"
            INSERT INTO attendance_record (id_record, id_user, check_in_time, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );
        let result = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(id_user)
            .bind(now)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(record) => Ok(record),
            Err(e) => {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23505") {
                        return Err(LedgerError::SessionAlreadyOpen);
                    }
                }
                Err(LedgerError::Db(e))
            }
        }
    }
}

/// Filters for the paginated records view.
#[derive(Debug)]
pub struct RecordsFilter {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub only_present: bool,
}

/// Bindable value for the dynamically assembled WHERE clause.
#[derive(Debug)]
enum SqlParam {
    Text(String),
    Date(NaiveDate),
}
