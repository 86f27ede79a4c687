//! Fire-and-forget scan notifications.
//!
//! Delivery runs on a spawned task and can never fail or delay the attendance
//! mutation; a dead webhook only produces a warning in the logs.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::api::scan::ScanAction;
use crate::model::{attendance::AttendanceRecord, volunteer::VolunteerProfile};

const LOCAL_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Serialize)]
pub struct ScanEvent {
    pub event: ScanAction,
    pub volunteer: Option<VolunteerProfile>,
    pub record: ScanEventRecord,
}

#[derive(Debug, Serialize)]
pub struct ScanEventRecord {
    pub id_record: Uuid,
    pub check_in_time: NaiveDateTime,
    pub check_out_time: Option<NaiveDateTime>,
    /// Human-readable civil-local renderings for message templates.
    pub check_in_local: String,
    pub check_out_local: Option<String>,
}

/// Builds the webhook payload for one resolved scan.
pub fn scan_event(
    action: ScanAction,
    record: &AttendanceRecord,
    volunteer: Option<VolunteerProfile>,
) -> ScanEvent {
    ScanEvent {
        event: action,
        volunteer,
        record: ScanEventRecord {
            id_record: record.id_record,
            check_in_time: record.check_in_time,
            check_out_time: record.check_out_time,
            check_in_local: record.check_in_time.format(LOCAL_FORMAT).to_string(),
            check_out_local: record
                .check_out_time
                .map(|t| t.format(LOCAL_FORMAT).to_string()),
        },
    }
}

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// Posts the event to the configured webhook, if any. Returns before the
    /// request completes; errors are logged and swallowed.
    pub fn send(&self, event: ScanEvent) {
        let Some(url) = self.webhook_url.clone() else {
            return;
        };
        let client = self.client.clone();
        actix_web::rt::spawn(async move {
            let result = async {
                client
                    .post(&url)
                    .json(&event)
                    .send()
                    .await?
                    .error_for_status()
            }
            .await;
            if let Err(e) = result {
                warn!(error = %e, "Scan webhook delivery failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn scan_event_formats_local_timestamps() {
        let check_in = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(8, 5, 0)
            .unwrap();
        let record = AttendanceRecord {
            id_record: Uuid::new_v4(),
            id_user: Uuid::new_v4(),
            check_in_time: check_in,
            check_out_time: None,
            total_hours: None,
        };

        let event = scan_event(ScanAction::CheckIn, &record, None);
        assert_eq!(event.record.check_in_local, "14/03/2025 08:05");
        assert!(event.record.check_out_local.is_none());

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "check_in");
        assert!(json["record"]["check_out_time"].is_null());
    }
}
