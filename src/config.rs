use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    /// Civil timezone offset in hours east of UTC. La Paz is -4 (no DST).
    pub tz_offset_hours: i32,

    /// Workday length used for the overtime figure, in hours.
    pub workday_hours: i64,

    /// Optional webhook that receives scan events (fire-and-forget).
    pub scan_webhook_url: Option<String>,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),

            tz_offset_hours: env::var("TZ_OFFSET_HOURS")
                .unwrap_or_else(|_| "-4".to_string())
                .parse()
                .unwrap(),
            workday_hours: env::var("WORKDAY_HOURS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap(),

            scan_webhook_url: env::var("SCAN_WEBHOOK_URL").ok(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }

    /// The fixed civil timezone every timestamp and period boundary uses.
    pub fn civil_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.tz_offset_hours * 3600).expect("TZ_OFFSET_HOURS out of range")
    }
}
