use serde::Serialize;
use uuid::Uuid;

/// The slice of the volunteer directory the scan notification carries.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VolunteerProfile {
    pub id_user: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
}
