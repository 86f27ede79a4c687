use serde::Serialize;
use uuid::Uuid;

/// RFID card. `name` is the token printed by the reader; `id_user` is the
/// linked volunteer, if the card has been assigned (1:1 both ways).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub id_user: Option<Uuid>,
}
