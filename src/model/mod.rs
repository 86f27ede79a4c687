pub mod attendance;
pub mod card;
pub mod volunteer;
