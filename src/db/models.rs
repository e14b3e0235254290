use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One device's interaction state for one event. Created on first toggle,
/// never expires, never synced across devices.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub device_id: String,
    pub event_id: String,
    pub liked: bool,
    pub attending: bool,
    /// First-view flag, bumps the view counter exactly once per device.
    pub viewed: bool,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl InteractionRecord {
    pub fn blank(device_id: &str, event_id: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        InteractionRecord {
            device_id: device_id.to_string(),
            event_id: event_id.to_string(),
            liked: false,
            attending: false,
            viewed: false,
            created_at: now,
            updated_at: now,
        }
    }
}
