use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One 15-minute reading of the staffing ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SlotStaffing {
    pub slot_start: DateTime<Utc>,
    pub local_time: String,
    pub available: i32,
    pub deployed: u32,
    pub movements: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffingDayView {
    pub port: String,
    pub terminal: String,
    pub date: NaiveDate,
    pub slots: Vec<SlotStaffing>,
}

/// Movement as shown on the movements tab: reason and detail collapsed
/// into one display string.
#[derive(Debug, Clone, Serialize)]
pub struct MovementView {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub delta: i32,
    pub reason: String,
    pub created_by: String,
}

impl super::domain::StaffMovement {
    pub fn to_view(&self) -> MovementView {
        MovementView {
            id: self.id.clone(),
            start: self.start,
            end: self.end,
            delta: self.delta,
            reason: self.display_reason(),
            created_by: self.created_by.clone(),
        }
    }
}
