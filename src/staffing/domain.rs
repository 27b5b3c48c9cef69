use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Rejections raised by staffing-ledger mutations.
#[derive(Debug, thiserror::Error)]
pub enum StaffingError {
    #[error("invalid staff movement: {0}")]
    InvalidMovement(&'static str),
    #[error("staff movement {0} not found")]
    MovementNotFound(String),
}

/// A scheduled headcount effective from `start` until superseded by the
/// next later shift for the same port/terminal. Shifts never expire on
/// their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffShift {
    #[serde(rename = "port_code")]
    pub port: String,
    pub terminal: String,
    #[serde(deserialize_with = "stringly_number")]
    pub staff: u32,
    #[serde(rename = "shift_start")]
    pub start: DateTime<Utc>,
}

/// Planning tools post shift batches as one atomic upsert.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftBatch {
    pub shifts: Vec<StaffShift>,
}

/// The planning UI submits headcounts as strings; accept both spellings.
fn stringly_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementAction {
    Add,
    Remove,
}

/// An ad-hoc staffing adjustment requested from the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct MovementRequest {
    pub port: String,
    pub terminal: String,
    pub action: MovementAction,
    pub staff: u32,
    pub window_start: DateTime<Utc>,
    pub minutes: i64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// A validated movement: a signed delta over a half-open window.
#[derive(Debug, Clone, Serialize)]
pub struct StaffMovement {
    pub id: String,
    pub port: String,
    pub terminal: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub delta: i32,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_by: String,
}

impl StaffMovement {
    pub fn from_request(
        id: String,
        request: MovementRequest,
        created_by: String,
    ) -> Result<Self, StaffingError> {
        if request.staff == 0 {
            return Err(StaffingError::InvalidMovement(
                "staff delta must be positive",
            ));
        }
        if request.minutes <= 0 {
            return Err(StaffingError::InvalidMovement(
                "window duration must be positive",
            ));
        }

        let delta = match request.action {
            MovementAction::Add => request.staff as i32,
            MovementAction::Remove => -(request.staff as i32),
        };
        let reason = request
            .reason
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| "Other".to_string());

        Ok(Self {
            id,
            port: request.port,
            terminal: request.terminal,
            start: request.window_start,
            end: request.window_start + Duration::minutes(request.minutes),
            delta,
            reason,
            detail: request.detail.filter(|detail| !detail.trim().is_empty()),
            created_by,
        })
    }

    /// `"Case working: extra case work"` when detail is present.
    pub fn display_reason(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}: {}", self.reason, detail),
            None => self.reason.clone(),
        }
    }

    /// Windows are end-exclusive, as are slots.
    pub fn overlaps(&self, slot_start: DateTime<Utc>, slot_end: DateTime<Utc>) -> bool {
        self.start < slot_end && self.end > slot_start
    }
}
