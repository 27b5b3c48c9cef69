pub mod export;
pub mod flight;
pub mod manifest;
pub mod row;
pub mod splits;

pub use export::render_csv;
pub use flight::{Flight, FlightCode, FlightPayload};
pub use manifest::{Manifest, ManifestKey, ManifestPayload, PassengerRecord};
pub use row::ArrivalsRow;
pub use splits::SplitTiers;

/// Rejections raised while turning feed payloads into domain records.
#[derive(Debug, thiserror::Error)]
pub enum ArrivalsError {
    #[error("unrecognized flight code '{0}'")]
    BadFlightCode(String),
    #[error("invalid {field} timestamp '{value}'")]
    BadTimestamp { field: &'static str, value: String },
    #[error("invalid date '{0}'")]
    BadDate(String),
}
