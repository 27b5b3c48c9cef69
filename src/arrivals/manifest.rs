use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;

use super::flight::FlightCode;
use super::ArrivalsError;

/// One advance-passenger-information manifest as delivered by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestPayload {
    #[serde(rename = "EventCode", default)]
    pub event_code: String,
    #[serde(rename = "DeparturePortCode", default)]
    pub departure_port: String,
    #[serde(rename = "VoyageNumberTrailingLetter", default)]
    pub voyage_suffix: String,
    #[serde(rename = "ArrivalPortCode", default)]
    pub arrival_port: String,
    #[serde(rename = "DeparturePortCountryCode", default)]
    pub departure_country: String,
    #[serde(rename = "VoyageNumber")]
    pub voyage_number: String,
    #[serde(rename = "VoyageKey", default)]
    pub voyage_key: String,
    #[serde(rename = "ScheduledDateOfDeparture", default)]
    pub scheduled_departure_date: String,
    #[serde(rename = "ScheduledDateOfArrival")]
    pub scheduled_arrival_date: String,
    #[serde(rename = "CarrierType", default)]
    pub carrier_type: String,
    #[serde(rename = "CarrierCode")]
    pub carrier_code: String,
    #[serde(rename = "ScheduledTimeOfDeparture", default)]
    pub scheduled_departure_time: String,
    #[serde(rename = "ScheduledTimeOfArrival", default)]
    pub scheduled_arrival_time: String,
    #[serde(rename = "FileId", default)]
    pub file_id: String,
    #[serde(rename = "PassengerList", default)]
    pub passengers: Vec<PassengerPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerPayload {
    #[serde(rename = "DocumentIssuingCountryCode", default)]
    pub document_issuing_country: String,
    #[serde(rename = "PersonType", default)]
    pub person_type: String,
    #[serde(rename = "DocumentLevel", default)]
    pub document_level: String,
    #[serde(rename = "Age", default)]
    pub age: String,
    #[serde(rename = "DisembarkationPortCode", default)]
    pub disembarkation_port: String,
    #[serde(rename = "InTransitFlag", default)]
    pub in_transit_flag: String,
    #[serde(rename = "DisembarkationPortCountryCode", default)]
    pub disembarkation_country: String,
    #[serde(rename = "NationalityCountryEEAFlag", default)]
    pub eea_flag: String,
    #[serde(rename = "PassengerIdentifier", default)]
    pub identifier: String,
    #[serde(rename = "DocumentType", default)]
    pub document_type: String,
    #[serde(rename = "PoavKey", default)]
    pub poav_key: String,
    #[serde(rename = "NationalityCountryCode", default)]
    pub nationality: String,
}

/// A manifest entry reduced to the attributes routing cares about.
#[derive(Debug, Clone)]
pub struct PassengerRecord {
    pub nationality: String,
    pub eea_national: bool,
    pub document_type: Option<String>,
    pub age: Option<u8>,
    pub in_transit: bool,
    pub identifier: Option<String>,
    pub sequence_key: String,
}

impl From<PassengerPayload> for PassengerRecord {
    fn from(payload: PassengerPayload) -> Self {
        let document_type = Some(payload.document_type.trim().to_string())
            .filter(|document| !document.is_empty());
        let identifier = Some(payload.identifier.trim().to_string()).filter(|id| !id.is_empty());

        Self {
            nationality: payload.nationality.trim().to_ascii_uppercase(),
            eea_national: payload.eea_flag.trim().eq_ignore_ascii_case("eea"),
            document_type,
            age: payload.age.trim().parse().ok(),
            in_transit: payload.in_transit_flag.trim().eq_ignore_ascii_case("y"),
            identifier,
            sequence_key: payload.poav_key,
        }
    }
}

/// Immigration channel category for a single arriving passenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassengerCategory {
    EgateEligible,
    EeaDesk,
    VisaNational,
    NonVisaNational,
    B5jssk,
}

/// Minimum age for self-service e-Gate processing.
pub const EGATE_MIN_AGE: u8 = 12;

const B5JSSK_NATIONALITIES: &[&str] = &["AUS", "CAN", "JPN", "KOR", "NZL", "SGP", "USA"];

const VISA_NATIONALITIES: &[&str] = &[
    "AFG", "CHN", "COD", "ERI", "IND", "IRN", "IRQ", "NGA", "PAK", "RUS", "SOM", "SYR", "TUR",
    "ZWE",
];

fn is_passport(document_type: &str) -> bool {
    matches!(
        document_type.trim().to_ascii_lowercase().as_str(),
        "p" | "passport"
    )
}

/// Classifies one record. The EEA nationality flag is the primary signal:
/// a missing or unrecognized document type keeps an EEA national in the
/// e-Gates bucket rather than dropping the record. Document type only
/// decides B5JSSK eligibility for non-EEA nationals.
pub fn classify(record: &PassengerRecord) -> PassengerCategory {
    if record.eea_national {
        if record.age.map_or(true, |age| age >= EGATE_MIN_AGE) {
            PassengerCategory::EgateEligible
        } else {
            PassengerCategory::EeaDesk
        }
    } else if B5JSSK_NATIONALITIES.contains(&record.nationality.as_str())
        && record.document_type.as_deref().map_or(false, is_passport)
    {
        PassengerCategory::B5jssk
    } else if VISA_NATIONALITIES.contains(&record.nationality.as_str()) {
        PassengerCategory::VisaNational
    } else {
        PassengerCategory::NonVisaNational
    }
}

/// Collapses repeated entries sharing a non-empty identifier, first
/// occurrence winning. Records without an identifier always count
/// independently.
pub fn deduplicate(records: &[PassengerRecord]) -> Vec<&PassengerRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|record| match record.identifier.as_deref() {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestKey {
    pub flight_code: String,
    pub arrival_date: NaiveDate,
}

/// The authoritative passenger set for one flight. A later manifest for
/// the same key supersedes this one wholesale.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub event_code: String,
    pub flight_code: FlightCode,
    pub origin: String,
    pub arrival_port: String,
    pub arrival_date: NaiveDate,
    pub passengers: Vec<PassengerRecord>,
}

impl Manifest {
    pub fn key(&self) -> ManifestKey {
        ManifestKey {
            flight_code: self.flight_code.to_string(),
            arrival_date: self.arrival_date,
        }
    }

    pub fn deduplicated(&self) -> Vec<&PassengerRecord> {
        deduplicate(&self.passengers)
    }

    /// Deduplicated headcount, transit passengers included.
    pub fn total_pax(&self) -> u32 {
        self.deduplicated().len() as u32
    }
}

impl TryFrom<ManifestPayload> for Manifest {
    type Error = ArrivalsError;

    fn try_from(payload: ManifestPayload) -> Result<Self, Self::Error> {
        let flight_code = FlightCode::from_parts(
            &payload.carrier_code,
            &payload.voyage_number,
            &payload.voyage_suffix,
        )?;
        let arrival_date = NaiveDate::parse_from_str(payload.scheduled_arrival_date.trim(), "%Y-%m-%d")
            .map_err(|_| ArrivalsError::BadDate(payload.scheduled_arrival_date.clone()))?;

        Ok(Self {
            event_code: payload.event_code,
            flight_code,
            origin: payload.departure_port,
            arrival_port: payload.arrival_port,
            arrival_date,
            passengers: payload.passengers.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eea_record(document_type: &str) -> PassengerRecord {
        PassengerRecord {
            nationality: "GBR".to_string(),
            eea_national: true,
            document_type: Some(document_type.to_string()).filter(|d| !d.is_empty()),
            age: Some(30),
            in_transit: false,
            identifier: None,
            sequence_key: "1".to_string(),
        }
    }

    fn foreign_record(nationality: &str, document_type: &str) -> PassengerRecord {
        PassengerRecord {
            nationality: nationality.to_string(),
            eea_national: false,
            document_type: Some(document_type.to_string()).filter(|d| !d.is_empty()),
            age: Some(30),
            in_transit: false,
            identifier: None,
            sequence_key: "2".to_string(),
        }
    }

    #[test]
    fn eea_nationals_stay_egate_eligible_without_a_document_type() {
        assert_eq!(
            classify(&eea_record("")),
            PassengerCategory::EgateEligible
        );
        assert_eq!(
            classify(&eea_record("passport")),
            PassengerCategory::EgateEligible
        );
    }

    #[test]
    fn young_eea_nationals_route_to_the_desk() {
        let mut record = eea_record("Passport");
        record.age = Some(9);
        assert_eq!(classify(&record), PassengerCategory::EeaDesk);
    }

    #[test]
    fn b5jssk_requires_a_passport_indicator() {
        assert_eq!(
            classify(&foreign_record("AUS", "P")),
            PassengerCategory::B5jssk
        );
        assert_eq!(
            classify(&foreign_record("AUS", "I")),
            PassengerCategory::NonVisaNational
        );
    }

    #[test]
    fn non_eea_nationals_split_by_visa_requirement() {
        assert_eq!(
            classify(&foreign_record("ZWE", "P")),
            PassengerCategory::VisaNational
        );
        assert_eq!(
            classify(&foreign_record("MRU", "P")),
            PassengerCategory::NonVisaNational
        );
    }

    #[test]
    fn deduplication_keeps_the_first_record_per_identifier() {
        let mut first = eea_record("Passport");
        first.identifier = Some("id1".to_string());
        let mut second = foreign_record("ZWE", "P");
        second.identifier = Some("id1".to_string());
        let third = eea_record("Passport");

        let records = vec![first, second, third.clone(), third];
        let kept = deduplicate(&records);

        assert_eq!(kept.len(), 3);
        assert!(kept[0].eea_national, "first occurrence wins the identifier");
    }

    #[test]
    fn payload_conversion_normalizes_blank_fields() {
        let payload = PassengerPayload {
            eea_flag: "EEA".to_string(),
            identifier: "  ".to_string(),
            document_type: String::new(),
            age: "not-a-number".to_string(),
            nationality: "gbr".to_string(),
            ..PassengerPayload::default()
        };

        let record = PassengerRecord::from(payload);
        assert!(record.eea_national);
        assert_eq!(record.identifier, None);
        assert_eq!(record.document_type, None);
        assert_eq!(record.age, None);
        assert_eq!(record.nationality, "GBR");
    }
}
