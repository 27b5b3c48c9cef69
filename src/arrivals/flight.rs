use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

use super::manifest::ManifestKey;
use super::ArrivalsError;

/// Carrier designator plus voyage number in canonical form. The live feed
/// says `TS123` where the manifest feed says carrier `TS` voyage `0123`;
/// both normalize here so the two feeds join on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlightCode {
    carrier: String,
    voyage: u16,
    suffix: Option<char>,
}

impl FlightCode {
    pub fn parse(raw: &str) -> Result<Self, ArrivalsError> {
        let trimmed = raw.trim().to_ascii_uppercase();
        let bad = || ArrivalsError::BadFlightCode(raw.to_string());

        let mut tail = trimmed.as_str();
        let mut suffix = None;
        if let Some(last) = tail.chars().last() {
            if last.is_ascii_alphabetic() && tail.len() > 1 {
                let head = &tail[..tail.len() - 1];
                if head.chars().last().is_some_and(|c| c.is_ascii_digit()) {
                    suffix = Some(last);
                    tail = head;
                }
            }
        }

        let digits_at = tail
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .map(|(index, _)| index)
            .last()
            .ok_or_else(bad)?;
        let (carrier, digits) = tail.split_at(digits_at);
        if carrier.len() < 2 || carrier.len() > 3 || digits.len() > 4 {
            return Err(bad());
        }

        let voyage = digits.parse().map_err(|_| bad())?;
        Ok(Self {
            carrier: carrier.to_string(),
            voyage,
            suffix,
        })
    }

    pub fn from_parts(carrier: &str, voyage: &str, suffix: &str) -> Result<Self, ArrivalsError> {
        let carrier = carrier.trim().to_ascii_uppercase();
        let digits = voyage.trim();
        if carrier.len() < 2 || carrier.len() > 3 || digits.is_empty() {
            return Err(ArrivalsError::BadFlightCode(format!("{carrier}{digits}")));
        }

        let voyage = digits
            .parse()
            .map_err(|_| ArrivalsError::BadFlightCode(format!("{carrier}{digits}")))?;
        Ok(Self {
            carrier,
            voyage,
            suffix: suffix.trim().chars().next().map(|c| c.to_ascii_uppercase()),
        })
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }
}

impl fmt::Display for FlightCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.carrier, self.voyage)?;
        if let Some(suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}

/// One flight as delivered by the live arrivals feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightPayload {
    #[serde(rename = "Operator", default)]
    pub operator: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "EstDT", default)]
    pub estimated: String,
    #[serde(rename = "ActDT", default)]
    pub actual: String,
    #[serde(rename = "EstChoxDT", default)]
    pub estimated_chocks: String,
    #[serde(rename = "ActChoxDT", default)]
    pub actual_chocks: String,
    #[serde(rename = "Gate", default)]
    pub gate: String,
    #[serde(rename = "Stand", default)]
    pub stand: String,
    #[serde(rename = "MaxPax", default)]
    pub max_pax: Option<u32>,
    #[serde(rename = "ActPax", default)]
    pub act_pax: Option<u32>,
    #[serde(rename = "TranPax", default)]
    pub tran_pax: Option<u32>,
    #[serde(rename = "RunwayID", default)]
    pub runway_id: String,
    #[serde(rename = "FlightID", default)]
    pub flight_id: Option<u64>,
    #[serde(rename = "BaggageReclaimId", default)]
    pub baggage_reclaim_id: String,
    #[serde(rename = "AirportID", default)]
    pub airport_id: String,
    #[serde(rename = "Terminal")]
    pub terminal: String,
    #[serde(rename = "ICAO", default)]
    pub icao: String,
    #[serde(rename = "IATA", default)]
    pub iata: String,
    #[serde(rename = "Origin", default)]
    pub origin: String,
    #[serde(rename = "SchDT")]
    pub scheduled: String,
}

/// Key ordering groups a terminal's flights chronologically, which is the
/// order exports present them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightKey {
    pub terminal: String,
    pub scheduled: DateTime<Utc>,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct Flight {
    pub code: FlightCode,
    pub operator: Option<String>,
    pub port: String,
    pub terminal: String,
    pub origin: String,
    pub status: String,
    pub gate: Option<String>,
    pub stand: Option<String>,
    pub scheduled: DateTime<Utc>,
    pub estimated: Option<DateTime<Utc>>,
    pub actual: Option<DateTime<Utc>>,
    pub estimated_chocks: Option<DateTime<Utc>>,
    pub actual_chocks: Option<DateTime<Utc>>,
    pub capacity: Option<u32>,
    /// Live headcount from the feed. `Some(0)` means the feed reported
    /// zero; `None` means the feed said nothing. The distinction drives
    /// manifest fallback.
    pub live_pax: Option<u32>,
    pub transit_pax: u32,
    pub runway: Option<String>,
    pub baggage_reclaim: Option<String>,
}

impl Flight {
    pub fn key(&self) -> FlightKey {
        FlightKey {
            terminal: self.terminal.clone(),
            scheduled: self.scheduled,
            code: self.code.to_string(),
        }
    }

    pub fn manifest_key(&self) -> ManifestKey {
        ManifestKey {
            flight_code: self.code.to_string(),
            arrival_date: self.scheduled.date_naive(),
        }
    }

    pub fn gate_stand(&self) -> String {
        match (self.gate.as_deref(), self.stand.as_deref()) {
            (Some(gate), Some(stand)) => format!("{gate}/{stand}"),
            (Some(gate), None) => gate.to_string(),
            (None, Some(stand)) => format!("/{stand}"),
            (None, None) => String::new(),
        }
    }

    /// Most trustworthy on-chocks instant available right now.
    pub fn best_chocks_estimate(&self) -> DateTime<Utc> {
        self.actual_chocks
            .or(self.estimated_chocks)
            .or(self.actual)
            .or(self.estimated)
            .unwrap_or(self.scheduled)
    }
}

impl TryFrom<FlightPayload> for Flight {
    type Error = ArrivalsError;

    fn try_from(payload: FlightPayload) -> Result<Self, Self::Error> {
        let code_source = if payload.iata.trim().is_empty() {
            &payload.icao
        } else {
            &payload.iata
        };
        let code = FlightCode::parse(code_source)?;

        let scheduled = parse_instant("SchDT", &payload.scheduled)?
            .ok_or_else(|| ArrivalsError::BadTimestamp {
                field: "SchDT",
                value: payload.scheduled.clone(),
            })?;

        Ok(Self {
            code,
            operator: non_empty(payload.operator),
            port: payload.airport_id.trim().to_ascii_uppercase(),
            terminal: payload.terminal.trim().to_string(),
            origin: payload.origin.trim().to_ascii_uppercase(),
            status: normalize_status(&payload.status),
            gate: non_empty(payload.gate),
            stand: non_empty(payload.stand),
            scheduled,
            estimated: parse_instant("EstDT", &payload.estimated)?,
            actual: parse_instant("ActDT", &payload.actual)?,
            estimated_chocks: parse_instant("EstChoxDT", &payload.estimated_chocks)?,
            actual_chocks: parse_instant("ActChoxDT", &payload.actual_chocks)?,
            capacity: payload.max_pax,
            live_pax: payload.act_pax,
            transit_pax: payload.tran_pax.unwrap_or(0),
            runway: non_empty(payload.runway_id),
            baggage_reclaim: non_empty(payload.baggage_reclaim_id),
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_instant(
    field: &'static str,
    raw: &str,
) -> Result<Option<DateTime<Utc>>, ArrivalsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|instant| Some(instant.with_timezone(&Utc)))
        .map_err(|_| ArrivalsError::BadTimestamp {
            field,
            value: raw.to_string(),
        })
}

/// Feed status values arrive in several spellings; displays use one.
pub(crate) fn normalize_status(raw: &str) -> String {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on chox" | "on chocks" => "On Chocks".to_string(),
        "landed" => "Landed".to_string(),
        "airborne" => "Airborne".to_string(),
        "expected" | "estimated" => "Expected".to_string(),
        "delayed" => "Delayed".to_string(),
        "cancelled" | "canceled" => "Cancelled".to_string(),
        "diverted" => "Diverted".to_string(),
        "" | "scheduled" | "forecast" => "Scheduled".to_string(),
        _ => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_normalize_to_a_four_digit_voyage() {
        assert_eq!(FlightCode::parse("TS123").expect("parses").to_string(), "TS0123");
        assert_eq!(FlightCode::parse("ba7").expect("parses").to_string(), "BA0007");
        assert_eq!(
            FlightCode::parse("EZY8844A").expect("parses").to_string(),
            "EZY8844A"
        );
    }

    #[test]
    fn manifest_parts_join_with_the_live_feed_code() {
        let from_feed = FlightCode::parse("TS123").expect("parses");
        let from_manifest = FlightCode::from_parts("TS", "0123", "").expect("parses");
        assert_eq!(from_feed, from_manifest);
    }

    #[test]
    fn garbage_codes_are_rejected() {
        assert!(matches!(
            FlightCode::parse("no-digits"),
            Err(ArrivalsError::BadFlightCode(_))
        ));
        assert!(matches!(
            FlightCode::parse(""),
            Err(ArrivalsError::BadFlightCode(_))
        ));
    }

    #[test]
    fn feed_statuses_normalize_for_display() {
        assert_eq!(normalize_status("On Chox"), "On Chocks");
        assert_eq!(normalize_status("LANDED"), "Landed");
        assert_eq!(normalize_status(""), "Scheduled");
        assert_eq!(normalize_status("Taxiing"), "Taxiing");
    }

    #[test]
    fn payload_conversion_distinguishes_missing_from_zero_pax() {
        let payload = FlightPayload {
            terminal: "T1".to_string(),
            iata: "TS123".to_string(),
            scheduled: "2025-07-09T00:55:00Z".to_string(),
            act_pax: Some(0),
            ..FlightPayload::default()
        };
        let flight = Flight::try_from(payload.clone()).expect("converts");
        assert_eq!(flight.live_pax, Some(0));

        let flight = Flight::try_from(FlightPayload {
            act_pax: None,
            ..payload
        })
        .expect("converts");
        assert_eq!(flight.live_pax, None);
    }

    #[test]
    fn missing_schedule_is_rejected() {
        let payload = FlightPayload {
            terminal: "T1".to_string(),
            iata: "TS123".to_string(),
            scheduled: String::new(),
            ..FlightPayload::default()
        };
        assert!(matches!(
            Flight::try_from(payload),
            Err(ArrivalsError::BadTimestamp { field: "SchDT", .. })
        ));
    }

    #[test]
    fn gate_and_stand_render_joined() {
        let payload = FlightPayload {
            terminal: "T1".to_string(),
            iata: "TS123".to_string(),
            scheduled: "2025-07-09T00:55:00Z".to_string(),
            gate: "46".to_string(),
            stand: "44R".to_string(),
            ..FlightPayload::default()
        };
        let flight = Flight::try_from(payload).expect("converts");
        assert_eq!(flight.gate_stand(), "46/44R");
    }
}
