use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

use crate::localtime::{local_date, local_hhmm, PCP_TRANSIT_MINUTES};
use crate::ports::{QueueRatios, TerminalConfig};

use super::flight::Flight;
use super::manifest::Manifest;
use super::splits::{build_tiers, effective_total_pax, CategoryCounts, SplitTiers};

/// One exportable arrivals line: display strings for the time columns
/// (already converted to the port's local civil time) plus the split
/// tiers. `scheduled` stays as the raw instant for ordering.
#[derive(Debug, Clone)]
pub struct ArrivalsRow {
    pub scheduled: DateTime<Utc>,
    pub code_iata: String,
    pub code_icao: String,
    pub origin: String,
    pub gate_stand: String,
    pub status: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub est_arrival: String,
    pub act_arrival: String,
    pub est_chocks: String,
    pub act_chocks: String,
    pub est_pcp: String,
    pub total_pax: Option<u32>,
    pub pcp_pax: Option<u32>,
    pub splits: SplitTiers,
}

pub fn build_row(
    flight: &Flight,
    manifest: Option<&Manifest>,
    historical: Option<&QueueRatios>,
    terminal: &TerminalConfig,
    tz: Tz,
) -> ArrivalsRow {
    let categories = manifest.map(CategoryCounts::from_manifest);
    let manifest_total = categories.map(|counts| counts.total());
    let total_pax = effective_total_pax(flight.live_pax, manifest_total);

    let pcp_pax = match (flight.live_pax, categories) {
        (Some(live), _) if live > 0 => Some(live.saturating_sub(flight.transit_pax)),
        (_, Some(counts)) => Some(counts.pcp_relevant()),
        (Some(zero), None) => Some(zero),
        (None, None) => None,
    };

    let splits = build_tiers(categories.as_ref(), total_pax, terminal, historical);

    let local = |instant: Option<DateTime<Utc>>| {
        instant.map(|i| local_hhmm(i, tz)).unwrap_or_default()
    };
    let pcp_instant = flight.best_chocks_estimate() + Duration::minutes(PCP_TRANSIT_MINUTES);

    let code = flight.code.to_string();
    ArrivalsRow {
        scheduled: flight.scheduled,
        code_iata: code.clone(),
        code_icao: code,
        origin: flight.origin.clone(),
        gate_stand: flight.gate_stand(),
        status: flight.status.clone(),
        scheduled_date: local_date(flight.scheduled, tz).to_string(),
        scheduled_time: local_hhmm(flight.scheduled, tz),
        est_arrival: local(flight.estimated),
        act_arrival: local(flight.actual),
        est_chocks: local(flight.estimated_chocks),
        act_chocks: local(flight.actual_chocks),
        est_pcp: local_hhmm(pcp_instant, tz),
        total_pax,
        pcp_pax,
        splits,
    }
}
