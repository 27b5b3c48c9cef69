use crate::ports::{Queue, QueueRatios, TerminalConfig};

use super::manifest::{classify, Manifest, PassengerCategory};

/// Share of e-Gate-eligible EEA nationals expected to self-serve.
pub const EEA_EGATE_UPTAKE: f64 = 0.80;

/// Share of B5JSSK nationals expected to self-serve.
pub const B5JSSK_EGATE_UPTAKE: f64 = 0.60;

/// Deduplicated per-category headcounts for one manifest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCounts {
    pub egate_eligible: u32,
    pub eea_desk: u32,
    pub visa_national: u32,
    pub non_visa_national: u32,
    pub b5jssk: u32,
    pub in_transit: u32,
}

impl CategoryCounts {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut counts = Self::default();
        for record in manifest.deduplicated() {
            // Transit passengers never reach the control point, but they
            // still belong to the flight's total.
            if record.in_transit {
                counts.in_transit += 1;
                continue;
            }
            match classify(record) {
                PassengerCategory::EgateEligible => counts.egate_eligible += 1,
                PassengerCategory::EeaDesk => counts.eea_desk += 1,
                PassengerCategory::VisaNational => counts.visa_national += 1,
                PassengerCategory::NonVisaNational => counts.non_visa_national += 1,
                PassengerCategory::B5jssk => counts.b5jssk += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.egate_eligible
            + self.eea_desk
            + self.visa_national
            + self.non_visa_national
            + self.b5jssk
            + self.in_transit
    }

    pub fn pcp_relevant(&self) -> u32 {
        self.total() - self.in_transit
    }
}

/// Whole-passenger counts per immigration queue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueCounts {
    pub egates: u32,
    pub eea_desk: u32,
    pub non_eea_desk: u32,
    pub fast_track: u32,
}

impl QueueCounts {
    pub fn get(&self, queue: Queue) -> u32 {
        match queue {
            Queue::EGates => self.egates,
            Queue::EeaDesk => self.eea_desk,
            Queue::NonEeaDesk => self.non_eea_desk,
            Queue::FastTrack => self.fast_track,
        }
    }

    pub fn from_ratios(ratios: &QueueRatios, total: u32) -> Self {
        let apply = |share: f64| (f64::from(total) * share).round() as u32;
        Self {
            egates: apply(ratios.egates),
            eea_desk: apply(ratios.eea_desk),
            non_eea_desk: apply(ratios.non_eea_desk),
            fast_track: apply(ratios.fast_track),
        }
    }
}

/// Queue-level detail behind the aggregate API split. Only callers holding
/// `api:view` ever see these figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApiActualSplit {
    pub b5jssk_to_desk: f64,
    pub b5jssk_to_egates: f64,
    pub eea_machine_readable: f64,
    pub non_eea_non_visa: f64,
    pub non_eea_visa: f64,
    pub egates: f64,
}

/// The three provenance tiers plus the privileged sub-split for one
/// flight. `None` means "no data for this tier", which exports render as
/// empty fields rather than zeroes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SplitTiers {
    pub api: Option<QueueCounts>,
    pub api_actual: Option<ApiActualSplit>,
    pub historical: Option<QueueCounts>,
    pub terminal_average: Option<QueueCounts>,
}

fn egate_share(count: u32, uptake: f64) -> u32 {
    (f64::from(count) * uptake).round() as u32
}

/// Routes deduplicated category counts into queues. B5JSSK desk traffic
/// goes to the fast-track queue where the terminal has one, otherwise it
/// joins the EEA desk.
pub fn api_splits(counts: &CategoryCounts, terminal: &TerminalConfig) -> (QueueCounts, ApiActualSplit) {
    let eea_to_egates = egate_share(counts.egate_eligible, EEA_EGATE_UPTAKE);
    let eea_to_desk = counts.egate_eligible - eea_to_egates + counts.eea_desk;
    let b5jssk_to_egates = egate_share(counts.b5jssk, B5JSSK_EGATE_UPTAKE);
    let b5jssk_to_desk = counts.b5jssk - b5jssk_to_egates;

    let mut queues = QueueCounts {
        egates: eea_to_egates + b5jssk_to_egates,
        eea_desk: eea_to_desk,
        non_eea_desk: counts.visa_national + counts.non_visa_national,
        fast_track: 0,
    };
    if terminal.has_queue(Queue::FastTrack) {
        queues.fast_track = b5jssk_to_desk;
    } else {
        queues.eea_desk += b5jssk_to_desk;
    }

    let actual = ApiActualSplit {
        b5jssk_to_desk: f64::from(b5jssk_to_desk),
        b5jssk_to_egates: f64::from(b5jssk_to_egates),
        eea_machine_readable: f64::from(eea_to_desk),
        non_eea_non_visa: f64::from(counts.non_visa_national),
        non_eea_visa: f64::from(counts.visa_national),
        egates: f64::from(eea_to_egates),
    };

    (queues, actual)
}

/// Builds every tier available for a flight.
pub fn build_tiers(
    categories: Option<&CategoryCounts>,
    total_pax: Option<u32>,
    terminal: &TerminalConfig,
    historical: Option<&QueueRatios>,
) -> SplitTiers {
    let mut tiers = SplitTiers::default();

    if let Some(counts) = categories {
        let (queues, actual) = api_splits(counts, terminal);
        tiers.api = Some(queues);
        tiers.api_actual = Some(actual);
    }

    if let Some(total) = total_pax {
        tiers.terminal_average = Some(QueueCounts::from_ratios(&terminal.average_ratios, total));
        tiers.historical = historical.map(|ratios| QueueCounts::from_ratios(ratios, total));
    }

    tiers
}

/// A positive live count is authoritative; a zero or missing one yields to
/// the manifest-derived figure. Zero live with no manifest is a genuine
/// zero; nothing at all stays "no data".
pub fn effective_total_pax(live: Option<u32>, manifest: Option<u32>) -> Option<u32> {
    match (live, manifest) {
        (Some(live), _) if live > 0 => Some(live),
        (_, Some(manifest)) => Some(manifest),
        (Some(zero), None) => Some(zero),
        (None, None) => None,
    }
}
