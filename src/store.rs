use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::info;

use crate::arrivals::flight::{Flight, FlightKey, FlightPayload};
use crate::arrivals::manifest::{Manifest, ManifestKey, ManifestPayload};
use crate::arrivals::row::{build_row, ArrivalsRow};
use crate::arrivals::ArrivalsError;
use crate::localtime::{local_date, local_hour};
use crate::ports::{PortConfig, QueueRatios, TerminalConfig};
use crate::staffing::domain::{
    MovementRequest, ShiftBatch, StaffMovement, StaffShift, StaffingError,
};
use crate::staffing::ledger::StaffingLedger;
use crate::staffing::view::StaffingDayView;

type ShiftKey = (String, String, DateTime<Utc>);

#[derive(Debug, Default)]
struct StoreState {
    flights: BTreeMap<FlightKey, Flight>,
    /// One current manifest per flight key; a later submission replaces
    /// the earlier one wholesale.
    manifests: HashMap<ManifestKey, Manifest>,
    shifts: BTreeMap<ShiftKey, StaffShift>,
    movements: Vec<StaffMovement>,
    historical_splits: HashMap<(String, String), QueueRatios>,
}

/// Acknowledgement returned to the manifest feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReceipt {
    pub flight_code: String,
    pub passengers: u32,
}

/// Shared operational state for one port. All mutations complete inside a
/// single write guard, so readers observe each upsert fully or not at
/// all.
pub struct OpsStore {
    port: &'static PortConfig,
    state: RwLock<StoreState>,
    movement_seq: AtomicU64,
}

impl OpsStore {
    pub fn new(port: &'static PortConfig) -> Self {
        Self {
            port,
            state: RwLock::new(StoreState::default()),
            movement_seq: AtomicU64::new(1),
        }
    }

    pub fn port(&self) -> &'static PortConfig {
        self.port
    }

    pub fn terminal_config(&self, terminal: &str) -> &'static TerminalConfig {
        self.port.terminal(terminal)
    }

    pub fn submit_flight(&self, payload: FlightPayload) -> Result<String, ArrivalsError> {
        let flight = Flight::try_from(payload)?;
        let code = flight.code.to_string();
        let mut state = self.state.write().expect("store lock poisoned");
        state.flights.insert(flight.key(), flight);
        info!(flight = %code, "live arrival recorded");
        Ok(code)
    }

    pub fn submit_manifest(&self, payload: ManifestPayload) -> Result<ManifestReceipt, ArrivalsError> {
        let manifest = Manifest::try_from(payload)?;
        let receipt = ManifestReceipt {
            flight_code: manifest.flight_code.to_string(),
            passengers: manifest.total_pax(),
        };

        let mut state = self.state.write().expect("store lock poisoned");
        state.manifests.insert(manifest.key(), manifest);
        info!(
            flight = %receipt.flight_code,
            passengers = receipt.passengers,
            "manifest recorded"
        );
        Ok(receipt)
    }

    /// Atomic shift upsert keyed (port, terminal, shift start).
    pub fn record_shifts(&self, batch: ShiftBatch) -> usize {
        let mut state = self.state.write().expect("store lock poisoned");
        let recorded = batch.shifts.len();
        for shift in batch.shifts {
            let key = (
                shift.port.to_ascii_uppercase(),
                shift.terminal.to_ascii_uppercase(),
                shift.start,
            );
            state.shifts.insert(key, shift);
        }
        recorded
    }

    /// Validation happens before the ledger is touched: a rejected
    /// movement leaves no trace.
    pub fn apply_movement(
        &self,
        request: MovementRequest,
        created_by: &str,
    ) -> Result<StaffMovement, StaffingError> {
        let id = format!("mov-{:06}", self.movement_seq.fetch_add(1, Ordering::Relaxed));
        let movement = StaffMovement::from_request(id, request, created_by.to_string())?;

        let mut state = self.state.write().expect("store lock poisoned");
        state.movements.push(movement.clone());
        info!(movement = %movement.id, delta = movement.delta, "staff movement recorded");
        Ok(movement)
    }

    pub fn remove_movement(&self, id: &str) -> Result<(), StaffingError> {
        let mut state = self.state.write().expect("store lock poisoned");
        let index = state
            .movements
            .iter()
            .position(|movement| movement.id == id)
            .ok_or_else(|| StaffingError::MovementNotFound(id.to_string()))?;
        state.movements.remove(index);
        info!(movement = id, "staff movement removed");
        Ok(())
    }

    pub fn movements_for(&self, port: &str, terminal: &str) -> Vec<StaffMovement> {
        let state = self.state.read().expect("store lock poisoned");
        state
            .movements
            .iter()
            .filter(|movement| {
                movement.port.eq_ignore_ascii_case(port)
                    && movement.terminal.eq_ignore_ascii_case(terminal)
            })
            .cloned()
            .collect()
    }

    pub fn record_historical_split(&self, terminal: &str, flight_code: &str, ratios: QueueRatios) {
        let mut state = self.state.write().expect("store lock poisoned");
        state.historical_splits.insert(
            (
                terminal.to_ascii_uppercase(),
                flight_code.to_ascii_uppercase(),
            ),
            ratios,
        );
    }

    /// Rows for the local civil day containing `at`, filtered to
    /// scheduled hours in `[start_hour, end_hour)`, chronological.
    pub fn arrivals_rows(
        &self,
        at: DateTime<Utc>,
        terminal: &str,
        start_hour: u32,
        end_hour: u32,
    ) -> Vec<ArrivalsRow> {
        let tz = self.port.timezone;
        let terminal_cfg = self.port.terminal(terminal);
        let date = local_date(at, tz);

        let state = self.state.read().expect("store lock poisoned");
        state
            .flights
            .values()
            .filter(|flight| flight.terminal.eq_ignore_ascii_case(terminal))
            .filter(|flight| local_date(flight.scheduled, tz) == date)
            .filter(|flight| {
                let hour = local_hour(flight.scheduled, tz);
                hour >= start_hour && hour < end_hour
            })
            .map(|flight| {
                let manifest = state.manifests.get(&flight.manifest_key());
                let historical = state.historical_splits.get(&(
                    flight.terminal.to_ascii_uppercase(),
                    flight.code.to_string(),
                ));
                build_row(flight, manifest, historical, terminal_cfg, tz)
            })
            .collect()
    }

    pub fn staffing_day(&self, port: &str, terminal: &str, date: NaiveDate) -> StaffingDayView {
        let tz = self.port.timezone;
        let state = self.state.read().expect("store lock poisoned");

        let shifts: Vec<StaffShift> = state
            .shifts
            .values()
            .filter(|shift| {
                shift.port.eq_ignore_ascii_case(port)
                    && shift.terminal.eq_ignore_ascii_case(terminal)
            })
            .cloned()
            .collect();
        let movements: Vec<StaffMovement> = state
            .movements
            .iter()
            .filter(|movement| {
                movement.port.eq_ignore_ascii_case(port)
                    && movement.terminal.eq_ignore_ascii_case(terminal)
            })
            .cloned()
            .collect();

        let ledger = StaffingLedger::new(shifts, movements);
        StaffingDayView {
            port: port.to_string(),
            terminal: terminal.to_string(),
            date,
            slots: ledger.day_view(date, tz),
        }
    }

    /// Drops every record. Scenario isolation lives here rather than in
    /// any process-wide state.
    pub fn clear(&self) {
        let mut state = self.state.write().expect("store lock poisoned");
        *state = StoreState::default();
    }

    /// Drops records belonging to one wire port code, leaving the rest.
    pub fn clear_port(&self, port: &str) {
        let mut state = self.state.write().expect("store lock poisoned");
        state
            .flights
            .retain(|_, flight| !flight.port.eq_ignore_ascii_case(port));
        state
            .manifests
            .retain(|_, manifest| !manifest.arrival_port.eq_ignore_ascii_case(port));
        state
            .shifts
            .retain(|_, shift| !shift.port.eq_ignore_ascii_case(port));
        state
            .movements
            .retain(|movement| !movement.port.eq_ignore_ascii_case(port));
    }
}
