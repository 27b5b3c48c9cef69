use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::localtime::{day_slots, local_hhmm, SLOT_MINUTES};

use super::domain::{StaffMovement, StaffShift};
use super::view::SlotStaffing;

/// A pure projection over one port/terminal's shifts and movements. Every
/// read derives from the records handed in; the ledger keeps no counters
/// of its own.
#[derive(Debug, Default)]
pub struct StaffingLedger {
    shifts: Vec<StaffShift>,
    movements: Vec<StaffMovement>,
}

impl StaffingLedger {
    pub fn new(mut shifts: Vec<StaffShift>, movements: Vec<StaffMovement>) -> Self {
        shifts.sort_by_key(|shift| shift.start);
        Self { shifts, movements }
    }

    /// Base headcount at an instant: the most recent shift at or before
    /// it. Shifts persist until overridden, so a shift recorded at the
    /// start of one month still answers for the next.
    pub fn base_at(&self, instant: DateTime<Utc>) -> u32 {
        self.shifts
            .iter()
            .rev()
            .find(|shift| shift.start <= instant)
            .map(|shift| shift.staff)
            .unwrap_or(0)
    }

    /// Net movement delta overlapping the slot starting at `slot_start`.
    pub fn movements_at(&self, slot_start: DateTime<Utc>) -> i32 {
        let slot_end = slot_start + Duration::minutes(SLOT_MINUTES);
        self.movements
            .iter()
            .filter(|movement| movement.overlaps(slot_start, slot_end))
            .map(|movement| movement.delta)
            .sum()
    }

    /// Ledger total for the slot; may go negative when removals outrun
    /// the base shift.
    pub fn available_at(&self, slot_start: DateTime<Utc>) -> i32 {
        self.base_at(slot_start) as i32 + self.movements_at(slot_start)
    }

    /// Usable headcount: the ledger total clamped at zero.
    pub fn deployed_at(&self, slot_start: DateTime<Utc>) -> u32 {
        self.available_at(slot_start).max(0) as u32
    }

    /// Projects one local civil day into 15-minute slot readings.
    pub fn day_view(&self, date: NaiveDate, tz: Tz) -> Vec<SlotStaffing> {
        day_slots(date, tz)
            .into_iter()
            .map(|slot_start| SlotStaffing {
                slot_start,
                local_time: local_hhmm(slot_start, tz),
                available: self.available_at(slot_start),
                deployed: self.deployed_at(slot_start),
                movements: self.movements_at(slot_start),
            })
            .collect()
    }
}
