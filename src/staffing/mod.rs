pub mod domain;
pub mod ledger;
pub mod view;

pub use domain::{
    MovementAction, MovementRequest, ShiftBatch, StaffMovement, StaffShift, StaffingError,
};
pub use ledger::StaffingLedger;
pub use view::{SlotStaffing, StaffingDayView};
