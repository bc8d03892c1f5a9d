//! Domain types for chronocop.
//!
//! These types are pure data with validation; no storage or process details.

mod entry;
mod mode;
mod window;

pub use entry::{
    ActivityType, DATE_FORMAT, EnergyImpact, EntryDraft, MAX_ACTIVITY_LEN, NewTimeEntry,
    SLOT_MINUTES, TIME_FORMAT, TimeEntry, parse_slot_start, slot_end, week_bounds,
};
pub use mode::{AppMode, MODE_ENV_VAR};
pub use window::{Navigation, WindowSpec, classify_navigation};
