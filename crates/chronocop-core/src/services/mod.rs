//! Core services that orchestrate domain rules over ports.

mod entry_service;

pub use entry_service::{EntryService, SLOT_OCCUPIED};
