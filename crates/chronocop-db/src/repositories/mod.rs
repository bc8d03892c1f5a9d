//! `SQLite` repository implementations.

mod row_mappers;
mod sqlite_time_entry_repository;

pub use sqlite_time_entry_repository::SqliteTimeEntryRepository;
