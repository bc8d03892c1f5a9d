//! Time entry repository trait definition.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use super::RepositoryError;
use crate::domain::{NewTimeEntry, TimeEntry};

/// Repository for time entry persistence.
///
/// # Design Rules
///
/// - No `sqlx` types in signatures
/// - Implementations derive `end_time` from the entry's start
/// - A second entry for an occupied (date, start) slot fails with `AlreadyExists`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Entries with `start <= date <= end`, ordered by date then start time.
    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>, RepositoryError>;

    /// Get an entry by id. Fails with `NotFound` if it does not exist.
    async fn get(&self, id: i64) -> Result<TimeEntry, RepositoryError>;

    /// The entry occupying a slot, if any.
    async fn find_by_slot(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<Option<TimeEntry>, RepositoryError>;

    /// Insert a new entry and return it with its id and timestamps.
    async fn insert(&self, entry: &NewTimeEntry) -> Result<TimeEntry, RepositoryError>;

    /// Replace every user-editable field of an existing entry.
    async fn update(&self, id: i64, entry: &NewTimeEntry) -> Result<TimeEntry, RepositoryError>;

    /// Delete an entry. Fails with `NotFound` if it does not exist.
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}
