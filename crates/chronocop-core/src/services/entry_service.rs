//! Entry service - calendar CRUD with slot rules.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DATE_FORMAT, EntryDraft, NewTimeEntry, TimeEntry, week_bounds};
use crate::ports::{CoreError, RepositoryError, TimeEntryRepository};

/// Message returned when a slot already holds an entry.
pub const SLOT_OCCUPIED: &str = "Time slot already occupied";

const INVALID_WEEK_START: &str = "Invalid date format. Use YYYY-MM-DD";

/// Service for listing and editing time entries.
pub struct EntryService {
    repo: Arc<dyn TimeEntryRepository>,
}

impl EntryService {
    pub fn new(repo: Arc<dyn TimeEntryRepository>) -> Self {
        Self { repo }
    }

    /// Entries for the 7-day window starting at `week_start` (`YYYY-MM-DD`),
    /// or for the current week when none is given.
    pub async fn list_week(
        &self,
        week_start: Option<&str>,
        today: NaiveDate,
    ) -> Result<Vec<TimeEntry>, CoreError> {
        let invalid = || CoreError::Validation(INVALID_WEEK_START.to_string());
        let start = week_start
            .filter(|s| !s.is_empty())
            .map(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| invalid()))
            .transpose()?;
        let (start, end) = week_bounds(start, today).ok_or_else(invalid)?;
        debug!(%start, %end, "Listing week entries");
        Ok(self.repo.list_between(start, end).await?)
    }

    /// Validate and store a new entry.
    pub async fn create(&self, draft: &EntryDraft) -> Result<TimeEntry, CoreError> {
        let entry = draft.validate()?;
        self.ensure_slot_free(&entry, None).await?;
        self.repo.insert(&entry).await.map_err(map_slot_conflict)
    }

    /// Validate and replace an existing entry.
    pub async fn update(&self, id: i64, draft: &EntryDraft) -> Result<TimeEntry, CoreError> {
        self.repo.get(id).await?;
        let entry = draft.validate()?;
        self.ensure_slot_free(&entry, Some(id)).await?;
        self.repo.update(id, &entry).await.map_err(map_slot_conflict)
    }

    pub async fn delete(&self, id: i64) -> Result<(), CoreError> {
        Ok(self.repo.delete(id).await?)
    }

    async fn ensure_slot_free(
        &self,
        entry: &NewTimeEntry,
        except: Option<i64>,
    ) -> Result<(), CoreError> {
        match self.repo.find_by_slot(entry.date, entry.start_time).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(CoreError::Conflict(SLOT_OCCUPIED.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// A unique-constraint hit means another writer took the slot between our
/// check and the write.
fn map_slot_conflict(err: RepositoryError) -> CoreError {
    match err {
        RepositoryError::AlreadyExists(_) => CoreError::Conflict(SLOT_OCCUPIED.to_string()),
        other => other.into(),
    }
}
