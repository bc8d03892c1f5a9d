//! `SQLite` implementation of the `TimeEntryRepository` trait.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;

use chronocop_core::{NewTimeEntry, RepositoryError, TimeEntry, TimeEntryRepository};

use super::row_mappers::{
    ENTRY_SELECT_COLUMNS, format_date, format_time, format_timestamp, row_to_entry,
};

/// `SQLite` implementation of the `TimeEntryRepository` trait.
pub struct SqliteTimeEntryRepository {
    pool: SqlitePool,
}

impl SqliteTimeEntryRepository {
    /// Create a new `SQLite` time entry repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Map a write error, surfacing the (date, start_time) unique constraint.
fn map_write_error(err: sqlx::Error, entry: &NewTimeEntry) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::AlreadyExists(
            format!("entry at {} {}", entry.date, format_time(entry.start_time)),
        ),
        _ => RepositoryError::Storage(err.to_string()),
    }
}

fn storage(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(err.to_string())
}

#[async_trait]
impl TimeEntryRepository for SqliteTimeEntryRepository {
    async fn list_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {ENTRY_SELECT_COLUMNS} FROM time_entries \
             WHERE date >= ? AND date <= ? ORDER BY date, start_time"
        );
        let rows = sqlx::query(&sql)
            .bind(format_date(start))
            .bind(format_date(end))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn get(&self, id: i64) -> Result<TimeEntry, RepositoryError> {
        let sql = format!("SELECT {ENTRY_SELECT_COLUMNS} FROM time_entries WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Time entry {id}")))?;

        row_to_entry(&row)
    }

    async fn find_by_slot(
        &self,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<Option<TimeEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {ENTRY_SELECT_COLUMNS} FROM time_entries WHERE date = ? AND start_time = ?"
        );
        let row = sqlx::query(&sql)
            .bind(format_date(date))
            .bind(format_time(start_time))
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn insert(&self, entry: &NewTimeEntry) -> Result<TimeEntry, RepositoryError> {
        let now = format_timestamp(Utc::now());
        let result = sqlx::query(
            "INSERT INTO time_entries \
             (date, start_time, end_time, activity, type, energy_impact, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(format_date(entry.date))
        .bind(format_time(entry.start_time))
        .bind(format_time(entry.end_time()))
        .bind(&entry.activity)
        .bind(entry.activity_type.as_str())
        .bind(entry.energy_impact.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, entry))?;

        self.get(result.last_insert_rowid()).await
    }

    async fn update(&self, id: i64, entry: &NewTimeEntry) -> Result<TimeEntry, RepositoryError> {
        let result = sqlx::query(
            "UPDATE time_entries SET \
             date = ?, start_time = ?, end_time = ?, activity = ?, type = ?, \
             energy_impact = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(format_date(entry.date))
        .bind(format_time(entry.start_time))
        .bind(format_time(entry.end_time()))
        .bind(&entry.activity)
        .bind(entry.activity_type.as_str())
        .bind(entry.energy_impact.as_str())
        .bind(format_timestamp(Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, entry))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Time entry {id}")));
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Time entry {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;
    use chronocop_core::{ActivityType, EnergyImpact};

    fn new_entry(date: (i32, u32, u32), hour: u32, minute: u32) -> NewTimeEntry {
        NewTimeEntry {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            start_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            activity: "Review".to_string(),
            activity_type: ActivityType::Planned,
            energy_impact: EnergyImpact::Neutral,
        }
    }

    async fn repo() -> SqliteTimeEntryRepository {
        SqliteTimeEntryRepository::new(setup_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn insert_derives_end_time() {
        let repo = repo().await;
        let stored = repo.insert(&new_entry((2024, 3, 11), 23, 30)).await.unwrap();
        assert_eq!(stored.end_time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(repo.get(stored.id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn duplicate_slot_is_already_exists() {
        let repo = repo().await;
        repo.insert(&new_entry((2024, 3, 11), 9, 0)).await.unwrap();
        let err = repo.insert(&new_entry((2024, 3, 11), 9, 0)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn list_between_is_inclusive_and_ordered() {
        let repo = repo().await;
        repo.insert(&new_entry((2024, 3, 12), 10, 0)).await.unwrap();
        repo.insert(&new_entry((2024, 3, 11), 14, 30)).await.unwrap();
        repo.insert(&new_entry((2024, 3, 11), 9, 0)).await.unwrap();
        repo.insert(&new_entry((2024, 3, 17), 8, 0)).await.unwrap();
        repo.insert(&new_entry((2024, 3, 18), 8, 0)).await.unwrap();

        let entries = repo
            .list_between(
                NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(),
            )
            .await
            .unwrap();
        let slots: Vec<String> = entries
            .iter()
            .map(|e| format!("{} {}", e.date, format_time(e.start_time)))
            .collect();
        assert_eq!(
            slots,
            vec![
                "2024-03-11 09:00",
                "2024-03-11 14:30",
                "2024-03-12 10:00",
                "2024-03-17 08:00"
            ]
        );
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let repo = repo().await;
        let entry = new_entry((2024, 3, 11), 9, 0);
        assert!(matches!(
            repo.update(42, &entry).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(42).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_moves_entry() {
        let repo = repo().await;
        let stored = repo.insert(&new_entry((2024, 3, 11), 9, 0)).await.unwrap();
        let moved = repo
            .update(stored.id, &new_entry((2024, 3, 13), 16, 30))
            .await
            .unwrap();
        assert_eq!(moved.id, stored.id);
        assert_eq!(moved.end_time, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert!(
            repo.find_by_slot(stored.date, stored.start_time)
                .await
                .unwrap()
                .is_none()
        );
    }
}
