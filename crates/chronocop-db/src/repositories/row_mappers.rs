//! Row mapping helpers for `SQLite` queries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chronocop_core::domain::{DATE_FORMAT, TIME_FORMAT};
use chronocop_core::{RepositoryError, TimeEntry};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Shared SELECT column list for entry queries.
pub const ENTRY_SELECT_COLUMNS: &str =
    "id, date, start_time, end_time, activity, type, energy_impact, created_at, updated_at";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn column<T>(row: &SqliteRow, name: &str) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Storage(e.to_string()))
}

fn corrupt(field: &str, value: &str) -> RepositoryError {
    RepositoryError::Corrupt(format!("bad {field} value '{value}'"))
}

/// Parse a database row into a `TimeEntry`.
pub fn row_to_entry(row: &SqliteRow) -> Result<TimeEntry, RepositoryError> {
    let date: String = column(row, "date")?;
    let start_time: String = column(row, "start_time")?;
    let end_time: String = column(row, "end_time")?;
    let activity_type: String = column(row, "type")?;
    let energy_impact: String = column(row, "energy_impact")?;
    let created_at: String = column(row, "created_at")?;
    let updated_at: String = column(row, "updated_at")?;

    Ok(TimeEntry {
        id: column(row, "id")?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|_| corrupt("date", &date))?,
        start_time: NaiveTime::parse_from_str(&start_time, TIME_FORMAT)
            .map_err(|_| corrupt("start_time", &start_time))?,
        end_time: NaiveTime::parse_from_str(&end_time, TIME_FORMAT)
            .map_err(|_| corrupt("end_time", &end_time))?,
        activity: column(row, "activity")?,
        activity_type: activity_type
            .parse()
            .map_err(|_| corrupt("type", &activity_type))?,
        energy_impact: energy_impact
            .parse()
            .map_err(|_| corrupt("energy_impact", &energy_impact))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupt("timestamp", raw))
}
