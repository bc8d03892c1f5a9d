//! Persistence across pool restarts on a real database file.

use chrono::{NaiveDate, NaiveTime};
use chronocop_core::{ActivityType, EnergyImpact, NewTimeEntry, TimeEntryRepository};
use chronocop_db::{SqliteTimeEntryRepository, setup_database};

#[tokio::test]
async fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("time_audit.db");

    let entry = NewTimeEntry {
        date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
        start_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
        activity: "Gym".to_string(),
        activity_type: ActivityType::Planned,
        energy_impact: EnergyImpact::Energised,
    };

    let pool = setup_database(&path).await.unwrap();
    let stored = SqliteTimeEntryRepository::new(pool.clone())
        .insert(&entry)
        .await
        .unwrap();
    pool.close().await;

    let pool = setup_database(&path).await.unwrap();
    let reopened = SqliteTimeEntryRepository::new(pool)
        .get(stored.id)
        .await
        .unwrap();
    assert_eq!(reopened, stored);
}
