//! Time entry domain types.
//!
//! A time entry covers exactly one 30-minute slot of a calendar day. Slots
//! always start on the hour or the half hour, and a given (date, start) pair
//! holds at most one entry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::CoreError;

/// Length of every slot on the calendar grid.
pub const SLOT_MINUTES: i64 = 30;

/// Maximum length of an activity description, in characters.
pub const MAX_ACTIVITY_LEN: usize = 200;

/// Wire format for entry dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for slot start/end times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Whether an activity was planned ahead or forced on the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Planned,
    Reactive,
}

impl ActivityType {
    pub const ALL: [Self; 2] = [Self::Planned, Self::Reactive];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Reactive => "reactive",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid type. Must be one of: {}",
                    join_names(Self::ALL.iter().map(|t| t.as_str()))
                ))
            })
    }
}

/// How an activity affected the user's energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyImpact {
    Energised,
    Neutral,
    Drained,
}

impl EnergyImpact {
    pub const ALL: [Self; 3] = [Self::Energised, Self::Neutral, Self::Drained];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Energised => "energised",
            Self::Neutral => "neutral",
            Self::Drained => "drained",
        }
    }
}

impl fmt::Display for EnergyImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyImpact {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid energy_impact. Must be one of: {}",
                    join_names(Self::ALL.iter().map(|e| e.as_str()))
                ))
            })
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// A persisted time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: i64,
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    #[serde(with = "wire_time")]
    pub start_time: NaiveTime,
    #[serde(with = "wire_time")]
    pub end_time: NaiveTime,
    pub activity: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub energy_impact: EnergyImpact,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated entry ready to be inserted or applied as an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub activity: String,
    pub activity_type: ActivityType,
    pub energy_impact: EnergyImpact,
}

impl NewTimeEntry {
    /// End of the slot this entry occupies.
    pub fn end_time(&self) -> NaiveTime {
        slot_end(self.start_time)
    }
}

/// Unvalidated request body for creating or replacing an entry.
///
/// Every field is optional so validation can report the first missing one
/// by name instead of failing JSON extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub energy_impact: Option<String>,
}

impl EntryDraft {
    /// Validate the draft into a [`NewTimeEntry`].
    ///
    /// Checks run in a fixed order and the first failure is reported.
    pub fn validate(&self) -> Result<NewTimeEntry, CoreError> {
        let date = required("date", self.date.as_deref())?;
        let start_time = required("start_time", self.start_time.as_deref())?;
        let activity = required("activity", self.activity.as_deref())?;
        let activity_type = required("type", self.activity_type.as_deref())?;
        let energy_impact = required("energy_impact", self.energy_impact.as_deref())?;

        let start_time = parse_slot_start(start_time).ok_or_else(|| {
            CoreError::Validation(
                "Start time must be on 30-minute boundaries (:00 or :30)".to_string(),
            )
        })?;
        let activity_type: ActivityType = activity_type.parse()?;
        let energy_impact: EnergyImpact = energy_impact.parse()?;

        if activity.chars().count() > MAX_ACTIVITY_LEN {
            return Err(CoreError::Validation(format!(
                "Activity description must be {MAX_ACTIVITY_LEN} characters or less"
            )));
        }

        let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map_err(|_| CoreError::Validation("Invalid date or time format".to_string()))?;

        Ok(NewTimeEntry {
            date,
            start_time,
            activity: activity.to_string(),
            activity_type,
            energy_impact,
        })
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, CoreError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CoreError::Validation(format!(
            "Missing required field: {name}"
        ))),
    }
}

/// Parse an `HH:MM` slot start, accepting only :00 and :30.
pub fn parse_slot_start(s: &str) -> Option<NaiveTime> {
    let time = NaiveTime::parse_from_str(s, TIME_FORMAT).ok()?;
    matches!(time.minute(), 0 | 30).then_some(time)
}

/// End of the slot starting at `start`. Wraps past midnight.
pub fn slot_end(start: NaiveTime) -> NaiveTime {
    start
        .overflowing_add_signed(Duration::minutes(SLOT_MINUTES))
        .0
}

/// Inclusive date range of the week starting at `week_start`, or the week
/// containing `today` (Monday first) when no start is given.
///
/// `None` when the range falls outside the representable calendar.
pub fn week_bounds(
    week_start: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = match week_start {
        Some(start) => start,
        None => {
            let since_monday = today.weekday().num_days_from_monday();
            today.checked_sub_days(Days::new(u64::from(since_monday)))?
        }
    };
    Some((start, start.checked_add_days(Days::new(6))?))
}

mod wire_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod wire_time {
    use super::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> EntryDraft {
        EntryDraft {
            date: Some("2024-03-11".to_string()),
            start_time: Some("09:30".to_string()),
            activity: Some("Standup".to_string()),
            activity_type: Some("planned".to_string()),
            energy_impact: Some("neutral".to_string()),
        }
    }

    fn validation_message(draft: &EntryDraft) -> String {
        match draft.validate() {
            Err(CoreError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_draft_computes_end_time() {
        let entry = draft().validate().unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(entry.end_time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(entry.activity_type, ActivityType::Planned);
    }

    #[test]
    fn missing_fields_reported_in_order() {
        let mut d = draft();
        d.activity = Some(String::new());
        d.energy_impact = None;
        assert_eq!(validation_message(&d), "Missing required field: activity");

        let d = EntryDraft::default();
        assert_eq!(validation_message(&d), "Missing required field: date");
    }

    #[test]
    fn off_boundary_start_rejected() {
        let mut d = draft();
        d.start_time = Some("09:15".to_string());
        assert!(validation_message(&d).contains("30-minute boundaries"));

        d.start_time = Some("9am".to_string());
        assert!(validation_message(&d).contains("30-minute boundaries"));
    }

    #[test]
    fn slot_check_runs_before_enum_checks() {
        let mut d = draft();
        d.start_time = Some("09:10".to_string());
        d.activity_type = Some("bogus".to_string());
        assert!(validation_message(&d).contains("30-minute boundaries"));
    }

    #[test]
    fn invalid_enums_rejected() {
        let mut d = draft();
        d.activity_type = Some("urgent".to_string());
        assert_eq!(
            validation_message(&d),
            "Invalid type. Must be one of: planned, reactive"
        );

        let mut d = draft();
        d.energy_impact = Some("tired".to_string());
        assert_eq!(
            validation_message(&d),
            "Invalid energy_impact. Must be one of: energised, neutral, drained"
        );
    }

    #[test]
    fn activity_length_counts_characters() {
        let mut d = draft();
        d.activity = Some("é".repeat(MAX_ACTIVITY_LEN));
        assert!(d.validate().is_ok());

        d.activity = Some("x".repeat(MAX_ACTIVITY_LEN + 1));
        assert!(validation_message(&d).contains("200 characters"));
    }

    #[test]
    fn bad_date_rejected_last() {
        let mut d = draft();
        d.date = Some("11/03/2024".to_string());
        assert_eq!(validation_message(&d), "Invalid date or time format");
    }

    #[test]
    fn last_slot_wraps_to_midnight() {
        let start = NaiveTime::from_hms_opt(23, 30, 0).unwrap();
        assert_eq!(slot_end(start), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn week_defaults_to_monday() {
        // 2024-03-14 is a Thursday
        let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap();
        let (start, end) = week_bounds(None, today).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());

        let explicit = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let (start, end) = week_bounds(Some(explicit), today).unwrap();
        assert_eq!(start, explicit);
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 19).unwrap());
    }

    #[test]
    fn week_past_calendar_end_is_none() {
        // Accepted by the wire date format, but six days later does not exist
        let last = NaiveDate::parse_from_str("+262142-12-31", DATE_FORMAT).unwrap();
        assert!(week_bounds(Some(last), last).is_none());
        assert!(week_bounds(Some(NaiveDate::MAX), NaiveDate::MAX).is_none());

        let near_end = NaiveDate::MAX - Duration::days(6);
        assert_eq!(
            week_bounds(Some(near_end), near_end),
            Some((near_end, NaiveDate::MAX))
        );
    }

    #[test]
    fn entry_serializes_wire_shape() {
        let entry = TimeEntry {
            id: 7,
            date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            activity: "Standup".to_string(),
            activity_type: ActivityType::Reactive,
            energy_impact: EnergyImpact::Drained,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-03-11");
        assert_eq!(json["start_time"], "09:30");
        assert_eq!(json["end_time"], "10:00");
        assert_eq!(json["type"], "reactive");
        assert_eq!(json["energy_impact"], "drained");
    }
}
