//! Time entry handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Local;
use chronocop_core::{EntryDraft, TimeEntry};
use serde::Deserialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Query string for listing a week.
#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week_start: Option<String>,
}

fn draft_body(body: Result<Json<EntryDraft>, JsonRejection>) -> Result<EntryDraft, HttpError> {
    body.map(|Json(draft)| draft).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected entry body");
        HttpError::BadRequest("No data provided".to_string())
    })
}

/// List the entries of one week (`week_start` or the current week).
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<TimeEntry>>, HttpError> {
    let today = Local::now().date_naive();
    Ok(Json(
        state
            .entries
            .list_week(query.week_start.as_deref(), today)
            .await?,
    ))
}

/// Create an entry in a free slot.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<EntryDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<TimeEntry>), HttpError> {
    let draft = draft_body(body)?;
    let entry = state.entries.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Replace an entry.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<EntryDraft>, JsonRejection>,
) -> Result<Json<TimeEntry>, HttpError> {
    let draft = draft_body(body)?;
    Ok(Json(state.entries.update(id, &draft).await?))
}

/// Delete an entry.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    state.entries.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
