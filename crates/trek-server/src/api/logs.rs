//! Activity log endpoints.
//!
//! The log board is a plain list: read everything, insert, patch, delete.
//! Every successful write is also pushed to feed subscribers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use trek_core::{steps_in_range, ActivityLog, LogPatch};

use crate::state::{AppState, InsertOutcome};

/// List all logs, oldest first.
pub async fn list_logs(State(state): State<Arc<AppState>>) -> Json<Vec<ActivityLog>> {
    Json(state.list_logs())
}

/// Get a specific log by ID.
pub async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ActivityLog>, StatusCode> {
    state.get_log(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Insert a client-built log. The client chooses the id.
pub async fn create_log(
    State(state): State<Arc<AppState>>,
    Json(mut log): Json<ActivityLog>,
) -> Result<(StatusCode, Json<ActivityLog>), StatusCode> {
    if !steps_in_range(log.steps) || log.id.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    // Ordering key always follows the date
    log.timestamp = log.date.timestamp_millis();

    match state.insert_log(log.clone()).await {
        Ok(InsertOutcome::Inserted) => {
            tracing::info!("Logged {} steps for {} ({})", log.steps, log.member_id, log.id);
            Ok((StatusCode::CREATED, Json(log)))
        }
        Ok(InsertOutcome::Duplicate) => Err(StatusCode::CONFLICT),
        Err(e) => {
            tracing::error!("Failed to persist log {}: {:#}", log.id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update steps and/or date of a log.
pub async fn update_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<LogPatch>,
) -> Result<Json<ActivityLog>, StatusCode> {
    if patch.is_empty() || patch.steps.is_some_and(|steps| !steps_in_range(steps)) {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.update_log(&id, &patch).await {
        Ok(Some(log)) => Ok(Json(log)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to update log {}: {:#}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a log by ID.
pub async fn delete_log(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    match state.remove_log(&id).await {
        Ok(true) => {
            tracing::info!("Deleted log {}", id);
            StatusCode::NO_CONTENT
        }
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            tracing::error!("Failed to delete log {}: {:#}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
