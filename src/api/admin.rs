use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::db::BackupFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCreated {
    pub success: bool,
    pub path: String,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".into(),
    })
}

async fn create_backup(State(state): State<AppState>) -> ApiResult<Json<BackupCreated>> {
    let path = state
        .db
        .backup()?
        .ok_or_else(|| ApiError::NotFound("database file does not exist".into()))?;
    Ok(Json(BackupCreated {
        success: true,
        path: path.display().to_string(),
    }))
}

async fn list_backups(State(state): State<AppState>) -> ApiResult<Json<Vec<BackupFile>>> {
    Ok(Json(state.db.backups()?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/db/backup", post(create_backup))
        .route("/db/backups", get(list_backups))
}
