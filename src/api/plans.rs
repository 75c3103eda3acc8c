use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::extract::{JsonBody, QueryParams};
use super::identity::{resolve_identity, Caller};
use super::AppState;
use crate::models::{quantity_from_value, NewPlan, Plan, PlanPatch};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPlansQuery {
    pub date: Option<String>,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub content: Option<String>,
    pub exercise_type: Option<String>,
    pub unit: Option<String>,
    #[serde(default)]
    pub quantity: Value,
    pub date: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlanRequest {
    #[serde(default)]
    pub updates: Option<PlanPatch>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

async fn list_plans(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<ListPlansQuery>,
) -> ApiResult<Json<Vec<Plan>>> {
    let date = non_empty(query.date)
        .ok_or_else(|| ApiError::BadRequest("missing date parameter".into()))?;
    let who = resolve_identity(
        &caller,
        query.user_id.as_deref(),
        query.session_id.as_deref(),
    )?;

    Ok(Json(state.db.list_plans(&date, &who)?))
}

async fn create_plan(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<CreatePlanRequest>,
) -> ApiResult<Json<Plan>> {
    let input = NewPlan {
        content: non_empty(req.content),
        exercise_type: non_empty(req.exercise_type),
        unit: req.unit,
        quantity: quantity_from_value(&req.quantity),
        plan_date: non_empty(req.date).unwrap_or_default(),
    };
    if !input.has_content() || input.plan_date.is_empty() {
        return Err(ApiError::BadRequest(
            "content or exercise_type, and date are required".into(),
        ));
    }
    let who = resolve_identity(&caller, req.user_id.as_deref(), req.session_id.as_deref())?;

    Ok(Json(state.db.insert_plan(&who, input)?))
}

/// A plan that exists but belongs to someone else is reported the same as a
/// missing one.
async fn update_plan(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdatePlanRequest>,
) -> ApiResult<Json<Plan>> {
    let who = resolve_identity(&caller, req.user_id.as_deref(), req.session_id.as_deref())?;
    let patch = req.updates.unwrap_or_default();

    state
        .db
        .update_plan(&id, &who, patch)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("plan not found".into()))
}

async fn delete_plan(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<OwnerQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let who = resolve_identity(
        &caller,
        query.user_id.as_deref(),
        query.session_id.as_deref(),
    )?;
    let success = state.db.delete_plan(&id, &who)?;
    Ok(Json(DeleteResponse { success }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/{id}", put(update_plan).delete(delete_plan))
}
