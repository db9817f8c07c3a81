use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::{enums::PlanStatus, maintenance_plan};
use service::planning::{plans, PlanningResult};

use crate::errors::JsonApiError;
use crate::routes::{AppState, WithUser};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// `Active` or `Inactive`
    #[param(value_type = Option<String>)]
    pub status: Option<PlanStatus>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PlanningQuery {
    /// Only results that need maintenance
    #[serde(default)]
    pub due_only: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NextDueQuery {
    /// RFC 3339 timestamp of the last maintenance
    pub last_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NextDue {
    pub plan_id: Uuid,
    pub next_due_date: Option<DateTime<Utc>>,
}

/// Without `plan_id` every active plan is evaluated.
#[derive(Debug, Default, Deserialize)]
pub struct RunPlanningInput {
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub create_events: bool,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RunPlanningOutput {
    pub results: Vec<PlanningResult>,
    pub created_event_ids: Vec<Uuid>,
}

#[utoipa::path(
    get, path = "/api/plans", tag = "plans",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<maintenance_plan::Model>>, JsonApiError> {
    Ok(Json(plans::list_plans(&state.db, q.status).await?))
}

#[utoipa::path(
    post, path = "/api/plans", tag = "plans",
    request_body = crate::openapi::NewPlanDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Template not found"))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<WithUser<plans::NewPlan>>,
) -> Result<(StatusCode, Json<maintenance_plan::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(plans::create_plan(&state.db, &input.body, input.user_id).await?)))
}

#[utoipa::path(
    get, path = "/api/plans/{id}", tag = "plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<maintenance_plan::Model>, JsonApiError> {
    Ok(Json(plans::get_plan(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/plans/{id}", tag = "plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<WithUser<plans::PlanPatch>>,
) -> Result<Json<maintenance_plan::Model>, JsonApiError> {
    Ok(Json(plans::update_plan(&state.db, id, &patch.body, patch.user_id).await?))
}

#[utoipa::path(
    delete, path = "/api/plans/{id}", tag = "plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    match plans::delete_plan(&state.db, id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("plan {id} not found")))),
    }
}

#[utoipa::path(
    post, path = "/api/plans/{id}/activate", tag = "plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses((status = 200, description = "Activated"), (status = 404, description = "Not Found"))
)]
pub async fn activate(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<maintenance_plan::Model>, JsonApiError> {
    Ok(Json(plans::activate_plan(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/plans/{id}/deactivate", tag = "plans",
    params(("id" = Uuid, Path, description = "Plan ID")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not Found"))
)]
pub async fn deactivate(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<maintenance_plan::Model>, JsonApiError> {
    Ok(Json(plans::deactivate_plan(&state.db, id).await?))
}

#[utoipa::path(
    get, path = "/api/plans/{id}/next-due", tag = "plans",
    params(("id" = Uuid, Path, description = "Plan ID"), NextDueQuery),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn next_due(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<NextDueQuery>,
) -> Result<Json<NextDue>, JsonApiError> {
    let plan = plans::get_plan(&state.db, id).await?;
    let next_due_date = plans::calculate_next_due_date(&plan, q.last_date, &state.planner_config);
    Ok(Json(NextDue { plan_id: id, next_due_date }))
}

/// Evaluates the plan's assets without creating anything.
#[utoipa::path(
    get, path = "/api/plans/{id}/planning", tag = "planning",
    params(("id" = Uuid, Path, description = "Plan ID"), PlanningQuery),
    responses((status = 200, description = "Planning results"), (status = 404, description = "Not Found"))
)]
pub async fn planning(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<PlanningQuery>,
) -> Result<Json<Vec<PlanningResult>>, JsonApiError> {
    let results = if q.due_only {
        state.planner.assets_needing_maintenance(id).await?
    } else {
        state.planner.plan_maintenance(id).await?
    };
    Ok(Json(results))
}

#[utoipa::path(
    post, path = "/api/planning/run", tag = "planning",
    request_body = crate::openapi::RunPlanningDoc,
    responses((status = 200, description = "Planning run finished"), (status = 404, description = "Plan not found"))
)]
pub async fn run_planning(
    State(state): State<AppState>,
    body: Option<Json<RunPlanningInput>>,
) -> Result<Json<RunPlanningOutput>, JsonApiError> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let mut results = match input.plan_id {
        Some(id) => state.planner.plan_maintenance(id).await?,
        None => state.planner.plan_all_active_plans().await?,
    };
    let created_event_ids = if input.create_events {
        state.planner.create_events_from_results(&mut results, input.user_id).await?
    } else {
        Vec::new()
    };
    info!(results = results.len(), created = created_event_ids.len(), "planning run finished");
    Ok(Json(RunPlanningOutput { results, created_event_ids }))
}
