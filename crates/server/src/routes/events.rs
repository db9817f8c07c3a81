use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;
use uuid::Uuid;

use models::enums::{ActionStatus, Priority};
use models::{action, maintenance_action_set};
use service::maintenance::{self, CreateFromTemplate, EventDetail, EventFilter};

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// `template_id` wins when both it and `plan_id` are given; the plan is then
/// only recorded on the event.
#[derive(Debug, Deserialize)]
pub struct CreateEventInput {
    pub asset_id: Uuid,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub planned_start: Option<DateTimeWithTimeZone>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_user_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteInput {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActionStatusInput {
    pub status: ActionStatus,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[utoipa::path(
    get, path = "/api/events", tag = "events",
    params(
        ("asset_id" = Option<Uuid>, Query, description = "Asset filter"),
        ("plan_id" = Option<Uuid>, Query, description = "Plan filter"),
        ("status" = Option<String>, Query, description = "Event status, e.g. `Planned`")
    ),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<Json<Vec<maintenance_action_set::Model>>, JsonApiError> {
    Ok(Json(maintenance::list_events(&state.db, &filter).await?))
}

#[utoipa::path(
    post, path = "/api/events", tag = "events",
    request_body = crate::openapi::CreateEventDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> Result<(StatusCode, Json<EventDetail>), JsonApiError> {
    let detail = match (input.template_id, input.plan_id) {
        (Some(template_id), plan_id) => {
            let req = CreateFromTemplate {
                template_id,
                asset_id: input.asset_id,
                planned_start: input.planned_start,
                plan_id,
                user_id: input.user_id,
                assigned_user_id: input.assigned_user_id,
                priority: input.priority,
            };
            maintenance::create_from_template(&state.db, &req).await?
        }
        (None, Some(plan_id)) => {
            maintenance::create_from_plan(&state.db, plan_id, input.asset_id, input.planned_start, input.user_id).await?
        }
        (None, None) => {
            return Err(JsonApiError::new(
                StatusCode::BAD_REQUEST,
                "Validation Error",
                Some("template_id or plan_id is required".into()),
            ))
        }
    };
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get, path = "/api/events/{id}", tag = "events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<EventDetail>, JsonApiError> {
    Ok(Json(maintenance::get_event(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/events/{id}/start", tag = "events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "Started"), (status = 400, description = "Not startable"), (status = 404, description = "Not Found"))
)]
pub async fn start(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<maintenance_action_set::Model>, JsonApiError> {
    Ok(Json(maintenance::start_event(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/events/{id}/complete", tag = "events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "Completed"), (status = 400, description = "Already closed"), (status = 404, description = "Not Found"))
)]
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<CompleteInput>>,
) -> Result<Json<maintenance_action_set::Model>, JsonApiError> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    Ok(Json(maintenance::complete_event(&state.db, id, input.user_id, input.notes).await?))
}

#[utoipa::path(
    post, path = "/api/events/{id}/cancel", tag = "events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "Cancelled"), (status = 400, description = "Already closed"), (status = 404, description = "Not Found"))
)]
pub async fn cancel(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<maintenance_action_set::Model>, JsonApiError> {
    Ok(Json(maintenance::cancel_event(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/actions/{id}/status", tag = "events",
    params(("id" = Uuid, Path, description = "Action ID")),
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"))
)]
pub async fn update_action_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ActionStatusInput>,
) -> Result<Json<action::Model>, JsonApiError> {
    Ok(Json(maintenance::update_action_status(&state.db, id, input.status, input.user_id).await?))
}
