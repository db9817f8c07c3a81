use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::types::Page;
use models::template_action_set;
use service::templates::{self, TemplateDetail, TemplateSummary};

use crate::errors::JsonApiError;
use crate::routes::{proto_actions::pagination, AppState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Only active templates when true
    #[serde(default)]
    pub active_only: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[utoipa::path(
    get, path = "/api/templates", tag = "templates",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<template_action_set::Model>>, JsonApiError> {
    Ok(Json(templates::list_templates(&state.db, q.active_only, pagination(q.page, q.per_page)).await?))
}

#[utoipa::path(
    get, path = "/api/templates/{id}", tag = "templates",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<TemplateDetail>, JsonApiError> {
    Ok(Json(templates::get_template(&state.db, id).await?))
}

#[utoipa::path(
    delete, path = "/api/templates/{id}", tag = "templates",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Referenced by a plan"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    match templates::delete_template(&state.db, id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("template {id} not found")))),
    }
}

#[utoipa::path(
    get, path = "/api/templates/{id}/summary", tag = "templates",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn summary(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<TemplateSummary>, JsonApiError> {
    Ok(Json(templates::template_summary(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/templates/{id}/activate", tag = "templates",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses((status = 200, description = "Activated"), (status = 404, description = "Not Found"))
)]
pub async fn activate(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<template_action_set::Model>, JsonApiError> {
    Ok(Json(templates::activate_template(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/templates/{id}/deactivate", tag = "templates",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses((status = 200, description = "Deactivated"), (status = 404, description = "Not Found"))
)]
pub async fn deactivate(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<template_action_set::Model>, JsonApiError> {
    Ok(Json(templates::deactivate_template(&state.db, id).await?))
}

/// The template followed by its prior revisions, newest first.
#[utoipa::path(
    get, path = "/api/templates/{id}/revisions", tag = "templates",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn revisions(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Vec<template_action_set::Model>>, JsonApiError> {
    Ok(Json(templates::revision_history(&state.db, id).await?))
}
