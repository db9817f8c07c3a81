use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::{types::Page, Pagination};
use models::{proto_action_attachment, proto_action_item, proto_action_tool, proto_part_demand};
use service::proto::{self, NewAttachment, NewPartDemand, NewProtoAction, NewTool, ProtoActionPatch, ProtoDetail, ProtoSummary};

use crate::errors::JsonApiError;
use crate::routes::builders::UserInput;
use crate::routes::{AppState, WithUser};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Substring of the action name
    pub action_name: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub(crate) fn pagination(page: Option<u32>, per_page: Option<u32>) -> Pagination {
    let d = Pagination::default();
    Pagination { page: page.unwrap_or(d.page), per_page: per_page.unwrap_or(d.per_page) }
}

#[utoipa::path(
    get, path = "/api/proto-actions", tag = "proto-actions",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<proto_action_item::Model>>, JsonApiError> {
    let page = proto::list_proto_actions(&state.db, q.action_name.as_deref(), pagination(q.page, q.per_page)).await?;
    info!(count = page.items.len(), total = page.total, "list proto actions");
    Ok(Json(page))
}

#[utoipa::path(
    post, path = "/api/proto-actions", tag = "proto-actions",
    request_body = crate::openapi::NewProtoActionDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<WithUser<NewProtoAction>>,
) -> Result<(StatusCode, Json<proto_action_item::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(proto::create_proto_action(&state.db, &input.body, input.user_id).await?)))
}

#[utoipa::path(
    get, path = "/api/proto-actions/{id}", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProtoDetail>, JsonApiError> {
    Ok(Json(proto::get_proto_action(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/proto-actions/{id}", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<WithUser<ProtoActionPatch>>,
) -> Result<Json<proto_action_item::Model>, JsonApiError> {
    Ok(Json(proto::update_proto_action(&state.db, id, &patch.body, patch.user_id).await?))
}

#[utoipa::path(
    delete, path = "/api/proto-actions/{id}", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    match proto::delete_proto_action(&state.db, id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("proto action {id} not found")))),
    }
}

#[utoipa::path(
    post, path = "/api/proto-actions/{id}/revisions", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 201, description = "Revision created"), (status = 404, description = "Not Found"))
)]
pub async fn create_revision(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<UserInput>>,
) -> Result<(StatusCode, Json<proto_action_item::Model>), JsonApiError> {
    let user_id = body.and_then(|Json(b)| b.user_id);
    Ok((StatusCode::CREATED, Json(proto::create_proto_revision(&state.db, id, user_id).await?)))
}

#[utoipa::path(
    get, path = "/api/proto-actions/{id}/summary", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn summary(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProtoSummary>, JsonApiError> {
    Ok(Json(proto::proto_summary(&state.db, id).await?))
}

#[utoipa::path(
    post, path = "/api/proto-actions/{id}/part-demands", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn add_part_demand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewPartDemand>,
) -> Result<(StatusCode, Json<proto_part_demand::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(proto::add_proto_part_demand(&state.db, id, &input).await?)))
}

#[utoipa::path(
    delete, path = "/api/proto-actions/{id}/part-demands/{row_id}", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID"), ("row_id" = Uuid, Path, description = "Part demand ID")),
    responses((status = 204, description = "Removed"), (status = 404, description = "Not Found"))
)]
pub async fn remove_part_demand(
    State(state): State<AppState>,
    Path((id, row_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, JsonApiError> {
    proto::remove_proto_part_demand(&state.db, id, row_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/api/proto-actions/{id}/tools", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn add_tool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewTool>,
) -> Result<(StatusCode, Json<proto_action_tool::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(proto::add_proto_tool(&state.db, id, &input).await?)))
}

#[utoipa::path(
    delete, path = "/api/proto-actions/{id}/tools/{row_id}", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID"), ("row_id" = Uuid, Path, description = "Tool row ID")),
    responses((status = 204, description = "Removed"), (status = 404, description = "Not Found"))
)]
pub async fn remove_tool(
    State(state): State<AppState>,
    Path((id, row_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, JsonApiError> {
    proto::remove_proto_tool(&state.db, id, row_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post, path = "/api/proto-actions/{id}/attachments", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID")),
    responses((status = 201, description = "Created"), (status = 404, description = "Not Found"))
)]
pub async fn add_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewAttachment>,
) -> Result<(StatusCode, Json<proto_action_attachment::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(proto::add_proto_attachment(&state.db, id, &input).await?)))
}

#[utoipa::path(
    delete, path = "/api/proto-actions/{id}/attachments/{row_id}", tag = "proto-actions",
    params(("id" = Uuid, Path, description = "Proto action ID"), ("row_id" = Uuid, Path, description = "Attachment row ID")),
    responses((status = 204, description = "Removed"), (status = 404, description = "Not Found"))
)]
pub async fn remove_attachment(
    State(state): State<AppState>,
    Path((id, row_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, JsonApiError> {
    proto::remove_proto_attachment(&state.db, id, row_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
