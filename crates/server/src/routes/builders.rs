//! Draft template builder routes. Actions, part demands, tools and
//! attachments are addressed by their position in the draft.

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::enums::BuildStatus;
use service::builder::{
    ActionPatch, BuildAction, BuildActionTool, BuildPartDemand, BuildView, MetadataPatch, NewBuildAttachment,
    PartDemandPatch, ToolPatch,
};

use crate::errors::JsonApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Build status, e.g. `In Progress`
    #[param(value_type = Option<String>)]
    pub status: Option<BuildStatus>,
}

/// Blank build, or a copy of `template_id` when given.
#[derive(Debug, Deserialize)]
pub struct CreateBuilderInput {
    pub name: String,
    #[serde(default)]
    pub build_type: Option<String>,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub is_revision: bool,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RenameInput {
    pub name: String,
    #[serde(default)]
    pub build_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: BuildStatus,
}

/// Exactly one source: a template item, a proto action or an inline action.
#[derive(Debug, Deserialize)]
pub struct AddActionInput {
    #[serde(default)]
    pub template_item_id: Option<Uuid>,
    #[serde(default)]
    pub proto_action_id: Option<Uuid>,
    #[serde(default)]
    pub action: Option<BuildAction>,
}

#[derive(Debug, Deserialize)]
pub struct AttachmentInput {
    #[serde(flatten)]
    pub attachment: NewBuildAttachment,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Updated draft plus the position of the element just added.
#[derive(Debug, Serialize)]
pub struct Added {
    pub index: usize,
    pub build: BuildView,
}

impl From<(BuildView, usize)> for Added {
    fn from((build, index): (BuildView, usize)) -> Self { Self { index, build } }
}

#[utoipa::path(
    get, path = "/api/builders", tag = "builders",
    params(ListQuery),
    responses((status = 200, description = "List OK"))
)]
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<BuildView>>, JsonApiError> {
    Ok(Json(state.builder.list_builders(q.status).await?))
}

#[utoipa::path(
    post, path = "/api/builders", tag = "builders",
    request_body = crate::openapi::CreateBuilderDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Template not found"))
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBuilderInput>,
) -> Result<(StatusCode, Json<BuildView>), JsonApiError> {
    let view = match input.template_id {
        Some(t) => state.builder.copy_from_template(t, &input.name, input.is_revision, input.user_id).await?,
        None => state.builder.create_blank(&input.name, input.build_type, input.user_id).await?,
    };
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get, path = "/api/builders/{id}", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.load(id).await?))
}

#[utoipa::path(
    put, path = "/api/builders/{id}", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "Renamed"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn rename(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RenameInput>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.rename(id, &input.name, input.build_type).await?))
}

#[utoipa::path(
    delete, path = "/api/builders/{id}", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    match state.builder.delete_builder(id).await? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("builder {id} not found")))),
    }
}

#[utoipa::path(
    put, path = "/api/builders/{id}/status", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"))
)]
pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.set_build_status(id, input.status).await?))
}

#[utoipa::path(
    put, path = "/api/builders/{id}/metadata", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "Updated"), (status = 400, description = "Build closed or unknown field"), (status = 404, description = "Not Found"))
)]
pub async fn set_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<MetadataPatch>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.set_metadata(id, &patch).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/actions", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    request_body = crate::openapi::AddActionDoc,
    responses((status = 201, description = "Added"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn add_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AddActionInput>,
) -> Result<(StatusCode, Json<Added>), JsonApiError> {
    let added = match (input.template_item_id, input.proto_action_id, input.action) {
        (Some(item), None, None) => state.builder.add_action_from_template_item(id, item).await?,
        (None, Some(proto), None) => state.builder.add_action_from_proto(id, proto).await?,
        (None, None, Some(action)) => state.builder.add_custom_action(id, action).await?,
        _ => {
            return Err(JsonApiError::new(
                StatusCode::BAD_REQUEST,
                "Validation Error",
                Some("give exactly one of template_item_id, proto_action_id or action".into()),
            ))
        }
    };
    info!(id = %id, index = added.1, "action added to build");
    Ok((StatusCode::CREATED, Json(added.into())))
}

#[utoipa::path(
    put, path = "/api/builders/{id}/actions/{idx}", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("idx" = usize, Path, description = "Action position")),
    responses((status = 200, description = "Updated"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn update_action(
    State(state): State<AppState>,
    Path((id, idx)): Path<(Uuid, usize)>,
    Json(patch): Json<ActionPatch>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.update_action(id, idx, &patch).await?))
}

#[utoipa::path(
    delete, path = "/api/builders/{id}/actions/{idx}", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("idx" = usize, Path, description = "Action position")),
    responses((status = 200, description = "Removed"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn remove_action(State(state): State<AppState>, Path((id, idx)): Path<(Uuid, usize)>) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.remove_action(id, idx).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/actions/{idx}/unlink-proto", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("idx" = usize, Path, description = "Action position")),
    responses((status = 200, description = "Unlinked"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn unlink_proto(State(state): State<AppState>, Path((id, idx)): Path<(Uuid, usize)>) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.unlink_proto_from_action(id, idx).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/actions/{idx}/part-demands", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("idx" = usize, Path, description = "Action position")),
    responses((status = 201, description = "Added"), (status = 400, description = "Validation Error"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn add_part_demand(
    State(state): State<AppState>,
    Path((id, idx)): Path<(Uuid, usize)>,
    Json(part): Json<BuildPartDemand>,
) -> Result<(StatusCode, Json<Added>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(state.builder.add_part_demand_to_action(id, idx, part).await?.into())))
}

#[utoipa::path(
    put, path = "/api/builders/{id}/actions/{idx}/part-demands/{pidx}", tag = "builders",
    params(
        ("id" = Uuid, Path, description = "Builder ID"),
        ("idx" = usize, Path, description = "Action position"),
        ("pidx" = usize, Path, description = "Part demand position")
    ),
    responses((status = 200, description = "Updated"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn update_part_demand(
    State(state): State<AppState>,
    Path((id, idx, pidx)): Path<(Uuid, usize, usize)>,
    Json(patch): Json<PartDemandPatch>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.update_part_demand(id, idx, pidx, &patch).await?))
}

#[utoipa::path(
    delete, path = "/api/builders/{id}/actions/{idx}/part-demands/{pidx}", tag = "builders",
    params(
        ("id" = Uuid, Path, description = "Builder ID"),
        ("idx" = usize, Path, description = "Action position"),
        ("pidx" = usize, Path, description = "Part demand position")
    ),
    responses((status = 200, description = "Removed"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn remove_part_demand(
    State(state): State<AppState>,
    Path((id, idx, pidx)): Path<(Uuid, usize, usize)>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.remove_part_demand_from_action(id, idx, pidx).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/actions/{idx}/tools", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("idx" = usize, Path, description = "Action position")),
    responses((status = 201, description = "Added"), (status = 400, description = "Validation Error"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn add_tool(
    State(state): State<AppState>,
    Path((id, idx)): Path<(Uuid, usize)>,
    Json(tool): Json<BuildActionTool>,
) -> Result<(StatusCode, Json<Added>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(state.builder.add_tool_to_action(id, idx, tool).await?.into())))
}

#[utoipa::path(
    put, path = "/api/builders/{id}/actions/{idx}/tools/{tidx}", tag = "builders",
    params(
        ("id" = Uuid, Path, description = "Builder ID"),
        ("idx" = usize, Path, description = "Action position"),
        ("tidx" = usize, Path, description = "Tool position")
    ),
    responses((status = 200, description = "Updated"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn update_tool(
    State(state): State<AppState>,
    Path((id, idx, tidx)): Path<(Uuid, usize, usize)>,
    Json(patch): Json<ToolPatch>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.update_tool(id, idx, tidx, &patch).await?))
}

#[utoipa::path(
    delete, path = "/api/builders/{id}/actions/{idx}/tools/{tidx}", tag = "builders",
    params(
        ("id" = Uuid, Path, description = "Builder ID"),
        ("idx" = usize, Path, description = "Action position"),
        ("tidx" = usize, Path, description = "Tool position")
    ),
    responses((status = 200, description = "Removed"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn remove_tool(
    State(state): State<AppState>,
    Path((id, idx, tidx)): Path<(Uuid, usize, usize)>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.remove_tool_from_action(id, idx, tidx).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/actions/{idx}/attachments", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("idx" = usize, Path, description = "Action position")),
    responses((status = 201, description = "Added"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn add_action_attachment(
    State(state): State<AppState>,
    Path((id, idx)): Path<(Uuid, usize)>,
    Json(input): Json<AttachmentInput>,
) -> Result<(StatusCode, Json<Added>), JsonApiError> {
    let added = state.builder.add_attachment_to_action(id, idx, input.attachment, input.user_id).await?;
    Ok((StatusCode::CREATED, Json(added.into())))
}

#[utoipa::path(
    delete, path = "/api/builders/{id}/actions/{idx}/attachments/{aidx}", tag = "builders",
    params(
        ("id" = Uuid, Path, description = "Builder ID"),
        ("idx" = usize, Path, description = "Action position"),
        ("aidx" = usize, Path, description = "Attachment position")
    ),
    responses((status = 200, description = "Removed"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn remove_action_attachment(
    State(state): State<AppState>,
    Path((id, idx, aidx)): Path<(Uuid, usize, usize)>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.remove_attachment_from_action(id, idx, aidx).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/attachments", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 201, description = "Added"), (status = 404, description = "Not Found"))
)]
pub async fn add_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AttachmentInput>,
) -> Result<(StatusCode, Json<Added>), JsonApiError> {
    let added = state.builder.add_attachment(id, input.attachment, input.user_id).await?;
    Ok((StatusCode::CREATED, Json(added.into())))
}

#[utoipa::path(
    delete, path = "/api/builders/{id}/attachments/{aidx}", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID"), ("aidx" = usize, Path, description = "Attachment position")),
    responses((status = 200, description = "Removed"), (status = 422, description = "Index Out Of Range"))
)]
pub async fn remove_attachment(
    State(state): State<AppState>,
    Path((id, aidx)): Path<(Uuid, usize)>,
) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.remove_attachment(id, aidx).await?))
}

/// Publishes the draft as a new template. The body is optional.
#[utoipa::path(
    post, path = "/api/builders/{id}/submit", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "Submitted"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<UserInput>>,
) -> Result<Json<BuildView>, JsonApiError> {
    let user_id = body.and_then(|Json(b)| b.user_id);
    Ok(Json(state.builder.submit(id, user_id).await?))
}

#[utoipa::path(
    post, path = "/api/builders/{id}/abandon", tag = "builders",
    params(("id" = Uuid, Path, description = "Builder ID")),
    responses((status = 200, description = "Abandoned"), (status = 404, description = "Not Found"))
)]
pub async fn abandon(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<BuildView>, JsonApiError> {
    Ok(Json(state.builder.abandon(id).await?))
}
