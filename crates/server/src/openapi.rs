//! OpenAPI document. Request bodies are described by the `*Doc` mirrors below;
//! the service types themselves carry no schema derives.

use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ErrorBody;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct NewAssetDoc {
    pub name: String,
    pub serial_number: String,
    pub asset_type_id: Option<Uuid>,
    pub make_model_id: Option<Uuid>,
    /// Four readings, `null` where a meter is absent
    pub meters: Option<Vec<Option<f64>>>,
    /// Recorded as the creator
    pub user_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct MetersDoc {
    pub meter1: Option<f64>,
    pub meter2: Option<f64>,
    pub meter3: Option<f64>,
    pub meter4: Option<f64>,
}

#[derive(ToSchema)]
pub struct NewProtoActionDoc {
    pub action_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub expected_billable_hours: Option<f64>,
    pub safety_notes: Option<String>,
    pub notes: Option<String>,
    pub is_required: Option<bool>,
    pub instructions: Option<String>,
    pub instructions_type: Option<String>,
    pub minimum_staff_count: Option<i32>,
    pub required_skills: Option<String>,
    pub revision: Option<String>,
    /// Recorded as the creator
    pub user_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct CreateBuilderDoc {
    pub name: String,
    pub build_type: Option<String>,
    /// Copy this template instead of starting blank
    pub template_id: Option<Uuid>,
    pub is_revision: Option<bool>,
    pub user_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct AddActionDoc {
    pub template_item_id: Option<Uuid>,
    pub proto_action_id: Option<Uuid>,
    /// Inline action: `action_name` plus any draft action fields
    #[schema(value_type = Option<Object>)]
    pub action: Option<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct NewPlanDoc {
    pub name: String,
    pub description: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub template_action_set_id: Uuid,
    /// `hours`, `days` or `meter1`..`meter4`
    pub frequency_type: String,
    pub delta_hours: Option<f64>,
    pub delta_m1: Option<f64>,
    pub delta_m2: Option<f64>,
    pub delta_m3: Option<f64>,
    pub delta_m4: Option<f64>,
    pub status: Option<String>,
    /// Recorded as the creator
    pub user_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct RunPlanningDoc {
    pub plan_id: Option<Uuid>,
    pub create_events: Option<bool>,
    pub user_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct CreateEventDoc {
    pub asset_id: Uuid,
    pub template_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub planned_start: Option<String>,
    pub user_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub priority: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::assets::create,
        crate::routes::assets::get,
        crate::routes::assets::update_meters,
        crate::routes::assets::set_active,
        crate::routes::proto_actions::list,
        crate::routes::proto_actions::create,
        crate::routes::proto_actions::get,
        crate::routes::proto_actions::update,
        crate::routes::proto_actions::delete,
        crate::routes::proto_actions::create_revision,
        crate::routes::proto_actions::summary,
        crate::routes::proto_actions::add_part_demand,
        crate::routes::proto_actions::remove_part_demand,
        crate::routes::proto_actions::add_tool,
        crate::routes::proto_actions::remove_tool,
        crate::routes::proto_actions::add_attachment,
        crate::routes::proto_actions::remove_attachment,
        crate::routes::templates::list,
        crate::routes::templates::get,
        crate::routes::templates::delete,
        crate::routes::templates::summary,
        crate::routes::templates::activate,
        crate::routes::templates::deactivate,
        crate::routes::templates::revisions,
        crate::routes::builders::list,
        crate::routes::builders::create,
        crate::routes::builders::get,
        crate::routes::builders::rename,
        crate::routes::builders::delete,
        crate::routes::builders::set_status,
        crate::routes::builders::set_metadata,
        crate::routes::builders::add_action,
        crate::routes::builders::update_action,
        crate::routes::builders::remove_action,
        crate::routes::builders::unlink_proto,
        crate::routes::builders::add_part_demand,
        crate::routes::builders::update_part_demand,
        crate::routes::builders::remove_part_demand,
        crate::routes::builders::add_tool,
        crate::routes::builders::update_tool,
        crate::routes::builders::remove_tool,
        crate::routes::builders::add_action_attachment,
        crate::routes::builders::remove_action_attachment,
        crate::routes::builders::add_attachment,
        crate::routes::builders::remove_attachment,
        crate::routes::builders::submit,
        crate::routes::builders::abandon,
        crate::routes::plans::list,
        crate::routes::plans::create,
        crate::routes::plans::get,
        crate::routes::plans::update,
        crate::routes::plans::delete,
        crate::routes::plans::activate,
        crate::routes::plans::deactivate,
        crate::routes::plans::next_due,
        crate::routes::plans::planning,
        crate::routes::plans::run_planning,
        crate::routes::events::list,
        crate::routes::events::create,
        crate::routes::events::get,
        crate::routes::events::start,
        crate::routes::events::complete,
        crate::routes::events::cancel,
        crate::routes::events::update_action_status,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            NewAssetDoc,
            MetersDoc,
            NewProtoActionDoc,
            CreateBuilderDoc,
            AddActionDoc,
            NewPlanDoc,
            RunPlanningDoc,
            CreateEventDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "assets"),
        (name = "proto-actions"),
        (name = "templates"),
        (name = "builders"),
        (name = "plans"),
        (name = "planning"),
        (name = "events")
    )
)]
pub struct ApiDoc;
