use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use configs::PlannerConfig;
use service::builder::TemplateBuilder;
use service::planning::{MaintenancePlanner, SeaOrmPlanningRepository};

use crate::openapi::ApiDoc;

pub mod assets;
pub mod builders;
pub mod events;
pub mod plans;
pub mod proto_actions;
pub mod templates;

/// Request payload with the acting user beside its fields.
#[derive(Debug, Deserialize)]
pub struct WithUser<T> {
    #[serde(flatten)]
    pub body: T,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Shared handler state. Cloned per request; every field is a handle.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub builder: TemplateBuilder,
    pub planner: Arc<MaintenancePlanner<SeaOrmPlanningRepository>>,
    pub planner_config: PlannerConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, planner_config: PlannerConfig) -> Self {
        let repo = Arc::new(SeaOrmPlanningRepository { db: db.clone() });
        Self {
            builder: TemplateBuilder::new(db.clone()),
            planner: Arc::new(MaintenancePlanner::new(repo, planner_config)),
            planner_config,
            db,
        }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/assets", post(assets::create))
        .route("/api/assets/:id", get(assets::get))
        .route("/api/assets/:id/meters", put(assets::update_meters))
        .route("/api/assets/:id/active", put(assets::set_active))
        .route("/api/proto-actions", get(proto_actions::list).post(proto_actions::create))
        .route(
            "/api/proto-actions/:id",
            get(proto_actions::get).put(proto_actions::update).delete(proto_actions::delete),
        )
        .route("/api/proto-actions/:id/revisions", post(proto_actions::create_revision))
        .route("/api/proto-actions/:id/summary", get(proto_actions::summary))
        .route("/api/proto-actions/:id/part-demands", post(proto_actions::add_part_demand))
        .route("/api/proto-actions/:id/part-demands/:row_id", delete(proto_actions::remove_part_demand))
        .route("/api/proto-actions/:id/tools", post(proto_actions::add_tool))
        .route("/api/proto-actions/:id/tools/:row_id", delete(proto_actions::remove_tool))
        .route("/api/proto-actions/:id/attachments", post(proto_actions::add_attachment))
        .route("/api/proto-actions/:id/attachments/:row_id", delete(proto_actions::remove_attachment))
        .route("/api/templates", get(templates::list))
        .route("/api/templates/:id", get(templates::get).delete(templates::delete))
        .route("/api/templates/:id/summary", get(templates::summary))
        .route("/api/templates/:id/activate", post(templates::activate))
        .route("/api/templates/:id/deactivate", post(templates::deactivate))
        .route("/api/templates/:id/revisions", get(templates::revisions))
        .route("/api/builders", get(builders::list).post(builders::create))
        .route("/api/builders/:id", get(builders::get).put(builders::rename).delete(builders::delete))
        .route("/api/builders/:id/status", put(builders::set_status))
        .route("/api/builders/:id/metadata", put(builders::set_metadata))
        .route("/api/builders/:id/actions", post(builders::add_action))
        .route("/api/builders/:id/actions/:idx", put(builders::update_action).delete(builders::remove_action))
        .route("/api/builders/:id/actions/:idx/unlink-proto", post(builders::unlink_proto))
        .route("/api/builders/:id/actions/:idx/part-demands", post(builders::add_part_demand))
        .route(
            "/api/builders/:id/actions/:idx/part-demands/:pidx",
            put(builders::update_part_demand).delete(builders::remove_part_demand),
        )
        .route("/api/builders/:id/actions/:idx/tools", post(builders::add_tool))
        .route(
            "/api/builders/:id/actions/:idx/tools/:tidx",
            put(builders::update_tool).delete(builders::remove_tool),
        )
        .route("/api/builders/:id/actions/:idx/attachments", post(builders::add_action_attachment))
        .route("/api/builders/:id/actions/:idx/attachments/:aidx", delete(builders::remove_action_attachment))
        .route("/api/builders/:id/attachments", post(builders::add_attachment))
        .route("/api/builders/:id/attachments/:aidx", delete(builders::remove_attachment))
        .route("/api/builders/:id/submit", post(builders::submit))
        .route("/api/builders/:id/abandon", post(builders::abandon))
        .route("/api/plans", get(plans::list).post(plans::create))
        .route("/api/plans/:id", get(plans::get).put(plans::update).delete(plans::delete))
        .route("/api/plans/:id/activate", post(plans::activate))
        .route("/api/plans/:id/deactivate", post(plans::deactivate))
        .route("/api/plans/:id/next-due", get(plans::next_due))
        .route("/api/plans/:id/planning", get(plans::planning))
        .route("/api/planning/run", post(plans::run_planning))
        .route("/api/events", get(events::list).post(events::create))
        .route("/api/events/:id", get(events::get))
        .route("/api/events/:id/start", post(events::start))
        .route("/api/events/:id/complete", post(events::complete))
        .route("/api/events/:id/cancel", post(events::cancel))
        .route("/api/actions/:id/status", put(events::update_action_status))
}

/// Full application router: health, JSON API, OpenAPI document and Swagger UI.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(api_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
