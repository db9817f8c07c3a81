use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validation::{require_positive_opt, require_text};

/// Versioned maintenance procedure.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_action_set")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub safety_review_required: bool,
    pub staff_count: Option<i32>,
    pub parts_cost: Option<f64>,
    pub labor_hours: Option<f64>,
    pub revision: Option<String>,
    pub prior_revision_id: Option<Uuid>,
    pub is_active: bool,
    pub maintenance_plan_id: Option<Uuid>,
    pub asset_type_id: Option<Uuid>,
    pub make_model_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    PriorRevision,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::PriorRevision => Entity::belongs_to(Entity).from(Column::PriorRevisionId).to(Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(task_name: &str, estimated_duration: Option<f64>) -> Result<(), ModelError> {
    require_text("task_name", task_name)?;
    require_positive_opt("estimated_duration", estimated_duration)
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid, active: bool) -> Result<Option<Model>, ModelError> {
    let Some(found) = Entity::find_by_id(id).one(db).await? else { return Ok(None) };
    let mut am: ActiveModel = found.into();
    am.is_active = Set(active);
    am.updated_at = Set(Utc::now().into());
    Ok(Some(am.update(db).await?))
}
