use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validation::{require_positive_opt, require_staff_count, require_text};

/// Library-level reusable action definition.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proto_action_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub action_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub expected_billable_hours: Option<f64>,
    pub safety_notes: Option<String>,
    pub notes: Option<String>,
    pub is_required: bool,
    pub instructions: Option<String>,
    pub instructions_type: Option<String>,
    pub minimum_staff_count: i32,
    pub required_skills: Option<String>,
    pub revision: Option<String>,
    pub prior_revision_id: Option<Uuid>,
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

pub fn validate(action_name: &str, minimum_staff_count: i32, estimated_duration: Option<f64>) -> Result<(), ModelError> {
    require_text("action_name", action_name)?;
    require_staff_count(minimum_staff_count)?;
    require_positive_opt("estimated_duration", estimated_duration)
}
