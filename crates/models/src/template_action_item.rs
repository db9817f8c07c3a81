use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{proto_action_item, template_action_set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_action_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_action_set_id: Uuid,
    pub proto_action_item_id: Option<Uuid>,
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
    pub sequence_order: i32,
    pub revision: Option<String>,
    pub prior_revision_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    TemplateActionSet,
    ProtoActionItem,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::TemplateActionSet => Entity::belongs_to(template_action_set::Entity)
                .from(Column::TemplateActionSetId)
                .to(template_action_set::Column::Id)
                .into(),
            Relation::ProtoActionItem => Entity::belongs_to(proto_action_item::Entity)
                .from(Column::ProtoActionItemId)
                .to(proto_action_item::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
