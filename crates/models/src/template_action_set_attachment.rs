use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template_action_set;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_action_set_attachment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_action_set_id: Uuid,
    pub attachment_id: Uuid,
    pub attachment_type: String,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub display_order: i32,
    pub sequence_order: i32,
    pub is_required: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { TemplateActionSet }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::TemplateActionSet => Entity::belongs_to(template_action_set::Entity)
                .from(Column::TemplateActionSetId)
                .to(template_action_set::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
