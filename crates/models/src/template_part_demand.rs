use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template_action_item;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_part_demand")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_action_item_id: Uuid,
    pub part_id: Uuid,
    pub quantity_required: f64,
    pub expected_cost: Option<f64>,
    pub notes: Option<String>,
    pub is_optional: bool,
    pub sequence_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { TemplateActionItem }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::TemplateActionItem => Entity::belongs_to(template_action_item::Entity)
                .from(Column::TemplateActionItemId)
                .to(template_action_item::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
