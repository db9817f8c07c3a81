use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "action_tool")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub action_id: Uuid,
    pub tool_id: Uuid,
    pub quantity_required: i32,
    pub notes: Option<String>,
    pub status: String,
    pub priority: String,
    pub sequence_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Action }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Action => Entity::belongs_to(action::Entity).from(Column::ActionId).to(action::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
