use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proto_action_item;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proto_action_attachment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub proto_action_item_id: Uuid,
    pub attachment_id: Uuid,
    pub attachment_type: String,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub display_order: i32,
    pub sequence_order: i32,
    pub is_required: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { ProtoActionItem }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ProtoActionItem => Entity::belongs_to(proto_action_item::Entity)
                .from(Column::ProtoActionItemId)
                .to(proto_action_item::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
