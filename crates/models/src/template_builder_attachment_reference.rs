use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::template_builder_memory;

/// Attachment uploaded while a build was open; finalized on submit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_builder_attachment_reference")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_builder_memory_id: Uuid,
    pub attachment_id: Uuid,
    pub attachment_level: String,
    pub action_index: Option<i32>,
    pub description: Option<String>,
    pub sequence_order: i32,
    pub is_required: bool,
    pub is_finalized: bool,
    pub created_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { TemplateBuilderMemory }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::TemplateBuilderMemory => Entity::belongs_to(template_builder_memory::Entity)
                .from(Column::TemplateBuilderMemoryId)
                .to(template_builder_memory::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
