use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::BuildStatus;
use crate::errors::ModelError;
use crate::template_action_set;

/// Draft area for a template; `build_state` holds the JSON document being edited.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_builder_memory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub build_type: Option<String>,
    pub build_status: String,
    pub is_revision: bool,
    pub src_revision_id: Option<Uuid>,
    pub src_revision_number: Option<i32>,
    pub template_action_set_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub build_state: String,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

impl Model {
    pub fn status(&self) -> Result<BuildStatus, ModelError> {
        self.build_status.parse()
    }
}
