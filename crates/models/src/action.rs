use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::maintenance_action_set;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub maintenance_action_set_id: Uuid,
    pub template_action_item_id: Option<Uuid>,
    pub action_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub expected_billable_hours: Option<f64>,
    pub safety_notes: Option<String>,
    pub notes: Option<String>,
    pub sequence_order: i32,
    pub status: String,
    pub scheduled_start_time: Option<DateTimeWithTimeZone>,
    pub start_time: Option<DateTimeWithTimeZone>,
    pub end_time: Option<DateTimeWithTimeZone>,
    pub billable_hours: Option<f64>,
    pub completion_notes: Option<String>,
    pub assigned_user_id: Option<Uuid>,
    pub completed_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { MaintenanceActionSet }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::MaintenanceActionSet => Entity::belongs_to(maintenance_action_set::Entity)
                .from(Column::MaintenanceActionSetId)
                .to(maintenance_action_set::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
