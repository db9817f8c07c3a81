use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{asset, maintenance_plan, template_action_set};

/// Asset-specific maintenance event instantiated from a template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_action_set")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub asset_id: Uuid,
    pub template_action_set_id: Option<Uuid>,
    pub maintenance_plan_id: Option<Uuid>,
    pub task_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub safety_review_required: bool,
    pub staff_count: Option<i32>,
    pub parts_cost: Option<f64>,
    pub labor_hours: Option<f64>,
    pub planned_start_datetime: Option<DateTimeWithTimeZone>,
    pub status: String,
    pub priority: String,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub actual_billable_hours: Option<f64>,
    pub assigned_user_id: Option<Uuid>,
    pub assigned_by_id: Option<Uuid>,
    pub completed_by_id: Option<Uuid>,
    pub completion_notes: Option<String>,
    /// Asset meter readings captured at completion.
    pub meter1: Option<f64>,
    pub meter2: Option<f64>,
    pub meter3: Option<f64>,
    pub meter4: Option<f64>,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Asset,
    TemplateActionSet,
    MaintenancePlan,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Asset => Entity::belongs_to(asset::Entity).from(Column::AssetId).to(asset::Column::Id).into(),
            Relation::TemplateActionSet => Entity::belongs_to(template_action_set::Entity)
                .from(Column::TemplateActionSetId)
                .to(template_action_set::Column::Id)
                .into(),
            Relation::MaintenancePlan => Entity::belongs_to(maintenance_plan::Entity)
                .from(Column::MaintenancePlanId)
                .to(maintenance_plan::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn meter(&self, n: usize) -> Option<f64> {
        match n {
            1 => self.meter1,
            2 => self.meter2,
            3 => self.meter3,
            4 => self.meter4,
            _ => None,
        }
    }

    pub fn meters(&self) -> [Option<f64>; 4] {
        [self.meter1, self.meter2, self.meter3, self.meter4]
    }
}
