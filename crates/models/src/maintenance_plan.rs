use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{FrequencyType, PlanStatus};
use crate::errors::ModelError;
use crate::template_action_set;
use crate::validation::{require_positive_opt, require_text};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_plan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub status: String,
    pub template_action_set_id: Uuid,
    pub frequency_type: String,
    pub delta_hours: Option<f64>,
    pub delta_m1: Option<f64>,
    pub delta_m2: Option<f64>,
    pub delta_m3: Option<f64>,
    pub delta_m4: Option<f64>,
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
    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active.as_str()
    }

    /// `None` for frequency strings no planner understands.
    pub fn frequency(&self) -> Option<FrequencyType> {
        self.frequency_type.parse().ok()
    }

    /// Threshold for meter `n` (1..=4).
    pub fn meter_threshold(&self, n: usize) -> Option<f64> {
        match n {
            1 => self.delta_m1,
            2 => self.delta_m2,
            3 => self.delta_m3,
            4 => self.delta_m4,
            _ => None,
        }
    }
}

/// Plan-level checks: a name, a known frequency, positive deltas and,
/// for meter plans, the threshold of the selected meter.
pub fn validate(
    name: &str,
    frequency_type: &str,
    delta_hours: Option<f64>,
    deltas: [Option<f64>; 4],
) -> Result<FrequencyType, ModelError> {
    require_text("name", name)?;
    let frequency: FrequencyType = frequency_type.parse()?;
    require_positive_opt("delta_hours", delta_hours)?;
    for (i, d) in deltas.iter().enumerate() {
        require_positive_opt(&format!("delta_m{}", i + 1), *d)?;
    }
    if let Some(n) = frequency.meter_index() {
        if deltas[n - 1].is_none() {
            return Err(ModelError::Validation(format!(
                "delta_m{n} is required for {} plans",
                frequency.as_str()
            )));
        }
    }
    Ok(frequency)
}

#[cfg(test)]
mod tests {
    use super::validate;

    #[test]
    fn meter_plan_needs_matching_threshold() {
        assert!(validate("Oil", "meter2", None, [Some(10.0), None, None, None]).is_err());
        assert!(validate("Oil", "meter2", None, [None, Some(250.0), None, None]).is_ok());
    }

    #[test]
    fn rejects_unknown_frequency_and_bad_delta() {
        assert!(validate("Oil", "fortnightly", None, [None; 4]).is_err());
        assert!(validate("Oil", "days", Some(0.0), [None; 4]).is_err());
        assert!(validate(" ", "days", Some(24.0), [None; 4]).is_err());
        assert!(validate("Oil", "days", None, [None; 4]).is_ok());
    }
}
