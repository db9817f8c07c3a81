use chrono::{DateTime, Utc};

use configs::PlannerConfig;
use models::enums::FrequencyType;
use models::{asset, maintenance_action_set, maintenance_plan};

use super::meter_based::MeterBasedPlanner;
use super::result::PlanningResult;
use super::time_based::TimeBasedPlanner;

/// Due-ness rules for one family of plan frequencies.
///
/// `last` is the newest completed event for the asset and the plan's template.
pub trait PlannerBehavior: Send + Sync {
    fn evaluate(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
        now: DateTime<Utc>,
    ) -> PlanningResult;

    fn calculate_due_date(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
    ) -> Option<DateTime<Utc>>;

    fn should_create_maintenance(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
        now: DateTime<Utc>,
    ) -> bool;
}

pub fn behavior_for(frequency: FrequencyType, config: PlannerConfig) -> Box<dyn PlannerBehavior> {
    if frequency.is_time_based() {
        Box::new(TimeBasedPlanner::new(config))
    } else {
        Box::new(MeterBasedPlanner)
    }
}

/// End of the last completed event, else when the asset was registered.
pub(crate) fn baseline(asset: &asset::Model, last: Option<&maintenance_action_set::Model>) -> DateTime<Utc> {
    last.and_then(|e| e.end_date)
        .unwrap_or(asset.created_at)
        .with_timezone(&Utc)
}

pub(crate) fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 86_400_000.0
}

/// Fields both behaviors fill the same way.
pub(crate) fn base_result(
    plan: &maintenance_plan::Model,
    asset: &asset::Model,
    last: Option<&maintenance_action_set::Model>,
    now: DateTime<Utc>,
) -> PlanningResult {
    let mut r = PlanningResult::new(asset.id, plan.id);
    let since = baseline(asset, last);
    r.last_maintenance_date = Some(since);
    r.last_maintenance_id = last.map(|e| e.id);
    r.days_since_last_maintenance = Some(days_between(since, now));
    r.current_meter_readings = super::result::meter_map(asset.meters());
    if let Some(e) = last {
        r.meter_readings_at_last_maintenance = super::result::meter_map(e.meters());
    }
    r
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    use models::{asset, maintenance_action_set, maintenance_plan};

    pub fn plan(frequency: &str, delta_hours: Option<f64>, deltas: [Option<f64>; 4]) -> maintenance_plan::Model {
        let now = Utc::now().into();
        maintenance_plan::Model {
            id: Uuid::new_v4(),
            name: "Plan".into(),
            description: None,
            asset_type_id: None,
            model_id: None,
            status: "Active".into(),
            template_action_set_id: Uuid::new_v4(),
            frequency_type: frequency.into(),
            delta_hours,
            delta_m1: deltas[0],
            delta_m2: deltas[1],
            delta_m3: deltas[2],
            delta_m4: deltas[3],
            created_by_id: None,
            updated_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn asset(created: DateTime<Utc>, meters: [Option<f64>; 4]) -> asset::Model {
        asset::Model {
            id: Uuid::new_v4(),
            name: "Truck".into(),
            serial_number: Uuid::new_v4().to_string(),
            asset_type_id: None,
            make_model_id: None,
            meter1: meters[0],
            meter2: meters[1],
            meter3: meters[2],
            meter4: meters[3],
            is_active: true,
            created_by_id: None,
            updated_by_id: None,
            created_at: created.into(),
            updated_at: created.into(),
        }
    }

    pub fn completed(
        asset: &asset::Model,
        template_id: Uuid,
        plan_id: Option<Uuid>,
        ended: DateTime<Utc>,
        meters: [Option<f64>; 4],
    ) -> maintenance_action_set::Model {
        maintenance_action_set::Model {
            id: Uuid::new_v4(),
            asset_id: asset.id,
            template_action_set_id: Some(template_id),
            maintenance_plan_id: plan_id,
            task_name: "Service".into(),
            description: None,
            estimated_duration: None,
            safety_review_required: false,
            staff_count: None,
            parts_cost: None,
            labor_hours: None,
            planned_start_datetime: None,
            status: "Completed".into(),
            priority: "Medium".into(),
            start_date: Some((ended - Duration::hours(1)).into()),
            end_date: Some(ended.into()),
            actual_billable_hours: None,
            assigned_user_id: None,
            assigned_by_id: None,
            completed_by_id: None,
            completion_notes: None,
            meter1: meters[0],
            meter2: meters[1],
            meter3: meters[2],
            meter4: meters[3],
            created_by_id: None,
            updated_by_id: None,
            created_at: ended.into(),
            updated_at: ended.into(),
        }
    }
}
