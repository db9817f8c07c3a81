use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Outcome of evaluating one asset against one plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningResult {
    pub asset_id: Uuid,
    pub maintenance_plan_id: Uuid,
    pub needs_maintenance: bool,
    pub reason: String,
    pub due_date: Option<DateTime<Utc>>,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub last_maintenance_id: Option<Uuid>,
    pub current_meter_readings: BTreeMap<String, Option<f64>>,
    pub meter_readings_at_last_maintenance: BTreeMap<String, Option<f64>>,
    pub days_since_last_maintenance: Option<f64>,
    /// Only the meter the plan tracks.
    pub meter_delta: BTreeMap<String, f64>,
    pub recommended_start_date: Option<DateTime<Utc>>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_event_id: Option<Uuid>,
}

impl PlanningResult {
    pub fn new(asset_id: Uuid, maintenance_plan_id: Uuid) -> Self {
        Self {
            asset_id,
            maintenance_plan_id,
            needs_maintenance: false,
            reason: String::new(),
            due_date: None,
            last_maintenance_date: None,
            last_maintenance_id: None,
            current_meter_readings: meter_map([None; 4]),
            meter_readings_at_last_maintenance: meter_map([None; 4]),
            days_since_last_maintenance: None,
            meter_delta: BTreeMap::new(),
            recommended_start_date: None,
            errors: Vec::new(),
            created_event_id: None,
        }
    }

    /// Not-due result carrying the failure that prevented evaluation.
    pub fn error(asset_id: Uuid, maintenance_plan_id: Uuid, err: impl std::fmt::Display) -> Self {
        let msg = err.to_string();
        let mut r = Self::new(asset_id, maintenance_plan_id);
        r.reason = format!("Error analyzing asset: {msg}");
        r.errors.push(msg);
        r
    }
}

pub fn meter_key(n: usize) -> String {
    format!("meter{n}")
}

/// `meter1`..`meter4` keyed readings.
pub fn meter_map(readings: [Option<f64>; 4]) -> BTreeMap<String, Option<f64>> {
    readings.iter().enumerate().map(|(i, v)| (meter_key(i + 1), *v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_all_meter_keys() {
        let r = PlanningResult::new(Uuid::nil(), Uuid::nil());
        let v = serde_json::to_value(&r).unwrap();
        let meters = v["current_meter_readings"].as_object().unwrap();
        assert_eq!(meters.keys().cloned().collect::<Vec<_>>(), vec!["meter1", "meter2", "meter3", "meter4"]);
        assert!(v.get("created_event_id").is_none());
    }

    #[test]
    fn error_result_is_not_due() {
        let r = PlanningResult::error(Uuid::nil(), Uuid::nil(), "boom");
        assert!(!r.needs_maintenance);
        assert_eq!(r.reason, "Error analyzing asset: boom");
        assert_eq!(r.errors, vec!["boom".to_string()]);
    }
}
