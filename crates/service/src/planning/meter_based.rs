use chrono::{DateTime, Utc};

use models::{asset, maintenance_action_set, maintenance_plan};

use super::behavior::{base_result, PlannerBehavior};
use super::result::{meter_key, PlanningResult};

/// `meter1`..`meter4` plans: due once the tracked meter advanced by the plan's
/// `delta_mN` since the last completed event.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeterBasedPlanner;

/// Reading comparison for one meter.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MeterProgress {
    current: f64,
    /// Reading the delta is measured from; 0 when unknown or after a rollover.
    last: f64,
    delta: f64,
}

fn meter_slot(plan: &maintenance_plan::Model) -> Option<usize> {
    plan.frequency().and_then(|f| f.meter_index())
}

fn progress(n: usize, asset: &asset::Model, last: Option<&maintenance_action_set::Model>) -> Option<MeterProgress> {
    let current = asset.meter(n)?;
    let mut base = last.and_then(|e| e.meter(n)).unwrap_or(0.0);
    let mut delta = current - base;
    if delta < 0.0 {
        // meter reset or replaced
        base = 0.0;
        delta = current;
    }
    Some(MeterProgress { current, last: base, delta })
}

impl PlannerBehavior for MeterBasedPlanner {
    fn evaluate(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
        now: DateTime<Utc>,
    ) -> PlanningResult {
        let mut r = base_result(plan, asset, last, now);
        let Some(n) = meter_slot(plan) else {
            r.reason = format!("Frequency {} is not meter based", plan.frequency_type);
            return r;
        };
        let key = meter_key(n);
        let threshold = plan.meter_threshold(n);
        let progress = progress(n, asset, last);
        if let Some(p) = progress {
            r.meter_delta.insert(key.clone(), p.delta);
        }
        let due = self.should_create_maintenance(plan, asset, last, now);
        r.needs_maintenance = due;
        r.due_date = self.calculate_due_date(plan, asset, last);
        r.recommended_start_date = due.then_some(now);

        let had_reading = last.and_then(|e| e.meter(n)).is_some();
        r.reason = match (progress, threshold) {
            (None, _) => format!("No current {key} reading available"),
            (Some(_), None) => format!("No {key} threshold configured"),
            (Some(p), Some(t)) if due => format!(
                "{} threshold ({}) exceeded. Delta: {:.1} (Current: {:.1}, Last: {:.1})",
                key.to_uppercase(),
                t,
                p.delta,
                p.current,
                p.last
            ),
            (Some(p), Some(t)) if !had_reading => {
                format!("Meter threshold not yet reached. Current: {:.1}, Threshold: {}", p.current, t)
            }
            (Some(p), Some(t)) => format!("Meter threshold not yet reached. Delta: {:.1}, Threshold: {}", p.delta, t),
        };
        r
    }

    /// Meter plans have no calendar due date.
    fn calculate_due_date(
        &self,
        _plan: &maintenance_plan::Model,
        _asset: &asset::Model,
        _last: Option<&maintenance_action_set::Model>,
    ) -> Option<DateTime<Utc>> {
        None
    }

    fn should_create_maintenance(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
        _now: DateTime<Utc>,
    ) -> bool {
        let Some(n) = meter_slot(plan) else { return false };
        match (progress(n, asset, last), plan.meter_threshold(n)) {
            (Some(p), Some(t)) => p.delta >= t,
            _ => false,
        }
    }
}
