use chrono::{DateTime, Duration, Utc};

use configs::PlannerConfig;
use models::enums::FrequencyType;
use models::{asset, maintenance_action_set, maintenance_plan};

use super::behavior::{base_result, baseline, PlannerBehavior};
use super::result::PlanningResult;

// about a thousand years; keeps Duration construction in range
const MAX_INTERVAL_HOURS: f64 = 8_760_000.0;

/// `hours` and `days` plans: due once the interval has passed since the baseline.
///
/// The interval is `delta_hours` hours for both frequencies. Without it, `hours`
/// plans fall back to [`PlannerConfig::default_hours_interval`] hours and `days`
/// plans to [`PlannerConfig::default_days_interval`] days.
#[derive(Debug, Clone, Copy)]
pub struct TimeBasedPlanner {
    config: PlannerConfig,
}

impl TimeBasedPlanner {
    pub fn new(config: PlannerConfig) -> Self { Self { config } }

    fn is_days(plan: &maintenance_plan::Model) -> bool {
        plan.frequency() == Some(FrequencyType::Days)
    }

    pub fn interval_hours(&self, plan: &maintenance_plan::Model) -> f64 {
        match plan.delta_hours {
            Some(h) if h > 0.0 => h,
            _ if Self::is_days(plan) => self.config.default_days_interval * 24.0,
            _ => self.config.default_hours_interval,
        }
    }

    pub fn interval(&self, plan: &maintenance_plan::Model) -> Duration {
        let hours = self.interval_hours(plan).min(MAX_INTERVAL_HOURS);
        Duration::milliseconds((hours * 3_600_000.0) as i64)
    }

    fn reason(&self, plan: &maintenance_plan::Model, due: bool, since: DateTime<Utc>, now: DateTime<Utc>) -> String {
        if !due {
            return format!("Maintenance not yet due. Last maintenance: {}", since.format("%Y-%m-%d"));
        }
        let hours_since = (now - since).num_milliseconds() as f64 / 3_600_000.0;
        let interval = self.interval_hours(plan);
        if Self::is_days(plan) {
            format!(
                "Days threshold ({}) exceeded. {:.1} days since last maintenance",
                interval / 24.0,
                hours_since / 24.0
            )
        } else {
            format!("Hours threshold ({}) exceeded. {:.1} hours since last maintenance", interval, hours_since)
        }
    }
}

impl PlannerBehavior for TimeBasedPlanner {
    fn evaluate(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
        now: DateTime<Utc>,
    ) -> PlanningResult {
        let mut r = base_result(plan, asset, last, now);
        let due = self.should_create_maintenance(plan, asset, last, now);
        r.needs_maintenance = due;
        r.due_date = self.calculate_due_date(plan, asset, last);
        r.reason = self.reason(plan, due, baseline(asset, last), now);
        r.recommended_start_date = due.then_some(now);
        r
    }

    fn calculate_due_date(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
    ) -> Option<DateTime<Utc>> {
        baseline(asset, last).checked_add_signed(self.interval(plan))
    }

    fn should_create_maintenance(
        &self,
        plan: &maintenance_plan::Model,
        asset: &asset::Model,
        last: Option<&maintenance_action_set::Model>,
        now: DateTime<Utc>,
    ) -> bool {
        now - baseline(asset, last) >= self.interval(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::behavior::fixtures::{asset, completed, plan};

    fn planner() -> TimeBasedPlanner {
        TimeBasedPlanner::new(PlannerConfig::default())
    }

    #[test]
    fn hours_plan_due_after_interval() {
        let now = Utc::now();
        let p = plan("hours", Some(100.0), [None; 4]);
        let a = asset(now - Duration::days(30), [None; 4]);
        let last = completed(&a, p.template_action_set_id, Some(p.id), now - Duration::hours(120), [None; 4]);

        let r = planner().evaluate(&p, &a, Some(&last), now);
        assert!(r.needs_maintenance);
        assert_eq!(r.reason, "Hours threshold (100) exceeded. 120.0 hours since last maintenance");
        assert_eq!(r.last_maintenance_id, Some(last.id));
        assert_eq!(r.due_date, Some(now - Duration::hours(20)));
        assert_eq!(r.recommended_start_date, Some(now));
        assert!((r.days_since_last_maintenance.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn not_due_reports_baseline_date() {
        let now = Utc::now();
        let p = plan("hours", Some(100.0), [None; 4]);
        let a = asset(now - Duration::days(30), [None; 4]);
        let ended = now - Duration::hours(10);
        let last = completed(&a, p.template_action_set_id, Some(p.id), ended, [None; 4]);

        let r = planner().evaluate(&p, &a, Some(&last), now);
        assert!(!r.needs_maintenance);
        assert_eq!(r.reason, format!("Maintenance not yet due. Last maintenance: {}", ended.format("%Y-%m-%d")));
        assert_eq!(r.recommended_start_date, None);
    }

    #[test]
    fn falls_back_to_asset_creation_and_defaults() {
        let now = Utc::now();
        let days = plan("days", None, [None; 4]);
        let young = asset(now - Duration::days(29), [None; 4]);
        let old = asset(now - Duration::days(31), [None; 4]);
        assert!(!planner().should_create_maintenance(&days, &young, None, now));
        let r = planner().evaluate(&days, &old, None, now);
        assert!(r.needs_maintenance);
        assert_eq!(r.reason, "Days threshold (30) exceeded. 31.0 days since last maintenance");

        let hours = plan("hours", None, [None; 4]);
        let a = asset(now - Duration::hours(25), [None; 4]);
        assert!(planner().should_create_maintenance(&hours, &a, None, now));
        assert_eq!(planner().calculate_due_date(&hours, &a, None), Some(now - Duration::hours(1)));
    }

    #[test]
    fn days_plan_reads_delta_hours() {
        let p = plan("days", Some(48.0), [None; 4]);
        assert_eq!(planner().interval(&p), Duration::hours(48));
    }
}
