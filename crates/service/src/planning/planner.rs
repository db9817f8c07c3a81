use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use configs::PlannerConfig;
use models::{asset, maintenance_plan, template_action_set};

use super::behavior::behavior_for;
use super::repository::PlanningRepository;
use super::result::PlanningResult;
use crate::errors::ServiceError;

const DUPLICATE_REASON: &str = "Duplicate prevention: Existing Planned or In Progress maintenance event found";

/// A plan with its template and the assets it applies to.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub plan: maintenance_plan::Model,
    pub template: template_action_set::Model,
    pub assets: Vec<asset::Model>,
}

impl PlanContext {
    pub fn active_assets(&self) -> impl Iterator<Item = &asset::Model> {
        self.assets.iter().filter(|a| a.is_active)
    }
}

/// Runs plans against their assets and turns due results into events.
pub struct MaintenancePlanner<R: PlanningRepository> {
    repo: Arc<R>,
    config: PlannerConfig,
}

impl<R: PlanningRepository> MaintenancePlanner<R> {
    pub fn new(repo: Arc<R>, config: PlannerConfig) -> Self { Self { repo, config } }

    pub async fn load_context(&self, plan_id: Uuid) -> Result<PlanContext, ServiceError> {
        let plan = self.repo.plan(plan_id).await?.ok_or_else(|| ServiceError::not_found("maintenance plan"))?;
        self.context_for(plan).await
    }

    async fn context_for(&self, plan: maintenance_plan::Model) -> Result<PlanContext, ServiceError> {
        let template = self
            .repo
            .template(plan.template_action_set_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("template"))?;
        let assets = self.repo.matching_assets(&plan).await?;
        Ok(PlanContext { plan, template, assets })
    }

    pub async fn plan_maintenance(&self, plan_id: Uuid) -> Result<Vec<PlanningResult>, ServiceError> {
        self.plan_maintenance_at(plan_id, Utc::now()).await
    }

    /// Evaluates every active matching asset of the plan as of `now`.
    #[instrument(skip(self))]
    pub async fn plan_maintenance_at(&self, plan_id: Uuid, now: DateTime<Utc>) -> Result<Vec<PlanningResult>, ServiceError> {
        let plan = self.repo.plan(plan_id).await?.ok_or_else(|| ServiceError::not_found("maintenance plan"))?;
        self.plan_one(plan, now).await
    }

    async fn plan_one(&self, plan: maintenance_plan::Model, now: DateTime<Utc>) -> Result<Vec<PlanningResult>, ServiceError> {
        if !plan.is_active() {
            info!(plan_id = %plan.id, "plan is not active, skipping");
            return Ok(Vec::new());
        }
        let Some(frequency) = plan.frequency() else {
            warn!(plan_id = %plan.id, frequency = %plan.frequency_type, "no planner for frequency");
            return Ok(Vec::new());
        };
        let behavior = behavior_for(frequency, self.config);
        let ctx = self.context_for(plan).await?;

        let mut results = Vec::new();
        for asset in ctx.active_assets() {
            let mut result = match self.repo.last_completed_event(asset.id, ctx.template.id).await {
                Ok(last) => behavior.evaluate(&ctx.plan, asset, last.as_ref(), now),
                Err(e) => {
                    warn!(asset_id = %asset.id, plan_id = %ctx.plan.id, error = %e, "asset evaluation failed");
                    PlanningResult::error(asset.id, ctx.plan.id, e)
                }
            };
            if result.needs_maintenance {
                match self.repo.has_open_event(asset.id, ctx.plan.id).await {
                    Ok(true) => {
                        debug!(asset_id = %asset.id, plan_id = %ctx.plan.id, "duplicate event prevented");
                        result.needs_maintenance = false;
                        result.reason = DUPLICATE_REASON.to_string();
                    }
                    Ok(false) => {}
                    Err(e) => {
                        result = PlanningResult::error(asset.id, ctx.plan.id, e);
                    }
                }
            }
            results.push(result);
        }
        info!(
            plan_id = %ctx.plan.id,
            evaluated = results.len(),
            due = results.iter().filter(|r| r.needs_maintenance).count(),
            "plan evaluated"
        );
        Ok(results)
    }

    pub async fn plan_all_active_plans(&self) -> Result<Vec<PlanningResult>, ServiceError> {
        self.plan_all_active_plans_at(Utc::now()).await
    }

    /// Results of every active plan. A plan that fails is logged and left out.
    #[instrument(skip(self))]
    pub async fn plan_all_active_plans_at(&self, now: DateTime<Utc>) -> Result<Vec<PlanningResult>, ServiceError> {
        let plans = self.repo.active_plans().await?;
        info!(plans = plans.len(), "planning active plans");
        let mut all = Vec::new();
        for plan in plans {
            let plan_id = plan.id;
            match self.plan_one(plan, now).await {
                Ok(mut r) => all.append(&mut r),
                Err(e) => error!(plan_id = %plan_id, error = %e, "planning failed for plan"),
            }
        }
        Ok(all)
    }

    pub async fn assets_needing_maintenance(&self, plan_id: Uuid) -> Result<Vec<PlanningResult>, ServiceError> {
        let results = self.plan_maintenance(plan_id).await?;
        Ok(results.into_iter().filter(|r| r.needs_maintenance).collect())
    }

    /// Creates one event per due result. Duplicates are re-checked first; creation
    /// failures are recorded on the result and do not stop the batch.
    #[instrument(skip(self, results), fields(results = results.len()))]
    pub async fn create_events_from_results(
        &self,
        results: &mut [PlanningResult],
        user_id: Option<Uuid>,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let mut plans: HashMap<Uuid, maintenance_plan::Model> = HashMap::new();
        let mut created = Vec::new();
        for result in results.iter_mut().filter(|r| r.needs_maintenance) {
            match self.create_event_for(result, &mut plans, user_id).await {
                Ok(Some(id)) => {
                    info!(event_id = %id, asset_id = %result.asset_id, plan_id = %result.maintenance_plan_id, "maintenance event created from plan");
                    result.created_event_id = Some(id);
                    created.push(id);
                }
                Ok(None) => {}
                Err(e) => {
                    error!(asset_id = %result.asset_id, plan_id = %result.maintenance_plan_id, error = %e, "event creation failed");
                    result.errors.push(format!("Error creating event: {e}"));
                }
            }
        }
        Ok(created)
    }

    /// `None` when an open event already covers the asset.
    async fn create_event_for(
        &self,
        result: &PlanningResult,
        plans: &mut HashMap<Uuid, maintenance_plan::Model>,
        user_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, ServiceError> {
        let plan = match plans.get(&result.maintenance_plan_id) {
            Some(p) => p.clone(),
            None => {
                let p = self
                    .repo
                    .plan(result.maintenance_plan_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("maintenance plan"))?;
                plans.insert(p.id, p.clone());
                p
            }
        };
        if self.repo.has_open_event(result.asset_id, plan.id).await? {
            warn!(asset_id = %result.asset_id, plan_id = %plan.id, "duplicate event prevented");
            return Ok(None);
        }
        let start = result.recommended_start_date.unwrap_or_else(Utc::now);
        Ok(Some(self.repo.create_event(&plan, result.asset_id, start, user_id).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::behavior::fixtures::{asset, completed, plan};
    use crate::planning::repository::mock::InMemoryPlanningRepository;
    use chrono::Duration;

    fn template(id: Uuid) -> template_action_set::Model {
        let now = Utc::now().into();
        template_action_set::Model {
            id,
            task_name: "Service".into(),
            description: None,
            estimated_duration: None,
            safety_review_required: false,
            staff_count: None,
            parts_cost: None,
            labor_hours: None,
            revision: Some("0".into()),
            prior_revision_id: None,
            is_active: true,
            maintenance_plan_id: None,
            asset_type_id: None,
            make_model_id: None,
            created_by_id: None,
            updated_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup(p: &maintenance_plan::Model, assets: Vec<asset::Model>) -> Arc<InMemoryPlanningRepository> {
        let repo = Arc::new(InMemoryPlanningRepository::default());
        repo.plans.write().await.push(p.clone());
        repo.templates.write().await.push(template(p.template_action_set_id));
        *repo.assets.write().await = assets;
        repo
    }

    #[tokio::test]
    async fn skips_inactive_plans_assets_and_unknown_frequencies() -> Result<(), anyhow::Error> {
        let now = Utc::now();
        let mut p = plan("days", Some(24.0), [None; 4]);
        let mut idle = asset(now - Duration::days(5), [None; 4]);
        idle.is_active = false;
        let busy = asset(now - Duration::days(5), [None; 4]);
        let repo = setup(&p, vec![idle, busy.clone()]).await;
        let planner = MaintenancePlanner::new(repo.clone(), PlannerConfig::default());

        let results = planner.plan_maintenance_at(p.id, now).await?;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].asset_id, busy.id);
        assert!(results[0].needs_maintenance);

        p.status = "Inactive".into();
        repo.plans.write().await[0] = p.clone();
        assert!(planner.plan_maintenance_at(p.id, now).await?.is_empty());

        p.status = "Active".into();
        p.frequency_type = "fortnightly".into();
        repo.plans.write().await[0] = p.clone();
        assert!(planner.plan_maintenance_at(p.id, now).await?.is_empty());

        assert!(matches!(planner.plan_maintenance_at(Uuid::new_v4(), now).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_prevention_and_event_creation() -> Result<(), anyhow::Error> {
        let now = Utc::now();
        let p = plan("meter1", None, [Some(100.0), None, None, None]);
        let a = asset(now - Duration::days(5), [Some(150.0), None, None, None]);
        let b = asset(now - Duration::days(5), [Some(400.0), None, None, None]);
        let repo = setup(&p, vec![a.clone(), b.clone()]).await;
        let planner = MaintenancePlanner::new(repo.clone(), PlannerConfig::default());

        let mut results = planner.plan_maintenance_at(p.id, now).await?;
        assert!(results.iter().all(|r| r.needs_maintenance));
        let created = planner.create_events_from_results(&mut results, None).await?;
        assert_eq!(created.len(), 2);
        assert!(results.iter().all(|r| r.created_event_id.is_some()));

        let again = planner.plan_maintenance_at(p.id, now).await?;
        assert!(again.iter().all(|r| !r.needs_maintenance));
        assert!(again.iter().all(|r| r.reason == DUPLICATE_REASON));

        // results computed before the events existed are re-checked
        let created = planner.create_events_from_results(&mut results, None).await?;
        assert!(created.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failures_are_recorded_per_asset() -> Result<(), anyhow::Error> {
        let now = Utc::now();
        let p = plan("hours", Some(1.0), [None; 4]);
        let ok = asset(now - Duration::days(1), [None; 4]);
        let broken = asset(now - Duration::days(1), [None; 4]);
        let unlucky = asset(now - Duration::days(1), [None; 4]);
        let repo = setup(&p, vec![ok.clone(), broken.clone(), unlucky.clone()]).await;
        repo.unreadable_assets.write().await.push(broken.id);
        repo.failing_assets.write().await.push(unlucky.id);
        let planner = MaintenancePlanner::new(repo.clone(), PlannerConfig::default());

        let mut results = planner.plan_maintenance_at(p.id, now).await?;
        let err = results.iter().find(|r| r.asset_id == broken.id).expect("result for broken asset");
        assert!(!err.needs_maintenance);
        assert_eq!(err.reason, "Error analyzing asset: database error: history unavailable");

        let created = planner.create_events_from_results(&mut results, None).await?;
        assert_eq!(created.len(), 1);
        let failed = results.iter().find(|r| r.asset_id == unlucky.id).expect("result for unlucky asset");
        assert_eq!(failed.errors, vec!["Error creating event: database error: event insert failed".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn lookup_failure_is_recorded_and_batch_continues() -> Result<(), anyhow::Error> {
        let now = Utc::now();
        let p = plan("meter1", None, [Some(100.0), None, None, None]);
        let a = asset(now, [Some(200.0), None, None, None]);
        let b = asset(now, [Some(200.0), None, None, None]);
        let c = asset(now, [Some(200.0), None, None, None]);
        let repo = setup(&p, vec![a.clone(), b.clone(), c.clone()]).await;
        let planner = MaintenancePlanner::new(repo.clone(), PlannerConfig::default());

        let mut results = planner.plan_maintenance_at(p.id, now).await?;
        assert_eq!(results.iter().filter(|r| r.needs_maintenance).count(), 3);
        repo.unreachable_assets.write().await.push(b.id);

        let created = planner.create_events_from_results(&mut results, None).await?;
        assert_eq!(created.len(), 2);
        assert_eq!(repo.events.read().await.len(), 2);
        let by_asset = |id: Uuid| results.iter().find(|r| r.asset_id == id).cloned();
        let failed = by_asset(b.id).expect("result for b");
        assert_eq!(failed.created_event_id, None);
        assert_eq!(failed.errors, vec!["Error creating event: database error: lookup timed out".to_string()]);
        assert!(by_asset(a.id).and_then(|r| r.created_event_id).is_some());
        assert!(by_asset(c.id).and_then(|r| r.created_event_id).is_some());
        Ok(())
    }

    #[tokio::test]
    async fn missing_plan_is_recorded_on_result() -> Result<(), anyhow::Error> {
        let now = Utc::now();
        let p = plan("hours", Some(1.0), [None; 4]);
        let a = asset(now - Duration::days(1), [None; 4]);
        let repo = setup(&p, vec![a]).await;
        let planner = MaintenancePlanner::new(repo.clone(), PlannerConfig::default());

        let mut results = planner.plan_maintenance_at(p.id, now).await?;
        repo.plans.write().await.clear();
        let created = planner.create_events_from_results(&mut results, None).await?;
        assert!(created.is_empty());
        assert_eq!(results[0].errors, vec!["Error creating event: not found: maintenance plan not found".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn all_active_plans_and_history() -> Result<(), anyhow::Error> {
        let now = Utc::now();
        let p = plan("days", Some(240.0), [None; 4]);
        let a = asset(now - Duration::days(100), [None; 4]);
        let repo = setup(&p, vec![a.clone()]).await;
        repo.events.write().await.push(completed(&a, p.template_action_set_id, Some(p.id), now - Duration::days(2), [None; 4]));

        let mut orphan = plan("days", None, [None; 4]);
        orphan.template_action_set_id = Uuid::new_v4();
        repo.plans.write().await.push(orphan);

        let planner = MaintenancePlanner::new(repo, PlannerConfig::default());
        let results = planner.plan_all_active_plans_at(now).await?;
        assert_eq!(results.len(), 1);
        assert!(!results[0].needs_maintenance);
        assert!(results[0].last_maintenance_id.is_some());
        Ok(())
    }
}
