use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use models::enums::{EventStatus, PlanStatus};
use models::{asset, maintenance_action_set, maintenance_plan, template_action_set};

use crate::errors::ServiceError;
use crate::maintenance::{self, CreateFromTemplate};

/// Data the planner reads and the one write it performs.
#[async_trait]
pub trait PlanningRepository: Send + Sync {
    async fn plan(&self, id: Uuid) -> Result<Option<maintenance_plan::Model>, ServiceError>;
    async fn active_plans(&self) -> Result<Vec<maintenance_plan::Model>, ServiceError>;
    async fn template(&self, id: Uuid) -> Result<Option<template_action_set::Model>, ServiceError>;
    /// Assets of the plan's asset type and model, when the plan sets them. Includes inactive assets.
    async fn matching_assets(&self, plan: &maintenance_plan::Model) -> Result<Vec<asset::Model>, ServiceError>;
    /// Newest `Completed` event of the asset for the template, by `end_date`.
    async fn last_completed_event(&self, asset_id: Uuid, template_id: Uuid) -> Result<Option<maintenance_action_set::Model>, ServiceError>;
    /// Whether a `Planned` or `In Progress` event exists for the asset and plan.
    async fn has_open_event(&self, asset_id: Uuid, plan_id: Uuid) -> Result<bool, ServiceError>;
    /// Instantiates the plan's template for the asset and returns the event id.
    async fn create_event(
        &self,
        plan: &maintenance_plan::Model,
        asset_id: Uuid,
        planned_start: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> Result<Uuid, ServiceError>;
}

fn open_statuses() -> Vec<&'static str> {
    EventStatus::OPEN.iter().map(|s| s.as_str()).collect()
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmPlanningRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl PlanningRepository for SeaOrmPlanningRepository {
    async fn plan(&self, id: Uuid) -> Result<Option<maintenance_plan::Model>, ServiceError> {
        Ok(maintenance_plan::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn active_plans(&self) -> Result<Vec<maintenance_plan::Model>, ServiceError> {
        Ok(maintenance_plan::Entity::find()
            .filter(maintenance_plan::Column::Status.eq(PlanStatus::Active.as_str()))
            .order_by_asc(maintenance_plan::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn template(&self, id: Uuid) -> Result<Option<template_action_set::Model>, ServiceError> {
        Ok(template_action_set::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn matching_assets(&self, plan: &maintenance_plan::Model) -> Result<Vec<asset::Model>, ServiceError> {
        let mut q = asset::Entity::find();
        if let Some(t) = plan.asset_type_id {
            q = q.filter(asset::Column::AssetTypeId.eq(t));
        }
        if let Some(m) = plan.model_id {
            q = q.filter(asset::Column::MakeModelId.eq(m));
        }
        Ok(q.order_by_asc(asset::Column::Name).all(&self.db).await?)
    }

    async fn last_completed_event(&self, asset_id: Uuid, template_id: Uuid) -> Result<Option<maintenance_action_set::Model>, ServiceError> {
        Ok(maintenance_action_set::Entity::find()
            .filter(maintenance_action_set::Column::AssetId.eq(asset_id))
            .filter(maintenance_action_set::Column::TemplateActionSetId.eq(template_id))
            .filter(maintenance_action_set::Column::Status.eq(EventStatus::Completed.as_str()))
            .order_by_desc(maintenance_action_set::Column::EndDate)
            .one(&self.db)
            .await?)
    }

    async fn has_open_event(&self, asset_id: Uuid, plan_id: Uuid) -> Result<bool, ServiceError> {
        let found = maintenance_action_set::Entity::find()
            .filter(maintenance_action_set::Column::AssetId.eq(asset_id))
            .filter(maintenance_action_set::Column::MaintenancePlanId.eq(plan_id))
            .filter(maintenance_action_set::Column::Status.is_in(open_statuses()))
            .one(&self.db)
            .await?;
        Ok(found.is_some())
    }

    async fn create_event(
        &self,
        plan: &maintenance_plan::Model,
        asset_id: Uuid,
        planned_start: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> Result<Uuid, ServiceError> {
        let input = CreateFromTemplate {
            template_id: plan.template_action_set_id,
            asset_id,
            planned_start: Some(planned_start.into()),
            plan_id: Some(plan.id),
            user_id,
            assigned_user_id: None,
            priority: None,
        };
        Ok(maintenance::create_from_template(&self.db, &input).await?.event.id)
    }
}

/// In-memory repository for planner tests and dry runs.
pub mod mock {
    use super::*;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct InMemoryPlanningRepository {
        pub plans: RwLock<Vec<maintenance_plan::Model>>,
        pub templates: RwLock<Vec<template_action_set::Model>>,
        pub assets: RwLock<Vec<asset::Model>>,
        pub events: RwLock<Vec<maintenance_action_set::Model>>,
        /// Asset ids whose event creation fails.
        pub failing_assets: RwLock<Vec<Uuid>>,
        /// Asset ids whose history lookup fails.
        pub unreadable_assets: RwLock<Vec<Uuid>>,
        /// Asset ids whose open-event lookup fails.
        pub unreachable_assets: RwLock<Vec<Uuid>>,
    }

    fn planned_event(plan: &maintenance_plan::Model, asset_id: Uuid, start: DateTime<Utc>, user_id: Option<Uuid>) -> maintenance_action_set::Model {
        let now = Utc::now().into();
        maintenance_action_set::Model {
            id: Uuid::new_v4(),
            asset_id,
            template_action_set_id: Some(plan.template_action_set_id),
            maintenance_plan_id: Some(plan.id),
            task_name: plan.name.clone(),
            description: None,
            estimated_duration: None,
            safety_review_required: false,
            staff_count: None,
            parts_cost: None,
            labor_hours: None,
            planned_start_datetime: Some(start.into()),
            status: EventStatus::Planned.as_str().to_string(),
            priority: models::enums::Priority::Medium.as_str().to_string(),
            start_date: None,
            end_date: None,
            actual_billable_hours: None,
            assigned_user_id: None,
            assigned_by_id: None,
            completed_by_id: None,
            completion_notes: None,
            meter1: None,
            meter2: None,
            meter3: None,
            meter4: None,
            created_by_id: user_id,
            updated_by_id: user_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl PlanningRepository for InMemoryPlanningRepository {
        async fn plan(&self, id: Uuid) -> Result<Option<maintenance_plan::Model>, ServiceError> {
            Ok(self.plans.read().await.iter().find(|p| p.id == id).cloned())
        }

        async fn active_plans(&self) -> Result<Vec<maintenance_plan::Model>, ServiceError> {
            Ok(self.plans.read().await.iter().filter(|p| p.is_active()).cloned().collect())
        }

        async fn template(&self, id: Uuid) -> Result<Option<template_action_set::Model>, ServiceError> {
            Ok(self.templates.read().await.iter().find(|t| t.id == id).cloned())
        }

        async fn matching_assets(&self, plan: &maintenance_plan::Model) -> Result<Vec<asset::Model>, ServiceError> {
            Ok(self
                .assets
                .read()
                .await
                .iter()
                .filter(|a| plan.asset_type_id.map_or(true, |t| a.asset_type_id == Some(t)))
                .filter(|a| plan.model_id.map_or(true, |m| a.make_model_id == Some(m)))
                .cloned()
                .collect())
        }

        async fn last_completed_event(&self, asset_id: Uuid, template_id: Uuid) -> Result<Option<maintenance_action_set::Model>, ServiceError> {
            if self.unreadable_assets.read().await.contains(&asset_id) {
                return Err(ServiceError::Db("history unavailable".into()));
            }
            Ok(self
                .events
                .read()
                .await
                .iter()
                .filter(|e| e.asset_id == asset_id && e.template_action_set_id == Some(template_id))
                .filter(|e| e.status == EventStatus::Completed.as_str())
                .max_by_key(|e| e.end_date)
                .cloned())
        }

        async fn has_open_event(&self, asset_id: Uuid, plan_id: Uuid) -> Result<bool, ServiceError> {
            if self.unreachable_assets.read().await.contains(&asset_id) {
                return Err(ServiceError::Db("lookup timed out".into()));
            }
            let open = open_statuses();
            Ok(self
                .events
                .read()
                .await
                .iter()
                .any(|e| e.asset_id == asset_id && e.maintenance_plan_id == Some(plan_id) && open.contains(&e.status.as_str())))
        }

        async fn create_event(
            &self,
            plan: &maintenance_plan::Model,
            asset_id: Uuid,
            planned_start: DateTime<Utc>,
            user_id: Option<Uuid>,
        ) -> Result<Uuid, ServiceError> {
            if self.failing_assets.read().await.contains(&asset_id) {
                return Err(ServiceError::Db("event insert failed".into()));
            }
            let e = planned_event(plan, asset_id, planned_start, user_id);
            let id = e.id;
            self.events.write().await.push(e);
            Ok(id)
        }
    }
}
