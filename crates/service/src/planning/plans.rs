//! Maintenance plan CRUD.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use configs::PlannerConfig;
use models::enums::PlanStatus;
use models::{maintenance_plan, template_action_set};

use super::time_based::TimeBasedPlanner;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub asset_type_id: Option<Uuid>,
    #[serde(default)]
    pub model_id: Option<Uuid>,
    pub template_action_set_id: Uuid,
    pub frequency_type: String,
    #[serde(default)]
    pub delta_hours: Option<f64>,
    #[serde(default)]
    pub delta_m1: Option<f64>,
    #[serde(default)]
    pub delta_m2: Option<f64>,
    #[serde(default)]
    pub delta_m3: Option<f64>,
    #[serde(default)]
    pub delta_m4: Option<f64>,
    #[serde(default)]
    pub status: Option<PlanStatus>,
}

/// Fields left `None` keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub asset_type_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub template_action_set_id: Option<Uuid>,
    pub frequency_type: Option<String>,
    pub delta_hours: Option<f64>,
    pub delta_m1: Option<f64>,
    pub delta_m2: Option<f64>,
    pub delta_m3: Option<f64>,
    pub delta_m4: Option<f64>,
}

async fn find_plan(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_plan::Model, ServiceError> {
    maintenance_plan::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("maintenance plan"))
}

async fn require_template(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    template_action_set::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("template"))
}

pub async fn create_plan(db: &DatabaseConnection, input: &NewPlan, user_id: Option<Uuid>) -> Result<maintenance_plan::Model, ServiceError> {
    let deltas = [input.delta_m1, input.delta_m2, input.delta_m3, input.delta_m4];
    let frequency = maintenance_plan::validate(&input.name, &input.frequency_type, input.delta_hours, deltas)?;
    require_template(db, input.template_action_set_id).await?;
    let now = Utc::now().into();
    let m = maintenance_plan::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description.clone()),
        asset_type_id: Set(input.asset_type_id),
        model_id: Set(input.model_id),
        status: Set(input.status.unwrap_or(PlanStatus::Active).as_str().to_string()),
        template_action_set_id: Set(input.template_action_set_id),
        frequency_type: Set(frequency.as_str().to_string()),
        delta_hours: Set(input.delta_hours),
        delta_m1: Set(input.delta_m1),
        delta_m2: Set(input.delta_m2),
        delta_m3: Set(input.delta_m3),
        delta_m4: Set(input.delta_m4),
        created_by_id: Set(user_id),
        updated_by_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(id = %m.id, frequency = %m.frequency_type, "maintenance plan created");
    Ok(m)
}

pub async fn get_plan(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_plan::Model, ServiceError> {
    find_plan(db, id).await
}

pub async fn list_plans(db: &DatabaseConnection, status: Option<PlanStatus>) -> Result<Vec<maintenance_plan::Model>, ServiceError> {
    let mut q = maintenance_plan::Entity::find();
    if let Some(s) = status {
        q = q.filter(maintenance_plan::Column::Status.eq(s.as_str()));
    }
    Ok(q.order_by_asc(maintenance_plan::Column::Name).all(db).await?)
}

pub async fn update_plan(
    db: &DatabaseConnection,
    id: Uuid,
    patch: &PlanPatch,
    user_id: Option<Uuid>,
) -> Result<maintenance_plan::Model, ServiceError> {
    let found = find_plan(db, id).await?;
    let name = patch.name.clone().unwrap_or_else(|| found.name.clone());
    let frequency_type = patch.frequency_type.clone().unwrap_or_else(|| found.frequency_type.clone());
    let delta_hours = patch.delta_hours.or(found.delta_hours);
    let deltas = [
        patch.delta_m1.or(found.delta_m1),
        patch.delta_m2.or(found.delta_m2),
        patch.delta_m3.or(found.delta_m3),
        patch.delta_m4.or(found.delta_m4),
    ];
    let frequency = maintenance_plan::validate(&name, &frequency_type, delta_hours, deltas)?;
    if let Some(t) = patch.template_action_set_id {
        require_template(db, t).await?;
    }

    let mut am: maintenance_plan::ActiveModel = found.into();
    am.name = Set(name.trim().to_string());
    am.frequency_type = Set(frequency.as_str().to_string());
    am.delta_hours = Set(delta_hours);
    am.delta_m1 = Set(deltas[0]);
    am.delta_m2 = Set(deltas[1]);
    am.delta_m3 = Set(deltas[2]);
    am.delta_m4 = Set(deltas[3]);
    if patch.description.is_some() { am.description = Set(patch.description.clone()); }
    if patch.asset_type_id.is_some() { am.asset_type_id = Set(patch.asset_type_id); }
    if patch.model_id.is_some() { am.model_id = Set(patch.model_id); }
    if let Some(t) = patch.template_action_set_id { am.template_action_set_id = Set(t); }
    am.updated_by_id = Set(user_id);
    am.updated_at = Set(Utc::now().into());
    let m = am.update(db).await?;
    info!(id = %m.id, "maintenance plan updated");
    Ok(m)
}

async fn set_status(db: &DatabaseConnection, id: Uuid, status: PlanStatus) -> Result<maintenance_plan::Model, ServiceError> {
    let mut am: maintenance_plan::ActiveModel = find_plan(db, id).await?.into();
    am.status = Set(status.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let m = am.update(db).await?;
    info!(id = %m.id, status = %m.status, "maintenance plan status changed");
    Ok(m)
}

pub async fn activate_plan(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_plan::Model, ServiceError> {
    set_status(db, id, PlanStatus::Active).await
}

pub async fn deactivate_plan(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_plan::Model, ServiceError> {
    set_status(db, id, PlanStatus::Inactive).await
}

/// Events created from the plan stay and lose their plan link.
pub async fn delete_plan(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let res = maintenance_plan::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected > 0 {
        info!(id = %id, "maintenance plan deleted");
    }
    Ok(res.rows_affected > 0)
}

/// Next calendar due date after `last_date`; `None` for meter plans.
pub fn calculate_next_due_date(
    plan: &maintenance_plan::Model,
    last_date: DateTime<Utc>,
    config: &PlannerConfig,
) -> Option<DateTime<Utc>> {
    let frequency = plan.frequency()?;
    if !frequency.is_time_based() {
        return None;
    }
    last_date.checked_add_signed(TimeBasedPlanner::new(*config).interval(plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::update_meters;
    use crate::maintenance::{complete_event, list_events, EventFilter};
    use crate::planning::{MaintenancePlanner, SeaOrmPlanningRepository};
    use crate::test_support::{get_db, seed_asset, seed_template};
    use chrono::Duration;
    use std::sync::Arc;

    fn meter_plan(template_id: Uuid) -> NewPlan {
        NewPlan {
            name: "Every 250h".into(),
            template_action_set_id: template_id,
            frequency_type: "meter1".into(),
            delta_m1: Some(250.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn plan_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let template_id = seed_template(&db).await?;

        let bad = NewPlan { delta_m1: None, ..meter_plan(template_id) };
        assert!(matches!(create_plan(&db, &bad, None).await, Err(ServiceError::Model(_))));
        let missing = meter_plan(Uuid::new_v4());
        assert!(matches!(create_plan(&db, &missing, None).await, Err(ServiceError::NotFound(_))));

        let p = create_plan(&db, &meter_plan(template_id), None).await?;
        assert_eq!(p.status, "Active");

        let p = update_plan(&db, p.id, &PlanPatch { frequency_type: Some("days".into()), delta_hours: Some(48.0), ..Default::default() }, None).await?;
        assert_eq!(p.frequency_type, "days");
        let last = Utc::now();
        assert_eq!(calculate_next_due_date(&p, last, &PlannerConfig::default()), Some(last + Duration::hours(48)));

        deactivate_plan(&db, p.id).await?;
        assert!(!list_plans(&db, Some(PlanStatus::Active)).await?.iter().any(|x| x.id == p.id));
        activate_plan(&db, p.id).await?;
        assert!(list_plans(&db, Some(PlanStatus::Active)).await?.iter().any(|x| x.id == p.id));

        assert!(matches!(
            crate::templates::delete_template(&db, template_id).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(delete_plan(&db, p.id).await?);
        assert!(matches!(get_plan(&db, p.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn meter_plan_end_to_end() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let template_id = seed_template(&db).await?;
        let asset = seed_asset(&db, "Dozer", [Some(300.0), None, None, None]).await?;
        let plan = create_plan(&db, &meter_plan(template_id), None).await?;

        let repo = Arc::new(SeaOrmPlanningRepository { db: db.clone() });
        let planner = MaintenancePlanner::new(repo, PlannerConfig::default());

        let mut results = planner.plan_maintenance(plan.id).await?;
        assert_eq!(results.len(), 1);
        assert!(results[0].needs_maintenance);
        let created = planner.create_events_from_results(&mut results, None).await?;
        assert_eq!(created.len(), 1);

        let again = planner.plan_maintenance(plan.id).await?;
        assert!(!again[0].needs_maintenance);
        assert!(again[0].reason.starts_with("Duplicate prevention"));

        complete_event(&db, created[0], None, None).await?;
        let after = planner.plan_maintenance(plan.id).await?;
        assert!(!after[0].needs_maintenance);
        assert_eq!(after[0].last_maintenance_id, Some(created[0]));
        assert_eq!(after[0].meter_readings_at_last_maintenance.get("meter1"), Some(&Some(300.0)));

        update_meters(&db, asset.id, [Some(560.0), None, None, None]).await?;
        let due = planner.assets_needing_maintenance(plan.id).await?;
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].meter_delta.get("meter1"), Some(&260.0));

        let events = list_events(&db, &EventFilter { plan_id: Some(plan.id), ..Default::default() }).await?;
        assert_eq!(events.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn all_active_plans_against_database() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let template_id = seed_template(&db).await?;
        let asset = seed_asset(&db, "Grader", [Some(400.0), None, None, None]).await?;
        let due = create_plan(&db, &meter_plan(template_id), None).await?;
        let idle = create_plan(&db, &meter_plan(template_id), None).await?;
        deactivate_plan(&db, idle.id).await?;

        let repo = Arc::new(SeaOrmPlanningRepository { db: db.clone() });
        let planner = MaintenancePlanner::new(repo, PlannerConfig::default());
        let results = planner.plan_all_active_plans_at(Utc::now()).await?;

        assert!(!results.iter().any(|r| r.maintenance_plan_id == idle.id));
        let mine: Vec<_> = results.iter().filter(|r| r.maintenance_plan_id == due.id && r.asset_id == asset.id).collect();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].needs_maintenance);
        assert_eq!(mine[0].meter_delta.get("meter1"), Some(&400.0));
        Ok(())
    }
}
