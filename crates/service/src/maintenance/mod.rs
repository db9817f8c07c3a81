//! Maintenance events: a template instantiated for one asset.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::enums::{ActionStatus, EventStatus, Priority, LINE_STATUS_PLANNED};
use models::{action, action_tool, asset, maintenance_action_set, maintenance_plan, part_demand};

use crate::errors::ServiceError;
use crate::templates;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFromTemplate {
    pub template_id: Uuid,
    pub asset_id: Uuid,
    #[serde(default)]
    pub planned_start: Option<DateTimeWithTimeZone>,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_user_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    #[serde(default)]
    pub plan_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionDetail {
    #[serde(flatten)]
    pub action: action::Model,
    pub part_demands: Vec<part_demand::Model>,
    pub tools: Vec<action_tool::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: maintenance_action_set::Model,
    pub actions: Vec<ActionDetail>,
}

async fn find_event<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<maintenance_action_set::Model, ServiceError> {
    maintenance_action_set::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("maintenance event"))
}

fn event_status(e: &maintenance_action_set::Model) -> Result<EventStatus, ServiceError> {
    Ok(e.status.parse::<EventStatus>()?)
}

/// Copies the template into a new event and its actions, part demands and tools.
pub(crate) async fn create_event_in<C: ConnectionTrait>(db: &C, input: &CreateFromTemplate) -> Result<maintenance_action_set::Model, ServiceError> {
    let detail = templates::load_detail(db, input.template_id).await?;
    if !detail.template.is_active {
        warn!(template_id = %input.template_id, "creating event from inactive template");
    }
    asset::Entity::find_by_id(input.asset_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("asset"))?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let t = &detail.template;
    let priority = input.priority.unwrap_or(Priority::Medium);
    let event = maintenance_action_set::ActiveModel {
        id: Set(Uuid::new_v4()),
        asset_id: Set(input.asset_id),
        template_action_set_id: Set(Some(t.id)),
        maintenance_plan_id: Set(input.plan_id),
        task_name: Set(t.task_name.clone()),
        description: Set(t.description.clone()),
        estimated_duration: Set(t.estimated_duration),
        safety_review_required: Set(t.safety_review_required),
        staff_count: Set(t.staff_count),
        parts_cost: Set(t.parts_cost),
        labor_hours: Set(t.labor_hours),
        planned_start_datetime: Set(input.planned_start),
        status: Set(EventStatus::Planned.as_str().to_string()),
        priority: Set(priority.as_str().to_string()),
        start_date: Set(None),
        end_date: Set(None),
        actual_billable_hours: Set(None),
        assigned_user_id: Set(input.assigned_user_id),
        assigned_by_id: Set(input.assigned_user_id.and(input.user_id)),
        completed_by_id: Set(None),
        completion_notes: Set(None),
        meter1: Set(None),
        meter2: Set(None),
        meter3: Set(None),
        meter4: Set(None),
        created_by_id: Set(input.user_id),
        updated_by_id: Set(input.user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    for item in &detail.items {
        let src = &item.item;
        let a = action::ActiveModel {
            id: Set(Uuid::new_v4()),
            maintenance_action_set_id: Set(event.id),
            template_action_item_id: Set(Some(src.id)),
            action_name: Set(src.action_name.clone()),
            description: Set(src.description.clone()),
            estimated_duration: Set(src.estimated_duration),
            expected_billable_hours: Set(src.expected_billable_hours),
            safety_notes: Set(src.safety_notes.clone()),
            notes: Set(src.notes.clone()),
            sequence_order: Set(src.sequence_order),
            status: Set(ActionStatus::NotStarted.as_str().to_string()),
            scheduled_start_time: Set(input.planned_start),
            start_time: Set(None),
            end_time: Set(None),
            billable_hours: Set(None),
            completion_notes: Set(None),
            assigned_user_id: Set(input.assigned_user_id),
            completed_by_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await?;

        for p in &item.part_demands {
            part_demand::ActiveModel {
                id: Set(Uuid::new_v4()),
                action_id: Set(a.id),
                part_id: Set(p.part_id),
                quantity_required: Set(p.quantity_required),
                expected_cost: Set(p.expected_cost),
                notes: Set(p.notes.clone()),
                status: Set(LINE_STATUS_PLANNED.to_string()),
                priority: Set(priority.as_str().to_string()),
                sequence_order: Set(p.sequence_order),
                requested_by_id: Set(input.user_id),
            }
            .insert(db)
            .await?;
        }
        for tool in &item.tools {
            action_tool::ActiveModel {
                id: Set(Uuid::new_v4()),
                action_id: Set(a.id),
                tool_id: Set(tool.tool_id),
                quantity_required: Set(tool.quantity_required),
                notes: Set(tool.notes.clone()),
                status: Set(LINE_STATUS_PLANNED.to_string()),
                priority: Set(priority.as_str().to_string()),
                sequence_order: Set(tool.sequence_order),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(event)
}

#[instrument(skip(db, input), fields(template_id = %input.template_id, asset_id = %input.asset_id))]
pub async fn create_from_template(db: &DatabaseConnection, input: &CreateFromTemplate) -> Result<EventDetail, ServiceError> {
    let txn = db.begin().await?;
    let event = create_event_in(&txn, input).await?;
    txn.commit().await?;
    info!(id = %event.id, "maintenance event created");
    get_event(db, event.id).await
}

/// Event for `asset_id` from the plan's template, linked to the plan.
pub async fn create_from_plan(
    db: &DatabaseConnection,
    plan_id: Uuid,
    asset_id: Uuid,
    planned_start: Option<DateTimeWithTimeZone>,
    user_id: Option<Uuid>,
) -> Result<EventDetail, ServiceError> {
    let plan = maintenance_plan::Entity::find_by_id(plan_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("maintenance plan"))?;
    create_from_template(
        db,
        &CreateFromTemplate {
            template_id: plan.template_action_set_id,
            asset_id,
            planned_start,
            plan_id: Some(plan.id),
            user_id,
            assigned_user_id: None,
            priority: None,
        },
    )
    .await
}

pub async fn get_event(db: &DatabaseConnection, id: Uuid) -> Result<EventDetail, ServiceError> {
    let event = find_event(db, id).await?;
    let actions = action::Entity::find()
        .filter(action::Column::MaintenanceActionSetId.eq(id))
        .order_by_asc(action::Column::SequenceOrder)
        .all(db)
        .await?;
    let ids: Vec<Uuid> = actions.iter().map(|a| a.id).collect();
    let mut parts: HashMap<Uuid, Vec<part_demand::Model>> = HashMap::new();
    for p in part_demand::Entity::find()
        .filter(part_demand::Column::ActionId.is_in(ids.clone()))
        .order_by_asc(part_demand::Column::SequenceOrder)
        .all(db)
        .await?
    {
        parts.entry(p.action_id).or_default().push(p);
    }
    let mut tools: HashMap<Uuid, Vec<action_tool::Model>> = HashMap::new();
    for t in action_tool::Entity::find()
        .filter(action_tool::Column::ActionId.is_in(ids))
        .order_by_asc(action_tool::Column::SequenceOrder)
        .all(db)
        .await?
    {
        tools.entry(t.action_id).or_default().push(t);
    }
    let actions = actions
        .into_iter()
        .map(|a| ActionDetail {
            part_demands: parts.remove(&a.id).unwrap_or_default(),
            tools: tools.remove(&a.id).unwrap_or_default(),
            action: a,
        })
        .collect();
    Ok(EventDetail { event, actions })
}

pub async fn list_events(db: &DatabaseConnection, filter: &EventFilter) -> Result<Vec<maintenance_action_set::Model>, ServiceError> {
    let mut q = maintenance_action_set::Entity::find();
    if let Some(a) = filter.asset_id {
        q = q.filter(maintenance_action_set::Column::AssetId.eq(a));
    }
    if let Some(p) = filter.plan_id {
        q = q.filter(maintenance_action_set::Column::MaintenancePlanId.eq(p));
    }
    if let Some(s) = filter.status {
        q = q.filter(maintenance_action_set::Column::Status.eq(s.as_str()));
    }
    Ok(q.order_by_desc(maintenance_action_set::Column::CreatedAt).all(db).await?)
}

pub async fn start_event(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_action_set::Model, ServiceError> {
    let e = find_event(db, id).await?;
    if event_status(&e)? != EventStatus::Planned {
        return Err(ServiceError::Validation(format!("cannot start an event that is {}", e.status)));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut am: maintenance_action_set::ActiveModel = e.into();
    am.status = Set(EventStatus::InProgress.as_str().to_string());
    am.start_date = Set(Some(now));
    am.updated_at = Set(now);
    let m = am.update(db).await?;
    info!(id = %m.id, "maintenance event started");
    Ok(m)
}

/// Closes the event and records the asset's meter readings at this moment.
pub async fn complete_event(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Option<Uuid>,
    notes: Option<String>,
) -> Result<maintenance_action_set::Model, ServiceError> {
    let e = find_event(db, id).await?;
    if !EventStatus::OPEN.contains(&event_status(&e)?) {
        return Err(ServiceError::Validation(format!("cannot complete an event that is {}", e.status)));
    }
    let meters = asset::Entity::find_by_id(e.asset_id)
        .one(db)
        .await?
        .map(|a| a.meters())
        .unwrap_or([None; 4]);
    let now: DateTimeWithTimeZone = Utc::now().into();
    let started = e.start_date;
    let mut am: maintenance_action_set::ActiveModel = e.into();
    am.status = Set(EventStatus::Completed.as_str().to_string());
    if started.is_none() {
        am.start_date = Set(Some(now));
    }
    am.end_date = Set(Some(now));
    am.completed_by_id = Set(user_id);
    am.completion_notes = Set(notes.filter(|n| !n.trim().is_empty()));
    am.meter1 = Set(meters[0]);
    am.meter2 = Set(meters[1]);
    am.meter3 = Set(meters[2]);
    am.meter4 = Set(meters[3]);
    am.updated_by_id = Set(user_id);
    am.updated_at = Set(now);
    let m = am.update(db).await?;
    info!(id = %m.id, asset_id = %m.asset_id, "maintenance event completed");
    Ok(m)
}

pub async fn cancel_event(db: &DatabaseConnection, id: Uuid) -> Result<maintenance_action_set::Model, ServiceError> {
    let e = find_event(db, id).await?;
    if !EventStatus::OPEN.contains(&event_status(&e)?) {
        return Err(ServiceError::Validation(format!("cannot cancel an event that is {}", e.status)));
    }
    let mut am: maintenance_action_set::ActiveModel = e.into();
    am.status = Set(EventStatus::Cancelled.as_str().to_string());
    am.updated_at = Set(Utc::now().into());
    let m = am.update(db).await?;
    info!(id = %m.id, "maintenance event cancelled");
    Ok(m)
}

pub async fn update_action_status(
    db: &DatabaseConnection,
    action_id: Uuid,
    status: ActionStatus,
    user_id: Option<Uuid>,
) -> Result<action::Model, ServiceError> {
    let a = action::Entity::find_by_id(action_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("action"))?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let started = a.start_time;
    let mut am: action::ActiveModel = a.into();
    am.status = Set(status.as_str().to_string());
    match status {
        ActionStatus::InProgress if started.is_none() => am.start_time = Set(Some(now)),
        ActionStatus::Complete => {
            if started.is_none() {
                am.start_time = Set(Some(now));
            }
            am.end_time = Set(Some(now));
            am.completed_by_id = Set(user_id);
        }
        _ => {}
    }
    am.updated_at = Set(now);
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_asset, seed_template};

    #[tokio::test]
    async fn instantiate_and_lifecycle() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let template_id = seed_template(&db).await?;
        let asset = seed_asset(&db, "Excavator", [Some(1200.0), None, None, None]).await?;

        let input = CreateFromTemplate {
            template_id,
            asset_id: asset.id,
            planned_start: None,
            plan_id: None,
            user_id: None,
            assigned_user_id: None,
            priority: Some(Priority::High),
        };
        let detail = create_from_template(&db, &input).await?;
        assert_eq!(detail.event.status, "Planned");
        assert_eq!(detail.event.task_name, "250h service");
        assert_eq!(detail.actions.len(), 2);
        assert_eq!(detail.actions[0].action.status, "Not Started");
        assert_eq!(detail.actions[0].part_demands[0].status, "Planned");
        assert_eq!(detail.actions[0].part_demands[0].priority, "High");
        assert_eq!(detail.actions[0].tools.len(), 1);

        let id = detail.event.id;
        let started = start_event(&db, id).await?;
        assert!(started.start_date.is_some());
        assert!(start_event(&db, id).await.is_err());

        let a = update_action_status(&db, detail.actions[0].action.id, ActionStatus::Complete, None).await?;
        assert!(a.end_time.is_some());

        let done = complete_event(&db, id, None, Some("all good".into())).await?;
        assert_eq!(done.status, "Completed");
        assert_eq!(done.meter1, Some(1200.0));
        assert!(matches!(cancel_event(&db, id).await, Err(ServiceError::Validation(_))));

        let filter = EventFilter { asset_id: Some(asset.id), status: Some(EventStatus::Completed), ..Default::default() };
        assert_eq!(list_events(&db, &filter).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_asset_rolls_back() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let template_id = seed_template(&db).await?;
        let input = CreateFromTemplate {
            template_id,
            asset_id: Uuid::new_v4(),
            planned_start: None,
            plan_id: None,
            user_id: None,
            assigned_user_id: None,
            priority: None,
        };
        assert!(matches!(create_from_template(&db, &input).await, Err(ServiceError::NotFound(_))));
        assert!(list_events(&db, &EventFilter::default()).await?.is_empty());
        Ok(())
    }
}
