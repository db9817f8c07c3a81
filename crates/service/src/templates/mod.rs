//! Read side of templates plus activation and deletion.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use common::{types::Page, Pagination};
use models::{
    maintenance_plan, template_action_attachment, template_action_item, template_action_set,
    template_action_set_attachment, template_action_tool, template_part_demand,
};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct TemplateItemDetail {
    #[serde(flatten)]
    pub item: template_action_item::Model,
    pub part_demands: Vec<template_part_demand::Model>,
    pub tools: Vec<template_action_tool::Model>,
    pub attachments: Vec<template_action_attachment::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: template_action_set::Model,
    pub items: Vec<TemplateItemDetail>,
    pub attachments: Vec<template_action_set_attachment::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub template_id: Uuid,
    pub task_name: String,
    pub revision: Option<String>,
    pub is_active: bool,
    pub total_action_items: usize,
    pub total_part_demands: usize,
    pub total_tools: usize,
    pub total_attachments: usize,
    pub total_estimated_duration: Option<f64>,
    pub total_estimated_cost: Option<f64>,
}

pub(crate) async fn find_template<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<template_action_set::Model, ServiceError> {
    template_action_set::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("template"))
}

pub(crate) async fn items_of<C: ConnectionTrait>(db: &C, template_id: Uuid) -> Result<Vec<template_action_item::Model>, ServiceError> {
    Ok(template_action_item::Entity::find()
        .filter(template_action_item::Column::TemplateActionSetId.eq(template_id))
        .order_by_asc(template_action_item::Column::SequenceOrder)
        .all(db)
        .await?)
}

fn group_by<T, F: Fn(&T) -> Uuid>(rows: Vec<T>, key: F) -> HashMap<Uuid, Vec<T>> {
    let mut out: HashMap<Uuid, Vec<T>> = HashMap::new();
    for r in rows {
        out.entry(key(&r)).or_default().push(r);
    }
    out
}

pub(crate) async fn part_demands_for<C: ConnectionTrait>(db: &C, item_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<template_part_demand::Model>>, ServiceError> {
    let rows = template_part_demand::Entity::find()
        .filter(template_part_demand::Column::TemplateActionItemId.is_in(item_ids.to_vec()))
        .order_by_asc(template_part_demand::Column::SequenceOrder)
        .all(db)
        .await?;
    Ok(group_by(rows, |r| r.template_action_item_id))
}

pub(crate) async fn tools_for<C: ConnectionTrait>(db: &C, item_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<template_action_tool::Model>>, ServiceError> {
    let rows = template_action_tool::Entity::find()
        .filter(template_action_tool::Column::TemplateActionItemId.is_in(item_ids.to_vec()))
        .order_by_asc(template_action_tool::Column::SequenceOrder)
        .all(db)
        .await?;
    Ok(group_by(rows, |r| r.template_action_item_id))
}

async fn attachments_for<C: ConnectionTrait>(db: &C, item_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<template_action_attachment::Model>>, ServiceError> {
    let rows = template_action_attachment::Entity::find()
        .filter(template_action_attachment::Column::TemplateActionItemId.is_in(item_ids.to_vec()))
        .order_by_asc(template_action_attachment::Column::SequenceOrder)
        .all(db)
        .await?;
    Ok(group_by(rows, |r| r.template_action_item_id))
}

/// Template with ordered items and all of their children.
pub(crate) async fn load_detail<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<TemplateDetail, ServiceError> {
    let template = find_template(db, id).await?;
    let items = items_of(db, id).await?;
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let mut parts = part_demands_for(db, &ids).await?;
    let mut tools = tools_for(db, &ids).await?;
    let mut attachments = attachments_for(db, &ids).await?;
    let set_attachments = template_action_set_attachment::Entity::find()
        .filter(template_action_set_attachment::Column::TemplateActionSetId.eq(id))
        .order_by_asc(template_action_set_attachment::Column::DisplayOrder)
        .all(db)
        .await?;

    let items = items
        .into_iter()
        .map(|item| TemplateItemDetail {
            part_demands: parts.remove(&item.id).unwrap_or_default(),
            tools: tools.remove(&item.id).unwrap_or_default(),
            attachments: attachments.remove(&item.id).unwrap_or_default(),
            item,
        })
        .collect();
    Ok(TemplateDetail { template, items, attachments: set_attachments })
}

pub async fn get_template(db: &DatabaseConnection, id: Uuid) -> Result<TemplateDetail, ServiceError> {
    load_detail(db, id).await
}

pub async fn list_templates(
    db: &DatabaseConnection,
    active_only: bool,
    pagination: Pagination,
) -> Result<Page<template_action_set::Model>, ServiceError> {
    let (page_index, per_page) = pagination.normalize();
    let mut q = template_action_set::Entity::find();
    if active_only {
        q = q.filter(template_action_set::Column::IsActive.eq(true));
    }
    let paginator = q
        .order_by_asc(template_action_set::Column::TaskName)
        .order_by_asc(template_action_set::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_index).await?;
    Ok(Page { items, page: page_index as u32 + 1, per_page: per_page as u32, total })
}

/// First template with exactly this task name, newest first.
pub async fn find_by_task_name(
    db: &DatabaseConnection,
    task_name: &str,
    active_only: bool,
) -> Result<Option<template_action_set::Model>, ServiceError> {
    let mut q = template_action_set::Entity::find().filter(template_action_set::Column::TaskName.eq(task_name));
    if active_only {
        q = q.filter(template_action_set::Column::IsActive.eq(true));
    }
    Ok(q.order_by_desc(template_action_set::Column::CreatedAt).one(db).await?)
}

pub async fn activate_template(db: &DatabaseConnection, id: Uuid) -> Result<template_action_set::Model, ServiceError> {
    let m = template_action_set::set_active(db, id, true).await?.ok_or_else(|| ServiceError::not_found("template"))?;
    info!(id = %m.id, "template activated");
    Ok(m)
}

pub async fn deactivate_template(db: &DatabaseConnection, id: Uuid) -> Result<template_action_set::Model, ServiceError> {
    let m = template_action_set::set_active(db, id, false).await?.ok_or_else(|| ServiceError::not_found("template"))?;
    info!(id = %m.id, "template deactivated");
    Ok(m)
}

fn positive(v: f64) -> Option<f64> {
    if v > 0.0 { Some(v) } else { None }
}

pub(crate) fn summarize(detail: &TemplateDetail) -> TemplateSummary {
    let t = &detail.template;
    let duration = t.estimated_duration.unwrap_or(0.0)
        + detail.items.iter().filter_map(|i| i.item.estimated_duration).sum::<f64>();
    let cost = t.parts_cost.unwrap_or(0.0)
        + detail
            .items
            .iter()
            .flat_map(|i| i.part_demands.iter())
            .map(|p| p.expected_cost.unwrap_or(0.0) * p.quantity_required)
            .sum::<f64>();
    TemplateSummary {
        template_id: t.id,
        task_name: t.task_name.clone(),
        revision: t.revision.clone(),
        is_active: t.is_active,
        total_action_items: detail.items.len(),
        total_part_demands: detail.items.iter().map(|i| i.part_demands.len()).sum(),
        total_tools: detail.items.iter().map(|i| i.tools.len()).sum(),
        total_attachments: detail.attachments.len() + detail.items.iter().map(|i| i.attachments.len()).sum::<usize>(),
        total_estimated_duration: positive(duration),
        total_estimated_cost: positive(cost),
    }
}

pub async fn template_summary(db: &DatabaseConnection, id: Uuid) -> Result<TemplateSummary, ServiceError> {
    Ok(summarize(&load_detail(db, id).await?))
}

/// Part demands of every item of the template, keyed by item id.
pub async fn part_demands_by_action(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<HashMap<Uuid, Vec<template_part_demand::Model>>, ServiceError> {
    find_template(db, id).await?;
    let ids: Vec<Uuid> = items_of(db, id).await?.iter().map(|i| i.id).collect();
    part_demands_for(db, &ids).await
}

pub async fn tools_by_action(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<HashMap<Uuid, Vec<template_action_tool::Model>>, ServiceError> {
    find_template(db, id).await?;
    let ids: Vec<Uuid> = items_of(db, id).await?.iter().map(|i| i.id).collect();
    tools_for(db, &ids).await
}

/// The template followed by each prior revision back to the first one.
pub async fn revision_history(db: &DatabaseConnection, id: Uuid) -> Result<Vec<template_action_set::Model>, ServiceError> {
    let mut chain = vec![find_template(db, id).await?];
    let mut seen = HashSet::from([id]);
    while let Some(prior) = chain.last().and_then(|t| t.prior_revision_id) {
        if !seen.insert(prior) {
            break;
        }
        match template_action_set::Entity::find_by_id(prior).one(db).await? {
            Some(t) => chain.push(t),
            None => break,
        }
    }
    Ok(chain)
}

/// Hard delete; items and their children go with it. Refused while plans use the template.
pub async fn delete_template(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let plans = maintenance_plan::Entity::find()
        .filter(maintenance_plan::Column::TemplateActionSetId.eq(id))
        .count(db)
        .await?;
    if plans > 0 {
        return Err(ServiceError::Conflict(format!("template is used by {plans} maintenance plan(s)")));
    }
    let res = template_action_set::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected > 0 {
        info!(id = %id, "template deleted");
    }
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildAction, BuildPartDemand, TemplateBuilder};
    use crate::test_support::get_db;
    use serde_json::json;

    async fn seed_template(db: &DatabaseConnection) -> Result<Uuid, anyhow::Error> {
        let b = TemplateBuilder::new(db.clone());
        let mem = b.create_blank("Oil service", None, None).await?;
        b.set_metadata(mem.id, &serde_json::from_value(json!({
            "task_name": "Oil service", "estimated_duration": 1.0, "parts_cost": 10
        }))?).await?;
        let action = BuildAction { action_name: "Drain".into(), estimated_duration: Some(0.5), ..Default::default() };
        b.add_custom_action(mem.id, action).await?;
        b.add_part_demand_to_action(mem.id, 0, BuildPartDemand {
            part_id: Uuid::new_v4(), quantity_required: 4.0, expected_cost: Some(2.5), ..Default::default()
        }).await?;
        b.add_custom_action(mem.id, BuildAction { action_name: "Fill".into(), ..Default::default() }).await?;
        let submitted = b.submit(mem.id, None).await?;
        Ok(submitted.template_action_set_id.unwrap_or_default())
    }

    #[tokio::test]
    async fn detail_and_summary() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let id = seed_template(&db).await?;

        let detail = get_template(&db, id).await?;
        let names: Vec<_> = detail.items.iter().map(|i| (i.item.action_name.as_str(), i.item.sequence_order)).collect();
        assert_eq!(names, vec![("Drain", 1), ("Fill", 2)]);
        assert_eq!(detail.items[0].part_demands.len(), 1);

        let s = template_summary(&db, id).await?;
        assert_eq!(s.total_action_items, 2);
        assert_eq!(s.total_estimated_duration, Some(1.5));
        assert_eq!(s.total_estimated_cost, Some(20.0));

        let parts = part_demands_by_action(&db, id).await?;
        assert_eq!(parts.get(&detail.items[0].item.id).map(Vec::len), Some(1));
        assert!(tools_by_action(&db, id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn listing_activation_and_delete() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let id = seed_template(&db).await?;

        deactivate_template(&db, id).await?;
        assert_eq!(list_templates(&db, true, Pagination::default()).await?.total, 0);
        assert_eq!(list_templates(&db, false, Pagination::default()).await?.total, 1);
        assert!(find_by_task_name(&db, "Oil service", true).await?.is_none());
        activate_template(&db, id).await?;
        assert_eq!(find_by_task_name(&db, "Oil service", true).await?.map(|t| t.id), Some(id));

        assert_eq!(revision_history(&db, id).await?.len(), 1);
        assert!(delete_template(&db, id).await?);
        assert!(matches!(get_template(&db, id).await, Err(ServiceError::NotFound(_))));
        let orphans = template_action_item::Entity::find()
            .filter(template_action_item::Column::TemplateActionSetId.eq(id))
            .count(&db)
            .await?;
        assert_eq!(orphans, 0);
        assert!(!delete_template(&db, id).await?);
        Ok(())
    }

    #[test]
    fn summary_drops_non_positive_totals() {
        let now = chrono::Utc::now().into();
        let template = template_action_set::Model {
            id: Uuid::new_v4(),
            task_name: "Empty".into(),
            description: None,
            estimated_duration: None,
            safety_review_required: false,
            staff_count: None,
            parts_cost: Some(0.0),
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
        };
        let s = summarize(&TemplateDetail { template, items: vec![], attachments: vec![] });
        assert_eq!(s.total_estimated_duration, None);
        assert_eq!(s.total_estimated_cost, None);
    }
}
