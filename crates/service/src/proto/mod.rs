//! Proto action library: reusable action definitions and their default children.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::{types::Page, Pagination};
use models::enums::DEFAULT_ATTACHMENT_TYPE;
use models::validation::{require_positive, require_tool_quantity};
use models::{proto_action_attachment, proto_action_item, proto_action_tool, proto_part_demand, template_action_item};

use crate::builder::next_revision;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProtoAction {
    pub action_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<f64>,
    #[serde(default)]
    pub expected_billable_hours: Option<f64>,
    #[serde(default)]
    pub safety_notes: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub instructions_type: Option<String>,
    #[serde(default)]
    pub minimum_staff_count: Option<i32>,
    #[serde(default)]
    pub required_skills: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

/// Fields left `None` keep their value; an empty string clears optional text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProtoActionPatch {
    pub action_name: Option<String>,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub expected_billable_hours: Option<f64>,
    pub safety_notes: Option<String>,
    pub notes: Option<String>,
    pub is_required: Option<bool>,
    pub instructions: Option<String>,
    pub instructions_type: Option<String>,
    pub minimum_staff_count: Option<i32>,
    pub required_skills: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPartDemand {
    pub part_id: Uuid,
    #[serde(default = "default_part_quantity")]
    pub quantity_required: f64,
    #[serde(default)]
    pub expected_cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
}

impl Default for NewPartDemand {
    fn default() -> Self {
        Self { part_id: Uuid::nil(), quantity_required: 1.0, expected_cost: None, notes: None, is_optional: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTool {
    pub tool_id: Uuid,
    #[serde(default = "default_tool_quantity")]
    pub quantity_required: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

impl Default for NewTool {
    fn default() -> Self {
        Self { tool_id: Uuid::nil(), quantity_required: 1, notes: None, is_required: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAttachment {
    pub attachment_id: Uuid,
    #[serde(default)]
    pub attachment_type: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
}

fn default_part_quantity() -> f64 { 1.0 }
fn default_tool_quantity() -> i32 { 1 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Serialize)]
pub struct ProtoDetail {
    #[serde(flatten)]
    pub item: proto_action_item::Model,
    pub part_demands: Vec<proto_part_demand::Model>,
    pub tools: Vec<proto_action_tool::Model>,
    pub attachments: Vec<proto_action_attachment::Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtoSummary {
    pub id: Uuid,
    pub action_name: String,
    pub revision: Option<String>,
    pub part_demand_count: u64,
    pub tool_count: u64,
    pub attachment_count: u64,
    pub template_item_count: u64,
}

fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

async fn find_proto<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<proto_action_item::Model, ServiceError> {
    proto_action_item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("proto action item"))
}

async fn part_demands_of<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Vec<proto_part_demand::Model>, ServiceError> {
    Ok(proto_part_demand::Entity::find()
        .filter(proto_part_demand::Column::ProtoActionItemId.eq(id))
        .order_by_asc(proto_part_demand::Column::SequenceOrder)
        .all(db)
        .await?)
}

async fn tools_of<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Vec<proto_action_tool::Model>, ServiceError> {
    Ok(proto_action_tool::Entity::find()
        .filter(proto_action_tool::Column::ProtoActionItemId.eq(id))
        .order_by_asc(proto_action_tool::Column::SequenceOrder)
        .all(db)
        .await?)
}

async fn attachments_of<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Vec<proto_action_attachment::Model>, ServiceError> {
    Ok(proto_action_attachment::Entity::find()
        .filter(proto_action_attachment::Column::ProtoActionItemId.eq(id))
        .order_by_asc(proto_action_attachment::Column::SequenceOrder)
        .all(db)
        .await?)
}

fn next_seq(last: Option<i32>) -> i32 {
    last.map(|s| s.max(0) + 1).unwrap_or(1)
}

pub async fn create_proto_action(
    db: &DatabaseConnection,
    input: &NewProtoAction,
    user_id: Option<Uuid>,
) -> Result<proto_action_item::Model, ServiceError> {
    let staff = input.minimum_staff_count.unwrap_or(1);
    proto_action_item::validate(&input.action_name, staff, input.estimated_duration)?;
    let now = Utc::now().into();
    let m = proto_action_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        action_name: Set(input.action_name.trim().to_string()),
        description: Set(clean(input.description.clone())),
        estimated_duration: Set(input.estimated_duration),
        expected_billable_hours: Set(input.expected_billable_hours),
        safety_notes: Set(clean(input.safety_notes.clone())),
        notes: Set(clean(input.notes.clone())),
        is_required: Set(input.is_required.unwrap_or(true)),
        instructions: Set(clean(input.instructions.clone())),
        instructions_type: Set(clean(input.instructions_type.clone())),
        minimum_staff_count: Set(staff),
        required_skills: Set(clean(input.required_skills.clone())),
        revision: Set(clean(input.revision.clone())),
        prior_revision_id: Set(None),
        created_by_id: Set(user_id),
        updated_by_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(id = %m.id, name = %m.action_name, "proto action created");
    Ok(m)
}

pub async fn get_proto_action(db: &DatabaseConnection, id: Uuid) -> Result<ProtoDetail, ServiceError> {
    let item = find_proto(db, id).await?;
    Ok(ProtoDetail {
        part_demands: part_demands_of(db, id).await?,
        tools: tools_of(db, id).await?,
        attachments: attachments_of(db, id).await?,
        item,
    })
}

/// Paged list, optionally filtered by a substring of `action_name`.
pub async fn list_proto_actions(
    db: &DatabaseConnection,
    action_name: Option<&str>,
    pagination: Pagination,
) -> Result<Page<proto_action_item::Model>, ServiceError> {
    let (page_index, per_page) = pagination.normalize();
    let mut q = proto_action_item::Entity::find();
    if let Some(name) = action_name.map(str::trim).filter(|s| !s.is_empty()) {
        q = q.filter(proto_action_item::Column::ActionName.contains(name));
    }
    let paginator = q.order_by_asc(proto_action_item::Column::ActionName).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_index).await?;
    Ok(Page { items, page: page_index as u32 + 1, per_page: per_page as u32, total })
}

pub async fn update_proto_action(
    db: &DatabaseConnection,
    id: Uuid,
    patch: &ProtoActionPatch,
    user_id: Option<Uuid>,
) -> Result<proto_action_item::Model, ServiceError> {
    let found = find_proto(db, id).await?;
    let name = patch.action_name.clone().unwrap_or_else(|| found.action_name.clone());
    let staff = patch.minimum_staff_count.unwrap_or(found.minimum_staff_count);
    let duration = patch.estimated_duration.or(found.estimated_duration);
    proto_action_item::validate(&name, staff, duration)?;

    let mut am: proto_action_item::ActiveModel = found.into();
    am.action_name = Set(name.trim().to_string());
    am.minimum_staff_count = Set(staff);
    am.estimated_duration = Set(duration);
    if let Some(v) = patch.expected_billable_hours { am.expected_billable_hours = Set(Some(v)); }
    if let Some(v) = patch.is_required { am.is_required = Set(v); }
    if patch.description.is_some() { am.description = Set(clean(patch.description.clone())); }
    if patch.safety_notes.is_some() { am.safety_notes = Set(clean(patch.safety_notes.clone())); }
    if patch.notes.is_some() { am.notes = Set(clean(patch.notes.clone())); }
    if patch.instructions.is_some() { am.instructions = Set(clean(patch.instructions.clone())); }
    if patch.instructions_type.is_some() { am.instructions_type = Set(clean(patch.instructions_type.clone())); }
    if patch.required_skills.is_some() { am.required_skills = Set(clean(patch.required_skills.clone())); }
    am.updated_by_id = Set(user_id);
    am.updated_at = Set(Utc::now().into());
    let m = am.update(db).await?;
    info!(id = %m.id, "proto action updated");
    Ok(m)
}

/// Template items copied from this proto keep their data and lose the link.
pub async fn delete_proto_action(db: &DatabaseConnection, id: Uuid) -> Result<bool, ServiceError> {
    let res = proto_action_item::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected > 0 {
        info!(id = %id, "proto action deleted");
    }
    Ok(res.rows_affected > 0)
}

pub async fn add_proto_part_demand(
    db: &DatabaseConnection,
    proto_id: Uuid,
    input: &NewPartDemand,
) -> Result<proto_part_demand::Model, ServiceError> {
    require_positive("quantity_required", input.quantity_required)?;
    find_proto(db, proto_id).await?;
    let seq = next_seq(part_demands_of(db, proto_id).await?.last().map(|p| p.sequence_order));
    Ok(proto_part_demand::ActiveModel {
        id: Set(Uuid::new_v4()),
        proto_action_item_id: Set(proto_id),
        part_id: Set(input.part_id),
        quantity_required: Set(input.quantity_required),
        expected_cost: Set(input.expected_cost),
        notes: Set(clean(input.notes.clone())),
        is_optional: Set(input.is_optional),
        sequence_order: Set(seq),
    }
    .insert(db)
    .await?)
}

pub async fn add_proto_tool(db: &DatabaseConnection, proto_id: Uuid, input: &NewTool) -> Result<proto_action_tool::Model, ServiceError> {
    require_tool_quantity(input.quantity_required)?;
    find_proto(db, proto_id).await?;
    let seq = next_seq(tools_of(db, proto_id).await?.last().map(|t| t.sequence_order));
    Ok(proto_action_tool::ActiveModel {
        id: Set(Uuid::new_v4()),
        proto_action_item_id: Set(proto_id),
        tool_id: Set(input.tool_id),
        quantity_required: Set(input.quantity_required),
        notes: Set(clean(input.notes.clone())),
        is_required: Set(input.is_required),
        sequence_order: Set(seq),
    }
    .insert(db)
    .await?)
}

pub async fn add_proto_attachment(
    db: &DatabaseConnection,
    proto_id: Uuid,
    input: &NewAttachment,
) -> Result<proto_action_attachment::Model, ServiceError> {
    find_proto(db, proto_id).await?;
    let existing = attachments_of(db, proto_id).await?;
    let seq = next_seq(existing.last().map(|a| a.sequence_order));
    Ok(proto_action_attachment::ActiveModel {
        id: Set(Uuid::new_v4()),
        proto_action_item_id: Set(proto_id),
        attachment_id: Set(input.attachment_id),
        attachment_type: Set(clean(input.attachment_type.clone()).unwrap_or_else(|| DEFAULT_ATTACHMENT_TYPE.to_string())),
        caption: Set(clean(input.caption.clone())),
        description: Set(clean(input.description.clone())),
        display_order: Set(existing.len() as i32 + 1),
        sequence_order: Set(seq),
        is_required: Set(input.is_required),
    }
    .insert(db)
    .await?)
}

pub async fn remove_proto_part_demand(db: &DatabaseConnection, proto_id: Uuid, part_demand_id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let res = proto_part_demand::Entity::delete_many()
        .filter(proto_part_demand::Column::Id.eq(part_demand_id))
        .filter(proto_part_demand::Column::ProtoActionItemId.eq(proto_id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("proto part demand"));
    }
    for (i, p) in part_demands_of(&txn, proto_id).await?.into_iter().enumerate() {
        let seq = i as i32 + 1;
        if p.sequence_order != seq {
            let mut am: proto_part_demand::ActiveModel = p.into();
            am.sequence_order = Set(seq);
            am.update(&txn).await?;
        }
    }
    txn.commit().await?;
    Ok(())
}

pub async fn remove_proto_tool(db: &DatabaseConnection, proto_id: Uuid, tool_id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let res = proto_action_tool::Entity::delete_many()
        .filter(proto_action_tool::Column::Id.eq(tool_id))
        .filter(proto_action_tool::Column::ProtoActionItemId.eq(proto_id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("proto action tool"));
    }
    for (i, t) in tools_of(&txn, proto_id).await?.into_iter().enumerate() {
        let seq = i as i32 + 1;
        if t.sequence_order != seq {
            let mut am: proto_action_tool::ActiveModel = t.into();
            am.sequence_order = Set(seq);
            am.update(&txn).await?;
        }
    }
    txn.commit().await?;
    Ok(())
}

pub async fn remove_proto_attachment(db: &DatabaseConnection, proto_id: Uuid, attachment_row_id: Uuid) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let res = proto_action_attachment::Entity::delete_many()
        .filter(proto_action_attachment::Column::Id.eq(attachment_row_id))
        .filter(proto_action_attachment::Column::ProtoActionItemId.eq(proto_id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("proto attachment"));
    }
    for (i, a) in attachments_of(&txn, proto_id).await?.into_iter().enumerate() {
        let seq = i as i32 + 1;
        if a.sequence_order != seq || a.display_order != seq {
            let mut am: proto_action_attachment::ActiveModel = a.into();
            am.sequence_order = Set(seq);
            am.display_order = Set(seq);
            am.update(&txn).await?;
        }
    }
    txn.commit().await?;
    Ok(())
}

/// New proto row copied from `id`, with its children, pointing back at it.
pub async fn create_proto_revision(
    db: &DatabaseConnection,
    id: Uuid,
    user_id: Option<Uuid>,
) -> Result<proto_action_item::Model, ServiceError> {
    let txn = db.begin().await?;
    let src = find_proto(&txn, id).await?;
    let now = Utc::now().into();
    let revision = next_revision(src.revision.as_deref());
    let copy = proto_action_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        action_name: Set(src.action_name.clone()),
        description: Set(src.description.clone()),
        estimated_duration: Set(src.estimated_duration),
        expected_billable_hours: Set(src.expected_billable_hours),
        safety_notes: Set(src.safety_notes.clone()),
        notes: Set(src.notes.clone()),
        is_required: Set(src.is_required),
        instructions: Set(src.instructions.clone()),
        instructions_type: Set(src.instructions_type.clone()),
        minimum_staff_count: Set(src.minimum_staff_count),
        required_skills: Set(src.required_skills.clone()),
        revision: Set(Some(revision)),
        prior_revision_id: Set(Some(src.id)),
        created_by_id: Set(user_id),
        updated_by_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    for p in part_demands_of(&txn, id).await? {
        proto_part_demand::ActiveModel {
            id: Set(Uuid::new_v4()),
            proto_action_item_id: Set(copy.id),
            part_id: Set(p.part_id),
            quantity_required: Set(p.quantity_required),
            expected_cost: Set(p.expected_cost),
            notes: Set(p.notes),
            is_optional: Set(p.is_optional),
            sequence_order: Set(p.sequence_order),
        }
        .insert(&txn)
        .await?;
    }
    for t in tools_of(&txn, id).await? {
        proto_action_tool::ActiveModel {
            id: Set(Uuid::new_v4()),
            proto_action_item_id: Set(copy.id),
            tool_id: Set(t.tool_id),
            quantity_required: Set(t.quantity_required),
            notes: Set(t.notes),
            is_required: Set(t.is_required),
            sequence_order: Set(t.sequence_order),
        }
        .insert(&txn)
        .await?;
    }
    for a in attachments_of(&txn, id).await? {
        proto_action_attachment::ActiveModel {
            id: Set(Uuid::new_v4()),
            proto_action_item_id: Set(copy.id),
            attachment_id: Set(a.attachment_id),
            attachment_type: Set(a.attachment_type),
            caption: Set(a.caption),
            description: Set(a.description),
            display_order: Set(a.display_order),
            sequence_order: Set(a.sequence_order),
            is_required: Set(a.is_required),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;
    info!(id = %copy.id, prior = %id, revision = ?copy.revision, "proto revision created");
    Ok(copy)
}

pub async fn proto_summary(db: &DatabaseConnection, id: Uuid) -> Result<ProtoSummary, ServiceError> {
    let item = find_proto(db, id).await?;
    Ok(ProtoSummary {
        id,
        part_demand_count: proto_part_demand::Entity::find()
            .filter(proto_part_demand::Column::ProtoActionItemId.eq(id))
            .count(db)
            .await?,
        tool_count: proto_action_tool::Entity::find()
            .filter(proto_action_tool::Column::ProtoActionItemId.eq(id))
            .count(db)
            .await?,
        attachment_count: proto_action_attachment::Entity::find()
            .filter(proto_action_attachment::Column::ProtoActionItemId.eq(id))
            .count(db)
            .await?,
        template_item_count: template_action_item::Entity::find()
            .filter(template_action_item::Column::ProtoActionItemId.eq(id))
            .count(db)
            .await?,
        action_name: item.action_name,
        revision: item.revision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    async fn proto(db: &DatabaseConnection, name: &str) -> Result<proto_action_item::Model, anyhow::Error> {
        Ok(create_proto_action(db, &NewProtoAction { action_name: name.into(), ..Default::default() }, None).await?)
    }

    #[tokio::test]
    async fn create_validate_and_update() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let bad = create_proto_action(&db, &NewProtoAction { action_name: " ".into(), ..Default::default() }, None).await;
        assert!(matches!(bad, Err(ServiceError::Model(_))));
        let bad = create_proto_action(&db, &NewProtoAction { action_name: "x".into(), minimum_staff_count: Some(0), ..Default::default() }, None).await;
        assert!(bad.is_err());

        let p = proto(&db, "Check belts").await?;
        assert!(p.is_required);
        assert_eq!(p.minimum_staff_count, 1);

        let patch = ProtoActionPatch { notes: Some("tension 10mm".into()), estimated_duration: Some(0.75), ..Default::default() };
        let p = update_proto_action(&db, p.id, &patch, None).await?;
        assert_eq!(p.notes.as_deref(), Some("tension 10mm"));
        let p = update_proto_action(&db, p.id, &ProtoActionPatch { notes: Some(String::new()), ..Default::default() }, None).await?;
        assert_eq!(p.notes, None);
        assert_eq!(p.estimated_duration, Some(0.75));

        proto(&db, "Check hoses").await?;
        proto(&db, "Wash").await?;
        let page = list_proto_actions(&db, Some("Check"), Pagination { page: 1, per_page: 1 }).await?;
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn children_sequence_and_renumber() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let p = proto(&db, "Brake job").await?;
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(add_proto_part_demand(&db, p.id, &NewPartDemand { part_id: Uuid::new_v4(), ..Default::default() }).await?.id);
        }
        remove_proto_part_demand(&db, p.id, ids[0]).await?;
        let seqs: Vec<i32> = get_proto_action(&db, p.id).await?.part_demands.iter().map(|d| d.sequence_order).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert!(matches!(remove_proto_part_demand(&db, p.id, ids[0]).await, Err(ServiceError::NotFound(_))));

        let t = add_proto_tool(&db, p.id, &NewTool { tool_id: Uuid::new_v4(), ..Default::default() }).await?;
        assert_eq!(t.sequence_order, 1);
        assert!(add_proto_tool(&db, p.id, &NewTool { quantity_required: 0, ..Default::default() }).await.is_err());
        let a = add_proto_attachment(&db, p.id, &NewAttachment { attachment_id: Uuid::new_v4(), ..Default::default() }).await?;
        assert_eq!(a.attachment_type, "Document");

        let s = proto_summary(&db, p.id).await?;
        assert_eq!((s.part_demand_count, s.tool_count, s.attachment_count, s.template_item_count), (2, 1, 1, 0));

        remove_proto_tool(&db, p.id, t.id).await?;
        remove_proto_attachment(&db, p.id, a.id).await?;
        assert!(delete_proto_action(&db, p.id).await?);
        assert!(!delete_proto_action(&db, p.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn revision_copies_children() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let p = create_proto_action(&db, &NewProtoAction { action_name: "Flush".into(), revision: Some("2".into()), ..Default::default() }, None).await?;
        add_proto_tool(&db, p.id, &NewTool { tool_id: Uuid::new_v4(), quantity_required: 2, ..Default::default() }).await?;
        let r = create_proto_revision(&db, p.id, None).await?;
        assert_eq!(r.revision.as_deref(), Some("3"));
        assert_eq!(r.prior_revision_id, Some(p.id));
        let detail = get_proto_action(&db, r.id).await?;
        assert_eq!(detail.tools.len(), 1);
        assert_eq!(detail.tools[0].quantity_required, 2);
        Ok(())
    }
}
