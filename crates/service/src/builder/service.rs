use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::enums::{AttachmentLevel, BuildStatus, DEFAULT_ATTACHMENT_TYPE};
use models::validation::{require_positive, require_staff_count, require_text, require_tool_quantity};
use models::{
    proto_action_item, proto_action_tool, proto_part_demand, template_action_attachment, template_action_item,
    template_action_set, template_action_set_attachment, template_action_tool, template_builder_attachment_reference,
    template_builder_memory, template_part_demand,
};

use super::draft::{
    next_revision, ActionPatch, BuildAction, BuildActionTool, BuildAttachment, BuildMetadata, BuildPartDemand,
    BuildState, MetadataPatch, PartDemandPatch, ToolPatch,
};
use crate::errors::ServiceError;
use crate::templates;

/// A builder row with its decoded draft.
#[derive(Debug, Clone, Serialize)]
pub struct BuildView {
    pub id: Uuid,
    pub name: String,
    pub build_type: Option<String>,
    pub build_status: String,
    pub is_revision: bool,
    pub src_revision_id: Option<Uuid>,
    pub src_revision_number: Option<i32>,
    pub template_action_set_id: Option<Uuid>,
    pub created_by_id: Option<Uuid>,
    pub updated_by_id: Option<Uuid>,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub updated_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub state: BuildState,
}

impl BuildView {
    fn new(m: template_builder_memory::Model, state: BuildState) -> Self {
        Self {
            id: m.id,
            name: m.name,
            build_type: m.build_type,
            build_status: m.build_status,
            is_revision: m.is_revision,
            src_revision_id: m.src_revision_id,
            src_revision_number: m.src_revision_number,
            template_action_set_id: m.template_action_set_id,
            created_by_id: m.created_by_id,
            updated_by_id: m.updated_by_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
            state,
        }
    }
}

/// Attachment to place on a draft. `is_new_upload` records a pending reference
/// that is finalized on submit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBuildAttachment {
    pub attachment_id: Uuid,
    #[serde(default)]
    pub attachment_type: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sequence_order: Option<i32>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_new_upload: bool,
}

impl NewBuildAttachment {
    fn to_draft(&self) -> BuildAttachment {
        BuildAttachment {
            attachment_id: self.attachment_id,
            attachment_type: self.attachment_type.clone(),
            caption: self.caption.clone(),
            description: self.description.clone(),
            display_order: None,
            sequence_order: self.sequence_order,
            is_required: self.is_required,
        }
    }
}

/// Persistent operations over `template_builder_memory`.
#[derive(Clone)]
pub struct TemplateBuilder {
    db: DatabaseConnection,
}

async fn find_memory<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<template_builder_memory::Model, ServiceError> {
    template_builder_memory::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("template builder"))
}

fn ensure_open(m: &template_builder_memory::Model) -> Result<(), ServiceError> {
    if m.status()?.is_closed() {
        return Err(ServiceError::Validation(format!("build is {}", m.build_status)));
    }
    Ok(())
}

async fn save<C: ConnectionTrait>(
    db: &C,
    m: template_builder_memory::Model,
    state: &BuildState,
) -> Result<template_builder_memory::Model, ServiceError> {
    let mut am: template_builder_memory::ActiveModel = m.into();
    am.build_state = Set(state.to_json()?);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Loads an open build, applies `f` to its draft and saves it. Nothing is
/// written when `f` fails.
async fn edit_on<C, T, F>(db: &C, id: Uuid, f: F) -> Result<(BuildView, T), ServiceError>
where
    C: ConnectionTrait,
    F: FnOnce(&mut BuildState) -> Result<T, ServiceError>,
{
    let m = find_memory(db, id).await?;
    ensure_open(&m)?;
    let mut state = BuildState::from_json(&m.build_state)?;
    let out = f(&mut state)?;
    let m = save(db, m, &state).await?;
    Ok((BuildView::new(m, state), out))
}

async fn record_upload<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: &NewBuildAttachment,
    level: AttachmentLevel,
    action_index: Option<usize>,
    user_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    let now = Utc::now().into();
    template_builder_attachment_reference::ActiveModel {
        id: Set(Uuid::new_v4()),
        template_builder_memory_id: Set(id),
        attachment_id: Set(input.attachment_id),
        attachment_level: Set(level.as_str().to_string()),
        action_index: Set(action_index.map(|i| i as i32)),
        description: Set(input.description.clone()),
        sequence_order: Set(input.sequence_order.unwrap_or(1)),
        is_required: Set(input.is_required),
        is_finalized: Set(false),
        created_by_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn drop_pending_upload<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    attachment_id: Uuid,
    level: AttachmentLevel,
) -> Result<(), ServiceError> {
    template_builder_attachment_reference::Entity::delete_many()
        .filter(template_builder_attachment_reference::Column::TemplateBuilderMemoryId.eq(id))
        .filter(template_builder_attachment_reference::Column::AttachmentId.eq(attachment_id))
        .filter(template_builder_attachment_reference::Column::AttachmentLevel.eq(level.as_str()))
        .filter(template_builder_attachment_reference::Column::IsFinalized.eq(false))
        .exec(db)
        .await?;
    Ok(())
}

fn parse_revision_number(rev: Option<&str>) -> Option<i32> {
    rev.and_then(|r| r.trim().parse::<i32>().ok())
}

impl TemplateBuilder {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn insert_memory(
        &self,
        name: &str,
        build_type: Option<String>,
        state: &BuildState,
        src: Option<&template_action_set::Model>,
        is_revision: bool,
        user_id: Option<Uuid>,
    ) -> Result<BuildView, ServiceError> {
        require_text("name", name)?;
        let now = Utc::now().into();
        let am = template_builder_memory::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            build_type: Set(build_type),
            build_status: Set(BuildStatus::Initialized.as_str().to_string()),
            is_revision: Set(is_revision),
            src_revision_id: Set(src.map(|t| t.id)),
            src_revision_number: Set(src.and_then(|t| parse_revision_number(t.revision.as_deref()))),
            template_action_set_id: Set(None),
            build_state: Set(state.to_json()?),
            created_by_id: Set(user_id),
            updated_by_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let m = am.insert(&self.db).await?;
        Ok(BuildView::new(m, state.clone()))
    }

    async fn edit<T, F>(&self, id: Uuid, f: F) -> Result<(BuildView, T), ServiceError>
    where
        F: FnOnce(&mut BuildState) -> Result<T, ServiceError>,
    {
        edit_on(&self.db, id, f).await
    }

    #[instrument(skip(self))]
    pub async fn create_blank(&self, name: &str, build_type: Option<String>, user_id: Option<Uuid>) -> Result<BuildView, ServiceError> {
        let view = self.insert_memory(name, build_type, &BuildState::blank(), None, false, user_id).await?;
        info!(id = %view.id, "blank build created");
        Ok(view)
    }

    /// Draft seeded with a full copy of an existing template.
    #[instrument(skip(self))]
    pub async fn copy_from_template(
        &self,
        template_id: Uuid,
        name: &str,
        is_revision: bool,
        user_id: Option<Uuid>,
    ) -> Result<BuildView, ServiceError> {
        let detail = templates::load_detail(&self.db, template_id).await?;
        let mut metadata = BuildMetadata::from_template(&detail.template);
        if is_revision {
            metadata.revision = Some(next_revision(detail.template.revision.as_deref()));
            metadata.prior_revision_id = Some(detail.template.id);
        } else {
            metadata.revision = Some("0".to_string());
            metadata.prior_revision_id = None;
        }
        let state = BuildState {
            metadata,
            actions: detail
                .items
                .iter()
                .map(|i| BuildAction::from_template_item(&i.item, &i.part_demands, &i.tools, &i.attachments, None))
                .collect(),
            attachments: detail.attachments.iter().map(BuildAttachment::from_set_attachment).collect(),
        };
        let view = self
            .insert_memory(name, Some("template_copy".into()), &state, Some(&detail.template), is_revision, user_id)
            .await?;
        info!(id = %view.id, template_id = %template_id, is_revision, "build copied from template");
        Ok(view)
    }

    pub async fn load(&self, id: Uuid) -> Result<BuildView, ServiceError> {
        let m = find_memory(&self.db, id).await?;
        let state = BuildState::from_json(&m.build_state)?;
        Ok(BuildView::new(m, state))
    }

    pub async fn list_builders(&self, status: Option<BuildStatus>) -> Result<Vec<BuildView>, ServiceError> {
        let mut q = template_builder_memory::Entity::find();
        if let Some(s) = status {
            q = q.filter(template_builder_memory::Column::BuildStatus.eq(s.as_str()));
        }
        let rows = q.order_by_desc(template_builder_memory::Column::UpdatedAt).all(&self.db).await?;
        let mut out = Vec::with_capacity(rows.len());
        for m in rows {
            let state = match BuildState::from_json(&m.build_state) {
                Ok(s) => s,
                Err(e) => {
                    warn!(id = %m.id, error = %e, "unreadable build state");
                    BuildState::default()
                }
            };
            out.push(BuildView::new(m, state));
        }
        Ok(out)
    }

    pub async fn abandon(&self, id: Uuid) -> Result<BuildView, ServiceError> {
        let view = self.set_status_unchecked(id, BuildStatus::Abandoned).await?;
        info!(id = %id, "build abandoned");
        Ok(view)
    }

    pub async fn delete_builder(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = template_builder_memory::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn set_metadata(&self, id: Uuid, patch: &MetadataPatch) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| patch.apply(&mut s.metadata)).await?.0)
    }

    /// Moves an open build between its editable statuses. Use [`Self::submit`]
    /// and [`Self::abandon`] to close it.
    pub async fn set_build_status(&self, id: Uuid, status: BuildStatus) -> Result<BuildView, ServiceError> {
        if status.is_closed() {
            return Err(ServiceError::Validation(format!("status {} cannot be set directly", status)));
        }
        self.set_status_unchecked(id, status).await
    }

    async fn set_status_unchecked(&self, id: Uuid, status: BuildStatus) -> Result<BuildView, ServiceError> {
        let m = find_memory(&self.db, id).await?;
        ensure_open(&m)?;
        let state = BuildState::from_json(&m.build_state)?;
        let mut am: template_builder_memory::ActiveModel = m.into();
        am.build_status = Set(status.as_str().to_string());
        am.updated_at = Set(Utc::now().into());
        Ok(BuildView::new(am.update(&self.db).await?, state))
    }

    pub async fn rename(&self, id: Uuid, name: &str, build_type: Option<String>) -> Result<BuildView, ServiceError> {
        require_text("name", name)?;
        let m = find_memory(&self.db, id).await?;
        ensure_open(&m)?;
        let state = BuildState::from_json(&m.build_state)?;
        let mut am: template_builder_memory::ActiveModel = m.into();
        am.name = Set(name.trim().to_string());
        if build_type.is_some() {
            am.build_type = Set(build_type);
        }
        am.updated_at = Set(Utc::now().into());
        Ok(BuildView::new(am.update(&self.db).await?, state))
    }

    // -- actions --------------------------------------------------------

    /// Appends a copy of a template item with its children. Returns the view and the new action index.
    pub async fn add_action_from_template_item(&self, id: Uuid, item_id: Uuid) -> Result<(BuildView, usize), ServiceError> {
        let item = template_action_item::Entity::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("template action item"))?;
        let ids = [item.id];
        let parts = templates::part_demands_for(&self.db, &ids).await?.remove(&item.id).unwrap_or_default();
        let tools = templates::tools_for(&self.db, &ids).await?.remove(&item.id).unwrap_or_default();
        let attachments = template_action_attachment::Entity::find()
            .filter(template_action_attachment::Column::TemplateActionItemId.eq(item.id))
            .order_by_asc(template_action_attachment::Column::SequenceOrder)
            .all(&self.db)
            .await?;
        self.edit(id, |s| {
            let next = s.next_action_sequence();
            Ok(s.push_action(BuildAction::from_template_item(&item, &parts, &tools, &attachments, Some(next))))
        })
        .await
    }

    pub async fn add_action_from_proto(&self, id: Uuid, proto_id: Uuid) -> Result<(BuildView, usize), ServiceError> {
        let proto = proto_action_item::Entity::find_by_id(proto_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("proto action item"))?;
        let parts = proto_part_demand::Entity::find()
            .filter(proto_part_demand::Column::ProtoActionItemId.eq(proto_id))
            .order_by_asc(proto_part_demand::Column::SequenceOrder)
            .all(&self.db)
            .await?;
        let tools = proto_action_tool::Entity::find()
            .filter(proto_action_tool::Column::ProtoActionItemId.eq(proto_id))
            .order_by_asc(proto_action_tool::Column::SequenceOrder)
            .all(&self.db)
            .await?;
        self.edit(id, |s| {
            let next = s.next_action_sequence();
            Ok(s.push_action(BuildAction::from_proto(&proto, &parts, &tools, next)))
        })
        .await
    }

    /// A positive `sequence_order` places the action at that position; otherwise it is appended.
    pub async fn add_custom_action(&self, id: Uuid, action: BuildAction) -> Result<(BuildView, usize), ServiceError> {
        require_text("action_name", &action.action_name)?;
        self.edit(id, |s| Ok(s.place_action(action))).await
    }

    pub async fn update_action(&self, id: Uuid, index: usize, patch: &ActionPatch) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.update_action(index, patch)).await?.0)
    }

    pub async fn remove_action(&self, id: Uuid, index: usize) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.remove_action(index).map(|_| ())).await?.0)
    }

    pub async fn unlink_proto_from_action(&self, id: Uuid, index: usize) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.unlink_proto(index)).await?.0)
    }

    // -- part demands and tools -------------------------------------------

    pub async fn add_part_demand_to_action(&self, id: Uuid, index: usize, part: BuildPartDemand) -> Result<(BuildView, usize), ServiceError> {
        require_positive("quantity_required", part.quantity_required)?;
        self.edit(id, |s| s.add_part_demand(index, part)).await
    }

    pub async fn update_part_demand(&self, id: Uuid, index: usize, part_index: usize, patch: &PartDemandPatch) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.update_part_demand(index, part_index, patch)).await?.0)
    }

    pub async fn remove_part_demand_from_action(&self, id: Uuid, index: usize, part_index: usize) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.remove_part_demand(index, part_index).map(|_| ())).await?.0)
    }

    pub async fn add_tool_to_action(&self, id: Uuid, index: usize, tool: BuildActionTool) -> Result<(BuildView, usize), ServiceError> {
        require_tool_quantity(tool.quantity_required)?;
        self.edit(id, |s| s.add_tool(index, tool)).await
    }

    pub async fn update_tool(&self, id: Uuid, index: usize, tool_index: usize, patch: &ToolPatch) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.update_tool(index, tool_index, patch)).await?.0)
    }

    pub async fn remove_tool_from_action(&self, id: Uuid, index: usize, tool_index: usize) -> Result<BuildView, ServiceError> {
        Ok(self.edit(id, |s| s.remove_tool(index, tool_index).map(|_| ())).await?.0)
    }

    // -- attachments ------------------------------------------------------

    /// The pending upload reference and the draft change commit together.
    pub async fn add_attachment(&self, id: Uuid, input: NewBuildAttachment, user_id: Option<Uuid>) -> Result<(BuildView, usize), ServiceError> {
        let txn = self.db.begin().await?;
        let out = edit_on(&txn, id, |s| Ok(s.add_attachment(input.to_draft()))).await?;
        if input.is_new_upload {
            record_upload(&txn, id, &input, AttachmentLevel::ActionSet, None, user_id).await?;
        }
        txn.commit().await?;
        Ok(out)
    }

    pub async fn remove_attachment(&self, id: Uuid, attachment_index: usize) -> Result<BuildView, ServiceError> {
        let txn = self.db.begin().await?;
        let (view, removed) = edit_on(&txn, id, |s| s.remove_attachment(attachment_index)).await?;
        drop_pending_upload(&txn, id, removed.attachment_id, AttachmentLevel::ActionSet).await?;
        txn.commit().await?;
        Ok(view)
    }

    pub async fn add_attachment_to_action(
        &self,
        id: Uuid,
        index: usize,
        input: NewBuildAttachment,
        user_id: Option<Uuid>,
    ) -> Result<(BuildView, usize), ServiceError> {
        let txn = self.db.begin().await?;
        let out = edit_on(&txn, id, |s| s.add_action_attachment(index, input.to_draft())).await?;
        if input.is_new_upload {
            record_upload(&txn, id, &input, AttachmentLevel::Action, Some(index), user_id).await?;
        }
        txn.commit().await?;
        Ok(out)
    }

    pub async fn remove_attachment_from_action(&self, id: Uuid, index: usize, attachment_index: usize) -> Result<BuildView, ServiceError> {
        let txn = self.db.begin().await?;
        let (view, removed) = edit_on(&txn, id, |s| s.remove_action_attachment(index, attachment_index)).await?;
        drop_pending_upload(&txn, id, removed.attachment_id, AttachmentLevel::Action).await?;
        txn.commit().await?;
        Ok(view)
    }

    // -- submit -----------------------------------------------------------

    /// Writes the draft as a new template in one transaction and closes the build.
    #[instrument(skip(self))]
    pub async fn submit(&self, id: Uuid, user_id: Option<Uuid>) -> Result<BuildView, ServiceError> {
        let txn = self.db.begin().await?;
        let m = find_memory(&txn, id).await?;
        ensure_open(&m)?;
        let state = BuildState::from_json(&m.build_state)?;
        state.validate_for_submit()?;
        for a in &state.actions {
            require_staff_count(a.minimum_staff_count)?;
            for p in &a.part_demands {
                require_positive("quantity_required", p.quantity_required)?;
            }
            for t in &a.tools {
                require_tool_quantity(t.quantity_required)?;
            }
        }

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let md = &state.metadata;
        let prior = if m.is_revision { m.src_revision_id } else { md.prior_revision_id };
        let set = template_action_set::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_name: Set(md.task_name.trim().to_string()),
            description: Set(md.description.clone()),
            estimated_duration: Set(md.estimated_duration),
            safety_review_required: Set(md.safety_review_required),
            staff_count: Set(md.staff_count),
            parts_cost: Set(md.parts_cost),
            labor_hours: Set(md.labor_hours),
            revision: Set(Some(md.revision.clone().unwrap_or_else(|| "0".to_string()))),
            prior_revision_id: Set(prior),
            is_active: Set(md.is_active),
            maintenance_plan_id: Set(None),
            asset_type_id: Set(md.asset_type_id),
            make_model_id: Set(md.make_model_id),
            created_by_id: Set(user_id),
            updated_by_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for a in &state.actions {
            let item = template_action_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                template_action_set_id: Set(set.id),
                proto_action_item_id: Set(a.proto_action_item_id),
                action_name: Set(a.action_name.trim().to_string()),
                description: Set(a.description.clone()),
                estimated_duration: Set(a.estimated_duration),
                expected_billable_hours: Set(a.expected_billable_hours),
                safety_notes: Set(a.safety_notes.clone()),
                notes: Set(a.notes.clone()),
                is_required: Set(a.is_required),
                instructions: Set(a.instructions.clone()),
                instructions_type: Set(a.instructions_type.clone()),
                minimum_staff_count: Set(a.minimum_staff_count),
                required_skills: Set(a.required_skills.clone()),
                sequence_order: Set(a.sequence_order),
                revision: Set(a.revision.clone()),
                prior_revision_id: Set(a.prior_revision_id),
                created_by_id: Set(user_id),
                updated_by_id: Set(user_id),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;

            for (i, p) in a.part_demands.iter().enumerate() {
                template_part_demand::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    template_action_item_id: Set(item.id),
                    part_id: Set(p.part_id),
                    quantity_required: Set(p.quantity_required),
                    expected_cost: Set(p.expected_cost),
                    notes: Set(p.notes.clone()),
                    is_optional: Set(p.is_optional),
                    sequence_order: Set(i as i32 + 1),
                }
                .insert(&txn)
                .await?;
            }
            for (i, t) in a.tools.iter().enumerate() {
                template_action_tool::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    template_action_item_id: Set(item.id),
                    tool_id: Set(t.tool_id),
                    quantity_required: Set(t.quantity_required),
                    notes: Set(t.notes.clone()),
                    is_required: Set(t.is_required),
                    sequence_order: Set(i as i32 + 1),
                }
                .insert(&txn)
                .await?;
            }
            for (i, at) in a.attachments.iter().enumerate() {
                let seq = i as i32 + 1;
                template_action_attachment::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    template_action_item_id: Set(item.id),
                    attachment_id: Set(at.attachment_id),
                    attachment_type: Set(at.attachment_type.clone().unwrap_or_else(|| DEFAULT_ATTACHMENT_TYPE.to_string())),
                    caption: Set(at.caption.clone()),
                    description: Set(at.description.clone()),
                    display_order: Set(seq),
                    sequence_order: Set(at.sequence_order.unwrap_or(seq)),
                    is_required: Set(at.is_required),
                }
                .insert(&txn)
                .await?;
            }
        }

        for (i, at) in state.attachments.iter().enumerate() {
            let seq = i as i32 + 1;
            template_action_set_attachment::ActiveModel {
                id: Set(Uuid::new_v4()),
                template_action_set_id: Set(set.id),
                attachment_id: Set(at.attachment_id),
                attachment_type: Set(at.attachment_type.clone().unwrap_or_else(|| DEFAULT_ATTACHMENT_TYPE.to_string())),
                caption: Set(at.caption.clone()),
                description: Set(at.description.clone()),
                display_order: Set(seq),
                sequence_order: Set(at.sequence_order.unwrap_or(seq)),
                is_required: Set(at.is_required),
            }
            .insert(&txn)
            .await?;
        }

        template_builder_attachment_reference::Entity::update_many()
            .col_expr(template_builder_attachment_reference::Column::IsFinalized, Expr::value(true))
            .col_expr(template_builder_attachment_reference::Column::UpdatedAt, Expr::value(now))
            .filter(template_builder_attachment_reference::Column::TemplateBuilderMemoryId.eq(id))
            .filter(template_builder_attachment_reference::Column::IsFinalized.eq(false))
            .exec(&txn)
            .await?;

        let mut am: template_builder_memory::ActiveModel = m.into();
        am.build_status = Set(BuildStatus::Submitted.as_str().to_string());
        am.template_action_set_id = Set(Some(set.id));
        am.updated_by_id = Set(user_id);
        am.updated_at = Set(now);
        let m = am.update(&txn).await?;
        txn.commit().await?;

        info!(id = %id, template_id = %set.id, actions = state.actions.len(), "build submitted");
        Ok(BuildView::new(m, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use sea_orm::PaginatorTrait;
    use serde_json::json;

    fn action(name: &str) -> BuildAction {
        BuildAction { action_name: name.into(), ..Default::default() }
    }

    async fn seed_proto(db: &DatabaseConnection) -> Result<proto_action_item::Model, anyhow::Error> {
        let p = crate::proto::create_proto_action(db, &crate::proto::NewProtoAction {
            action_name: "Replace filter".into(),
            estimated_duration: Some(0.25),
            minimum_staff_count: Some(2),
            ..Default::default()
        }, None).await?;
        crate::proto::add_proto_part_demand(db, p.id, &crate::proto::NewPartDemand { part_id: Uuid::new_v4(), quantity_required: 1.0, ..Default::default() }).await?;
        crate::proto::add_proto_attachment(db, p.id, &crate::proto::NewAttachment { attachment_id: Uuid::new_v4(), ..Default::default() }).await?;
        Ok(p)
    }

    #[tokio::test]
    async fn build_edit_and_submit() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let view = b.create_blank("Quarterly", Some("manual".into()), None).await?;
        assert_eq!(view.build_status, "Initialized");
        assert_eq!(view.state.metadata.revision.as_deref(), Some("0"));

        b.set_metadata(view.id, &serde_json::from_value(json!({"task_name": "Quarterly check"}))?).await?;
        b.add_custom_action(view.id, action("Inspect")).await?;
        let proto = seed_proto(&db).await?;
        let (v, idx) = b.add_action_from_proto(view.id, proto.id).await?;
        assert_eq!(idx, 1);
        assert_eq!(v.state.actions[1].proto_action_item_id, Some(proto.id));
        assert_eq!(v.state.actions[1].minimum_staff_count, 1);
        assert_eq!(v.state.actions[1].part_demands.len(), 1);
        assert!(v.state.actions[1].attachments.is_empty());

        b.add_tool_to_action(view.id, 0, BuildActionTool { tool_id: Uuid::new_v4(), ..Default::default() }).await?;
        b.add_attachment(view.id, NewBuildAttachment { attachment_id: Uuid::new_v4(), is_new_upload: true, ..Default::default() }, None).await?;
        let err = b.update_action(view.id, 5, &ActionPatch::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::IndexOutOfRange(_)));

        let done = b.submit(view.id, None).await?;
        assert_eq!(done.build_status, "Submitted");
        let tid = done.template_action_set_id.expect("template linked");
        let detail = templates::load_detail(&db, tid).await?;
        assert_eq!(detail.template.task_name, "Quarterly check");
        assert_eq!(detail.template.revision.as_deref(), Some("0"));
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].tools[0].sequence_order, 1);
        assert_eq!(detail.attachments[0].attachment_type, "Document");
        assert_eq!(detail.attachments[0].display_order, 1);

        let pending = template_builder_attachment_reference::Entity::find()
            .filter(template_builder_attachment_reference::Column::TemplateBuilderMemoryId.eq(view.id))
            .filter(template_builder_attachment_reference::Column::IsFinalized.eq(false))
            .count(&db)
            .await?;
        assert_eq!(pending, 0);

        assert!(matches!(b.submit(view.id, None).await, Err(ServiceError::Validation(_))));
        assert!(matches!(b.add_custom_action(view.id, action("Late")).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn failed_submit_leaves_draft_untouched() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let view = b.create_blank("No name yet", None, None).await?;
        b.add_custom_action(view.id, action("Step")).await?;
        assert!(matches!(b.submit(view.id, None).await, Err(ServiceError::Validation(_))));
        let after = b.load(view.id).await?;
        assert_eq!(after.build_status, "Initialized");
        assert_eq!(after.template_action_set_id, None);
        assert_eq!(after.state.actions.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn revision_copy_links_source() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let first = b.create_blank("v0", None, None).await?;
        b.set_metadata(first.id, &serde_json::from_value(json!({"task_name": "Lube", "revision": "3"}))?).await?;
        b.add_custom_action(first.id, action("Grease")).await?;
        let src = b.submit(first.id, None).await?.template_action_set_id.expect("template");

        let rev = b.copy_from_template(src, "v4", true, None).await?;
        assert!(rev.is_revision);
        assert_eq!(rev.src_revision_id, Some(src));
        assert_eq!(rev.src_revision_number, Some(3));
        assert_eq!(rev.state.metadata.revision.as_deref(), Some("4"));
        assert_eq!(rev.state.actions.len(), 1);

        let copy = b.copy_from_template(src, "copy", false, None).await?;
        assert_eq!(copy.state.metadata.revision.as_deref(), Some("0"));
        assert_eq!(copy.state.metadata.prior_revision_id, None);

        let new_id = b.submit(rev.id, None).await?.template_action_set_id.expect("template");
        let history = templates::revision_history(&db, new_id).await?;
        assert_eq!(history.iter().map(|t| t.id).collect::<Vec<_>>(), vec![new_id, src]);

        let item_id = templates::items_of(&db, src).await?[0].id;
        let (v, idx) = b.add_action_from_template_item(copy.id, item_id).await?;
        assert_eq!(v.state.actions[idx].sequence_order, 2);

        let abandoned = b.abandon(copy.id).await?;
        assert_eq!(abandoned.build_status, "Abandoned");
        assert!(matches!(b.submit(copy.id, None).await, Err(ServiceError::Validation(_))));
        let submitted: Vec<Uuid> = b.list_builders(Some(BuildStatus::Submitted)).await?.iter().map(|v| v.id).collect();
        assert!(submitted.contains(&first.id) && submitted.contains(&rev.id));
        assert!(!submitted.contains(&copy.id));
        assert!(b.delete_builder(copy.id).await?);
        Ok(())
    }

    async fn pending_uploads(db: &DatabaseConnection, id: Uuid) -> Result<u64, anyhow::Error> {
        Ok(template_builder_attachment_reference::Entity::find()
            .filter(template_builder_attachment_reference::Column::TemplateBuilderMemoryId.eq(id))
            .filter(template_builder_attachment_reference::Column::IsFinalized.eq(false))
            .count(db)
            .await?)
    }

    #[tokio::test]
    async fn closed_builds_reject_status_changes_and_rename() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let view = b.create_blank("Weekly", None, None).await?;

        let moved = b.set_build_status(view.id, BuildStatus::InProgress).await?;
        assert_eq!(moved.build_status, "In Progress");
        assert!(matches!(b.set_build_status(view.id, BuildStatus::Submitted).await, Err(ServiceError::Validation(_))));
        let renamed = b.rename(view.id, "Weekly walkaround", Some("manual".into())).await?;
        assert_eq!(renamed.name, "Weekly walkaround");

        b.abandon(view.id).await?;
        assert!(matches!(b.set_build_status(view.id, BuildStatus::ReadyForReview).await, Err(ServiceError::Validation(_))));
        assert!(matches!(b.rename(view.id, "Too late", None).await, Err(ServiceError::Validation(_))));
        let after = b.load(view.id).await?;
        assert_eq!(after.name, "Weekly walkaround");
        assert_eq!(after.build_status, "Abandoned");
        Ok(())
    }

    #[tokio::test]
    async fn metadata_typo_is_rejected() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let view = b.create_blank("Typo", None, None).await?;
        b.set_metadata(view.id, &serde_json::from_value(json!({"task_name": "Grease"}))?).await?;

        let err = b.set_metadata(view.id, &serde_json::from_value(json!({"tsak_name": "Oil"}))?).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(b.load(view.id).await?.state.metadata.task_name, "Grease");
        Ok(())
    }

    #[tokio::test]
    async fn custom_action_inserted_at_requested_position() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let view = b.create_blank("Ordered", None, None).await?;
        b.add_custom_action(view.id, action("Drain")).await?;
        b.add_custom_action(view.id, action("Refill")).await?;

        let (v, idx) = b.add_custom_action(view.id, BuildAction { sequence_order: 1, ..action("Lock out") }).await?;
        assert_eq!(idx, 0);
        let order: Vec<(&str, i32)> = v.state.actions.iter().map(|a| (a.action_name.as_str(), a.sequence_order)).collect();
        assert_eq!(order, vec![("Lock out", 1), ("Drain", 2), ("Refill", 3)]);
        Ok(())
    }

    #[tokio::test]
    async fn action_level_links_and_uploads() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let b = TemplateBuilder::new(db.clone());
        let view = b.create_blank("Filters", None, None).await?;
        let proto = seed_proto(&db).await?;
        b.add_action_from_proto(view.id, proto.id).await?;

        let v = b.unlink_proto_from_action(view.id, 0).await?;
        assert_eq!(v.state.actions[0].proto_action_item_id, None);
        assert_eq!(v.state.actions[0].action_name, "Replace filter");
        assert!(matches!(b.unlink_proto_from_action(view.id, 3).await, Err(ServiceError::IndexOutOfRange(_))));

        let upload = NewBuildAttachment { attachment_id: Uuid::new_v4(), is_new_upload: true, ..Default::default() };
        let (v, at) = b.add_attachment_to_action(view.id, 0, upload.clone(), None).await?;
        assert_eq!(at, 0);
        assert_eq!(v.state.actions[0].attachments[0].attachment_id, upload.attachment_id);
        assert_eq!(pending_uploads(&db, view.id).await?, 1);

        // a rejected edit records no pending upload
        let stray = NewBuildAttachment { attachment_id: Uuid::new_v4(), is_new_upload: true, ..Default::default() };
        assert!(matches!(b.add_attachment_to_action(view.id, 4, stray, None).await, Err(ServiceError::IndexOutOfRange(_))));
        assert_eq!(pending_uploads(&db, view.id).await?, 1);

        let v = b.remove_attachment_from_action(view.id, 0, 0).await?;
        assert!(v.state.actions[0].attachments.is_empty());
        assert_eq!(pending_uploads(&db, view.id).await?, 0);
        assert!(matches!(b.remove_attachment_from_action(view.id, 0, 0).await, Err(ServiceError::IndexOutOfRange(_))));
        Ok(())
    }
}
