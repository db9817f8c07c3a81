//! In-memory draft of a template.
//!
//! The draft is stored as JSON on `template_builder_memory.build_state`.
//! Everything here is pure; persistence lives in [`super::service`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use models::{
    proto_action_item, proto_action_tool, proto_part_demand, template_action_attachment,
    template_action_item, template_action_set, template_action_set_attachment, template_action_tool,
    template_part_demand,
};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildState {
    pub metadata: BuildMetadata,
    pub actions: Vec<BuildAction>,
    pub attachments: Vec<BuildAttachment>,
}

/// Template set fields carried by a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildMetadata {
    pub task_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub safety_review_required: bool,
    pub staff_count: Option<i32>,
    pub parts_cost: Option<f64>,
    pub labor_hours: Option<f64>,
    pub revision: Option<String>,
    pub prior_revision_id: Option<Uuid>,
    pub is_active: bool,
    pub asset_type_id: Option<Uuid>,
    pub make_model_id: Option<Uuid>,
}

impl Default for BuildMetadata {
    fn default() -> Self {
        Self {
            task_name: String::new(),
            description: None,
            estimated_duration: None,
            safety_review_required: false,
            staff_count: None,
            parts_cost: None,
            labor_hours: None,
            revision: None,
            prior_revision_id: None,
            is_active: true,
            asset_type_id: None,
            make_model_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildAction {
    pub action_name: String,
    pub description: Option<String>,
    pub estimated_duration: Option<f64>,
    pub expected_billable_hours: Option<f64>,
    pub safety_notes: Option<String>,
    pub notes: Option<String>,
    pub is_required: bool,
    pub instructions: Option<String>,
    pub instructions_type: Option<String>,
    pub minimum_staff_count: i32,
    pub required_skills: Option<String>,
    pub sequence_order: i32,
    pub revision: Option<String>,
    pub prior_revision_id: Option<Uuid>,
    pub proto_action_item_id: Option<Uuid>,
    pub part_demands: Vec<BuildPartDemand>,
    pub tools: Vec<BuildActionTool>,
    pub attachments: Vec<BuildAttachment>,
}

impl Default for BuildAction {
    fn default() -> Self {
        Self {
            action_name: String::new(),
            description: None,
            estimated_duration: None,
            expected_billable_hours: None,
            safety_notes: None,
            notes: None,
            is_required: true,
            instructions: None,
            instructions_type: None,
            minimum_staff_count: 1,
            required_skills: None,
            sequence_order: 0,
            revision: None,
            prior_revision_id: None,
            proto_action_item_id: None,
            part_demands: Vec::new(),
            tools: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildPartDemand {
    pub part_id: Uuid,
    pub quantity_required: f64,
    pub expected_cost: Option<f64>,
    pub notes: Option<String>,
    pub is_optional: bool,
    pub sequence_order: i32,
}

impl Default for BuildPartDemand {
    fn default() -> Self {
        Self {
            part_id: Uuid::nil(),
            quantity_required: 1.0,
            expected_cost: None,
            notes: None,
            is_optional: false,
            sequence_order: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildActionTool {
    pub tool_id: Uuid,
    pub quantity_required: i32,
    pub notes: Option<String>,
    pub is_required: bool,
    pub sequence_order: i32,
}

impl Default for BuildActionTool {
    fn default() -> Self {
        Self { tool_id: Uuid::nil(), quantity_required: 1, notes: None, is_required: true, sequence_order: 0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildAttachment {
    pub attachment_id: Uuid,
    pub attachment_type: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub sequence_order: Option<i32>,
    pub is_required: bool,
}

// ---------------------------------------------------------------------------
// Copies from persisted rows
// ---------------------------------------------------------------------------

impl BuildMetadata {
    pub fn from_template(t: &template_action_set::Model) -> Self {
        Self {
            task_name: t.task_name.clone(),
            description: t.description.clone(),
            estimated_duration: t.estimated_duration,
            safety_review_required: t.safety_review_required,
            staff_count: t.staff_count,
            parts_cost: t.parts_cost,
            labor_hours: t.labor_hours,
            revision: t.revision.clone(),
            prior_revision_id: t.prior_revision_id,
            is_active: t.is_active,
            asset_type_id: t.asset_type_id,
            make_model_id: t.make_model_id,
        }
    }
}

impl BuildAction {
    /// Full copy of a template item and its children. `sequence_order` overrides the source's.
    pub fn from_template_item(
        item: &template_action_item::Model,
        parts: &[template_part_demand::Model],
        tools: &[template_action_tool::Model],
        attachments: &[template_action_attachment::Model],
        sequence_order: Option<i32>,
    ) -> Self {
        Self {
            action_name: item.action_name.clone(),
            description: item.description.clone(),
            estimated_duration: item.estimated_duration,
            expected_billable_hours: item.expected_billable_hours,
            safety_notes: item.safety_notes.clone(),
            notes: item.notes.clone(),
            is_required: item.is_required,
            instructions: item.instructions.clone(),
            instructions_type: item.instructions_type.clone(),
            minimum_staff_count: item.minimum_staff_count,
            required_skills: item.required_skills.clone(),
            sequence_order: sequence_order.unwrap_or(item.sequence_order),
            revision: item.revision.clone(),
            prior_revision_id: item.prior_revision_id,
            proto_action_item_id: item.proto_action_item_id,
            part_demands: parts
                .iter()
                .map(|p| BuildPartDemand {
                    part_id: p.part_id,
                    quantity_required: p.quantity_required,
                    expected_cost: p.expected_cost,
                    notes: p.notes.clone(),
                    is_optional: p.is_optional,
                    sequence_order: p.sequence_order,
                })
                .collect(),
            tools: tools
                .iter()
                .map(|t| BuildActionTool {
                    tool_id: t.tool_id,
                    quantity_required: t.quantity_required,
                    notes: t.notes.clone(),
                    is_required: t.is_required,
                    sequence_order: t.sequence_order,
                })
                .collect(),
            attachments: attachments
                .iter()
                .map(|a| BuildAttachment {
                    attachment_id: a.attachment_id,
                    attachment_type: Some(a.attachment_type.clone()),
                    caption: a.caption.clone(),
                    description: a.description.clone(),
                    display_order: Some(a.display_order),
                    sequence_order: Some(a.sequence_order),
                    is_required: a.is_required,
                })
                .collect(),
        }
    }

    /// Base fields of a proto item plus its part demands and tools. Attachments stay behind.
    pub fn from_proto(
        proto: &proto_action_item::Model,
        parts: &[proto_part_demand::Model],
        tools: &[proto_action_tool::Model],
        sequence_order: i32,
    ) -> Self {
        Self {
            action_name: proto.action_name.clone(),
            description: proto.description.clone(),
            estimated_duration: proto.estimated_duration,
            expected_billable_hours: proto.expected_billable_hours,
            safety_notes: proto.safety_notes.clone(),
            notes: proto.notes.clone(),
            is_required: true,
            minimum_staff_count: 1,
            sequence_order,
            proto_action_item_id: Some(proto.id),
            part_demands: parts
                .iter()
                .map(|p| BuildPartDemand {
                    part_id: p.part_id,
                    quantity_required: p.quantity_required,
                    expected_cost: p.expected_cost,
                    notes: p.notes.clone(),
                    is_optional: p.is_optional,
                    sequence_order: p.sequence_order,
                })
                .collect(),
            tools: tools
                .iter()
                .map(|t| BuildActionTool {
                    tool_id: t.tool_id,
                    quantity_required: t.quantity_required,
                    notes: t.notes.clone(),
                    is_required: t.is_required,
                    sequence_order: t.sequence_order,
                })
                .collect(),
            ..Default::default()
        }
    }
}

impl BuildAttachment {
    pub fn from_set_attachment(a: &template_action_set_attachment::Model) -> Self {
        Self {
            attachment_id: a.attachment_id,
            attachment_type: Some(a.attachment_type.clone()),
            caption: a.caption.clone(),
            description: a.description.clone(),
            display_order: Some(a.display_order),
            sequence_order: Some(a.sequence_order),
            is_required: a.is_required,
        }
    }
}

// ---------------------------------------------------------------------------
// Revision numbering
// ---------------------------------------------------------------------------

/// Revision for a copy of a template whose revision is `source`.
pub fn next_revision(source: Option<&str>) -> String {
    match source.map(str::trim).filter(|s| !s.is_empty()) {
        None => "1".to_string(),
        Some(rev) => match rev.parse::<i64>() {
            Ok(n) => (n + 1).to_string(),
            Err(_) => "2".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

fn next_sequence<I: Iterator<Item = i32>>(orders: I) -> i32 {
    orders.max().map(|m| m.max(0) + 1).unwrap_or(1)
}

impl BuildState {
    /// Blank draft with revision "0".
    pub fn blank() -> Self {
        let mut state = Self::default();
        state.metadata.revision = Some("0".to_string());
        state
    }

    pub fn from_json(raw: &str) -> Result<Self, ServiceError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, ServiceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn next_action_sequence(&self) -> i32 {
        next_sequence(self.actions.iter().map(|a| a.sequence_order))
    }

    fn renumber_actions(&mut self) {
        for (i, a) in self.actions.iter_mut().enumerate() {
            a.sequence_order = i as i32 + 1;
        }
    }

    pub fn action(&self, index: usize) -> Result<&BuildAction, ServiceError> {
        self.actions.get(index).ok_or_else(|| ServiceError::index("action", index))
    }

    pub fn action_mut(&mut self, index: usize) -> Result<&mut BuildAction, ServiceError> {
        self.actions.get_mut(index).ok_or_else(|| ServiceError::index("action", index))
    }

    /// Appends with the next free sequence order. Returns the new index.
    pub fn push_action(&mut self, mut action: BuildAction) -> usize {
        action.sequence_order = self.next_action_sequence();
        self.actions.push(action);
        self.actions.len() - 1
    }

    /// Inserts before the first action whose order is at least the requested
    /// one and renumbers. An order of 0 or less appends. Returns the new index.
    pub fn place_action(&mut self, action: BuildAction) -> usize {
        let wanted = action.sequence_order;
        if wanted <= 0 {
            return self.push_action(action);
        }
        let at = self
            .actions
            .iter()
            .position(|a| a.sequence_order >= wanted)
            .unwrap_or(self.actions.len());
        self.actions.insert(at, action);
        self.renumber_actions();
        at
    }

    pub fn remove_action(&mut self, index: usize) -> Result<BuildAction, ServiceError> {
        if index >= self.actions.len() {
            return Err(ServiceError::index("action", index));
        }
        let removed = self.actions.remove(index);
        self.renumber_actions();
        Ok(removed)
    }

    /// Applies the patch; a changed sequence order re-sorts the actions and renumbers them.
    pub fn update_action(&mut self, index: usize, patch: &ActionPatch) -> Result<(), ServiceError> {
        let resequence = patch.apply(self.action_mut(index)?);
        if resequence {
            // Vec::sort_by_key is stable
            self.actions.sort_by_key(|a| a.sequence_order);
            self.renumber_actions();
        }
        Ok(())
    }

    pub fn add_part_demand(&mut self, index: usize, mut part: BuildPartDemand) -> Result<usize, ServiceError> {
        let action = self.action_mut(index)?;
        if part.sequence_order <= 0 {
            part.sequence_order = next_sequence(action.part_demands.iter().map(|p| p.sequence_order));
        }
        action.part_demands.push(part);
        Ok(action.part_demands.len() - 1)
    }

    pub fn update_part_demand(&mut self, index: usize, part_index: usize, patch: &PartDemandPatch) -> Result<(), ServiceError> {
        let action = self.action_mut(index)?;
        let part = action
            .part_demands
            .get_mut(part_index)
            .ok_or_else(|| ServiceError::index("part demand", part_index))?;
        patch.apply(part);
        Ok(())
    }

    pub fn remove_part_demand(&mut self, index: usize, part_index: usize) -> Result<BuildPartDemand, ServiceError> {
        let action = self.action_mut(index)?;
        if part_index >= action.part_demands.len() {
            return Err(ServiceError::index("part demand", part_index));
        }
        Ok(action.part_demands.remove(part_index))
    }

    pub fn add_tool(&mut self, index: usize, mut tool: BuildActionTool) -> Result<usize, ServiceError> {
        let action = self.action_mut(index)?;
        if tool.sequence_order <= 0 {
            tool.sequence_order = next_sequence(action.tools.iter().map(|t| t.sequence_order));
        }
        action.tools.push(tool);
        Ok(action.tools.len() - 1)
    }

    pub fn update_tool(&mut self, index: usize, tool_index: usize, patch: &ToolPatch) -> Result<(), ServiceError> {
        let action = self.action_mut(index)?;
        let tool = action.tools.get_mut(tool_index).ok_or_else(|| ServiceError::index("tool", tool_index))?;
        patch.apply(tool);
        Ok(())
    }

    pub fn remove_tool(&mut self, index: usize, tool_index: usize) -> Result<BuildActionTool, ServiceError> {
        let action = self.action_mut(index)?;
        if tool_index >= action.tools.len() {
            return Err(ServiceError::index("tool", tool_index));
        }
        Ok(action.tools.remove(tool_index))
    }

    pub fn add_attachment(&mut self, attachment: BuildAttachment) -> usize {
        self.attachments.push(attachment);
        self.attachments.len() - 1
    }

    pub fn remove_attachment(&mut self, attachment_index: usize) -> Result<BuildAttachment, ServiceError> {
        if attachment_index >= self.attachments.len() {
            return Err(ServiceError::index("attachment", attachment_index));
        }
        Ok(self.attachments.remove(attachment_index))
    }

    pub fn add_action_attachment(&mut self, index: usize, attachment: BuildAttachment) -> Result<usize, ServiceError> {
        let action = self.action_mut(index)?;
        action.attachments.push(attachment);
        Ok(action.attachments.len() - 1)
    }

    pub fn remove_action_attachment(&mut self, index: usize, attachment_index: usize) -> Result<BuildAttachment, ServiceError> {
        let action = self.action_mut(index)?;
        if attachment_index >= action.attachments.len() {
            return Err(ServiceError::index("attachment", attachment_index));
        }
        Ok(action.attachments.remove(attachment_index))
    }

    /// Drops the proto link but keeps the copied fields.
    pub fn unlink_proto(&mut self, index: usize) -> Result<(), ServiceError> {
        self.action_mut(index)?.proto_action_item_id = None;
        Ok(())
    }

    /// Checks performed before a draft becomes template rows.
    pub fn validate_for_submit(&self) -> Result<(), ServiceError> {
        if self.metadata.task_name.trim().is_empty() {
            return Err(ServiceError::Validation("task_name is required".into()));
        }
        for a in &self.actions {
            if a.action_name.trim().is_empty() {
                return Err(ServiceError::Validation(format!(
                    "action at sequence_order {} missing action_name",
                    a.sequence_order
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Lenient readers for patch values. `None` means "ignore this key".
mod coerce {
    use serde_json::Value;
    use uuid::Uuid;

    pub fn text(v: &Value) -> Option<Option<String>> {
        match v {
            Value::Null => Some(None),
            Value::String(s) if s.trim().is_empty() => Some(None),
            Value::String(s) => Some(Some(s.clone())),
            Value::Number(n) => Some(Some(n.to_string())),
            Value::Bool(b) => Some(Some(b.to_string())),
            _ => None,
        }
    }

    pub fn float(v: &Value) -> Option<Option<f64>> {
        match v {
            Value::Null => Some(None),
            Value::Number(n) => n.as_f64().map(Some),
            Value::String(s) if s.trim().is_empty() => Some(None),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(Some),
            _ => None,
        }
    }

    pub fn int(v: &Value) -> Option<Option<i32>> {
        match v {
            Value::Null => Some(None),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .and_then(|i| i32::try_from(i).ok())
                .map(Some),
            Value::String(s) if s.trim().is_empty() => Some(None),
            Value::String(s) => s.trim().parse::<i32>().ok().map(Some),
            _ => None,
        }
    }

    pub fn boolean(v: &Value) -> Option<bool> {
        match v {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|i| i != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn uuid(v: &Value) -> Option<Option<Uuid>> {
        match v {
            Value::Null => Some(None),
            Value::String(s) if s.trim().is_empty() => Some(None),
            Value::String(s) => Uuid::parse_str(s.trim()).ok().map(Some),
            _ => None,
        }
    }
}

macro_rules! patch_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Map<String, Value>);

        impl From<Map<String, Value>> for $name {
            fn from(m: Map<String, Value>) -> Self { Self(m) }
        }
    };
}

patch_type!(
    /// Partial update of a draft action keyed by field name.
    ActionPatch
);
patch_type!(PartDemandPatch);
patch_type!(ToolPatch);
patch_type!(MetadataPatch);

impl ActionPatch {
    /// Returns true when `sequence_order` was changed.
    pub fn apply(&self, a: &mut BuildAction) -> bool {
        let mut resequence = false;
        for (key, v) in &self.0 {
            match key.as_str() {
                "action_name" => {
                    if let Some(t) = coerce::text(v) {
                        a.action_name = t.unwrap_or_default();
                    }
                }
                "description" => {
                    if let Some(t) = coerce::text(v) {
                        a.description = t;
                    }
                }
                "safety_notes" => {
                    if let Some(t) = coerce::text(v) {
                        a.safety_notes = t;
                    }
                }
                "notes" => {
                    if let Some(t) = coerce::text(v) {
                        a.notes = t;
                    }
                }
                "instructions" => {
                    if let Some(t) = coerce::text(v) {
                        a.instructions = t;
                    }
                }
                "instructions_type" => {
                    if let Some(t) = coerce::text(v) {
                        a.instructions_type = t;
                    }
                }
                "required_skills" => {
                    if let Some(t) = coerce::text(v) {
                        a.required_skills = t;
                    }
                }
                "revision" => {
                    if let Some(t) = coerce::text(v) {
                        a.revision = t;
                    }
                }
                "estimated_duration" => {
                    if let Some(f) = coerce::float(v) {
                        a.estimated_duration = f;
                    }
                }
                "expected_billable_hours" => {
                    if let Some(f) = coerce::float(v) {
                        a.expected_billable_hours = f;
                    }
                }
                "is_required" => {
                    if let Some(b) = coerce::boolean(v) {
                        a.is_required = b;
                    }
                }
                "minimum_staff_count" => {
                    if let Some(Some(n)) = coerce::int(v) {
                        a.minimum_staff_count = n.max(1);
                    }
                }
                "sequence_order" => {
                    if let Some(Some(n)) = coerce::int(v) {
                        a.sequence_order = n;
                        resequence = true;
                    }
                }
                "proto_action_item_id" => {
                    if let Some(u) = coerce::uuid(v) {
                        a.proto_action_item_id = u;
                    }
                }
                "prior_revision_id" => {
                    if let Some(u) = coerce::uuid(v) {
                        a.prior_revision_id = u;
                    }
                }
                _ => {}
            }
        }
        resequence
    }
}

impl PartDemandPatch {
    pub fn apply(&self, p: &mut BuildPartDemand) {
        for (key, v) in &self.0 {
            match key.as_str() {
                "part_id" => {
                    if let Some(Some(u)) = coerce::uuid(v) {
                        p.part_id = u;
                    }
                }
                "quantity_required" => {
                    if let Some(Some(q)) = coerce::float(v) {
                        if q > 0.0 {
                            p.quantity_required = q;
                        }
                    }
                }
                "expected_cost" => {
                    if let Some(f) = coerce::float(v) {
                        p.expected_cost = f;
                    }
                }
                "notes" => {
                    if let Some(t) = coerce::text(v) {
                        p.notes = t;
                    }
                }
                "is_optional" => {
                    if let Some(b) = coerce::boolean(v) {
                        p.is_optional = b;
                    }
                }
                "sequence_order" => {
                    if let Some(Some(n)) = coerce::int(v) {
                        p.sequence_order = n;
                    }
                }
                _ => {}
            }
        }
    }
}

impl ToolPatch {
    pub fn apply(&self, t: &mut BuildActionTool) {
        for (key, v) in &self.0 {
            match key.as_str() {
                "tool_id" => {
                    if let Some(Some(u)) = coerce::uuid(v) {
                        t.tool_id = u;
                    }
                }
                "quantity_required" => {
                    if let Some(Some(q)) = coerce::int(v) {
                        if q > 0 {
                            t.quantity_required = q;
                        }
                    }
                }
                "notes" => {
                    if let Some(n) = coerce::text(v) {
                        t.notes = n;
                    }
                }
                "is_required" => {
                    if let Some(b) = coerce::boolean(v) {
                        t.is_required = b;
                    }
                }
                "sequence_order" => {
                    if let Some(Some(n)) = coerce::int(v) {
                        t.sequence_order = n;
                    }
                }
                _ => {}
            }
        }
    }
}

const METADATA_FIELDS: &[&str] = &[
    "task_name",
    "description",
    "revision",
    "estimated_duration",
    "parts_cost",
    "labor_hours",
    "staff_count",
    "safety_review_required",
    "is_active",
    "prior_revision_id",
    "asset_type_id",
    "make_model_id",
];

impl MetadataPatch {
    /// Rejects the whole patch when any key is not a metadata field.
    pub fn apply(&self, m: &mut BuildMetadata) -> Result<(), ServiceError> {
        if let Some(key) = self.0.keys().find(|k| !METADATA_FIELDS.contains(&k.as_str())) {
            return Err(ServiceError::Validation(format!("Invalid metadata field: {key}")));
        }
        for (key, v) in &self.0 {
            match key.as_str() {
                "task_name" => {
                    if let Some(t) = coerce::text(v) {
                        m.task_name = t.unwrap_or_default();
                    }
                }
                "description" => {
                    if let Some(t) = coerce::text(v) {
                        m.description = t;
                    }
                }
                "revision" => {
                    if let Some(t) = coerce::text(v) {
                        m.revision = t;
                    }
                }
                "estimated_duration" => {
                    if let Some(f) = coerce::float(v) {
                        m.estimated_duration = f;
                    }
                }
                "parts_cost" => {
                    if let Some(f) = coerce::float(v) {
                        m.parts_cost = f;
                    }
                }
                "labor_hours" => {
                    if let Some(f) = coerce::float(v) {
                        m.labor_hours = f;
                    }
                }
                "staff_count" => {
                    if let Some(n) = coerce::int(v) {
                        m.staff_count = n;
                    }
                }
                "safety_review_required" => {
                    if let Some(b) = coerce::boolean(v) {
                        m.safety_review_required = b;
                    }
                }
                "is_active" => {
                    if let Some(b) = coerce::boolean(v) {
                        m.is_active = b;
                    }
                }
                "prior_revision_id" => {
                    if let Some(u) = coerce::uuid(v) {
                        m.prior_revision_id = u;
                    }
                }
                "asset_type_id" => {
                    if let Some(u) = coerce::uuid(v) {
                        m.asset_type_id = u;
                    }
                }
                "make_model_id" => {
                    if let Some(u) = coerce::uuid(v) {
                        m.make_model_id = u;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
