//! sea-orm entities for the maintenance schema plus row-level validation helpers.

pub mod errors;
pub mod enums;
pub mod validation;
pub mod db;

pub mod asset;

pub mod proto_action_item;
pub mod proto_part_demand;
pub mod proto_action_tool;
pub mod proto_action_attachment;

pub mod template_action_set;
pub mod template_action_item;
pub mod template_part_demand;
pub mod template_action_tool;
pub mod template_action_set_attachment;
pub mod template_action_attachment;

pub mod maintenance_plan;
pub mod maintenance_action_set;
pub mod action;
pub mod part_demand;
pub mod action_tool;

pub mod template_builder_memory;
pub mod template_builder_attachment_reference;

#[cfg(test)]
mod tests;
