//! Business operations over the maintenance schema.
//! - Prototype actions, templates and the draft builder that publishes them.
//! - Maintenance events created from templates and plans.
//! - The planner deciding which assets are due.

pub mod errors;
pub mod assets;
pub mod proto;
pub mod templates;
pub mod builder;
pub mod maintenance;
pub mod planning;
#[cfg(test)]
pub mod test_support;
