//! Maintenance planning: decides per asset whether a plan's maintenance is due.

pub mod behavior;
pub mod meter_based;
pub mod planner;
pub mod plans;
pub mod repository;
pub mod result;
pub mod time_based;

pub use behavior::{behavior_for, PlannerBehavior};
pub use meter_based::MeterBasedPlanner;
pub use planner::{MaintenancePlanner, PlanContext};
pub use repository::{PlanningRepository, SeaOrmPlanningRepository};
pub use result::PlanningResult;
pub use time_based::TimeBasedPlanner;
