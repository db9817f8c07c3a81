//! Migrator registering the maintenance schema in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_asset;
mod m20240601_000002_create_proto_action_item;
mod m20240601_000003_create_proto_children;
mod m20240601_000004_create_template_action_set;
mod m20240601_000005_create_template_action_item;
mod m20240601_000006_create_maintenance_plan;
mod m20240601_000007_create_maintenance_action_set;
mod m20240601_000008_create_template_builder;
mod m20240601_000009_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_asset::Migration),
            Box::new(m20240601_000002_create_proto_action_item::Migration),
            Box::new(m20240601_000003_create_proto_children::Migration),
            Box::new(m20240601_000004_create_template_action_set::Migration),
            Box::new(m20240601_000005_create_template_action_item::Migration),
            Box::new(m20240601_000006_create_maintenance_plan::Migration),
            Box::new(m20240601_000007_create_maintenance_action_set::Migration),
            Box::new(m20240601_000008_create_template_builder::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000009_add_indexes::Migration),
        ]
    }
}
