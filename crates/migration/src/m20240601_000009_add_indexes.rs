use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Template items by set
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_template_item_set")
                    .table(TemplateActionItem::Table)
                    .col(TemplateActionItem::TemplateActionSetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_template_part_demand_item")
                    .table(TemplatePartDemand::Table)
                    .col(TemplatePartDemand::TemplateActionItemId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_template_tool_item")
                    .table(TemplateActionTool::Table)
                    .col(TemplateActionTool::TemplateActionItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_action_event")
                    .table(Action::Table)
                    .col(Action::MaintenanceActionSetId)
                    .to_owned(),
            )
            .await?;

        // Duplicate-event lookups filter on (asset, plan, status)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_event_asset_plan_status")
                    .table(MaintenanceActionSet::Table)
                    .col(MaintenanceActionSet::AssetId)
                    .col(MaintenanceActionSet::MaintenancePlanId)
                    .col(MaintenanceActionSet::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_plan_status")
                    .table(MaintenancePlan::Table)
                    .col(MaintenancePlan::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_template_item_set").table(TemplateActionItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_template_part_demand_item").table(TemplatePartDemand::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_template_tool_item").table(TemplateActionTool::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_action_event").table(Action::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_event_asset_plan_status").table(MaintenanceActionSet::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_plan_status").table(MaintenancePlan::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TemplateActionItem { Table, TemplateActionSetId }

#[derive(DeriveIden)]
enum TemplatePartDemand { Table, TemplateActionItemId }

#[derive(DeriveIden)]
enum TemplateActionTool { Table, TemplateActionItemId }

#[derive(DeriveIden)]
enum Action { Table, MaintenanceActionSetId }

#[derive(DeriveIden)]
enum MaintenanceActionSet { Table, AssetId, MaintenancePlanId, Status }

#[derive(DeriveIden)]
enum MaintenancePlan { Table, Status }
