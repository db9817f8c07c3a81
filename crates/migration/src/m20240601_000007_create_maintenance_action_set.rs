use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenanceActionSet::Table)
                    .if_not_exists()
                    .col(uuid(MaintenanceActionSet::Id).primary_key())
                    .col(uuid(MaintenanceActionSet::AssetId))
                    .col(uuid_null(MaintenanceActionSet::TemplateActionSetId))
                    .col(uuid_null(MaintenanceActionSet::MaintenancePlanId))
                    .col(string_len(MaintenanceActionSet::TaskName, 255))
                    .col(text_null(MaintenanceActionSet::Description))
                    .col(double_null(MaintenanceActionSet::EstimatedDuration))
                    .col(boolean(MaintenanceActionSet::SafetyReviewRequired).default(false))
                    .col(integer_null(MaintenanceActionSet::StaffCount))
                    .col(double_null(MaintenanceActionSet::PartsCost))
                    .col(double_null(MaintenanceActionSet::LaborHours))
                    .col(timestamp_with_time_zone_null(MaintenanceActionSet::PlannedStartDatetime))
                    .col(string_len(MaintenanceActionSet::Status, 32).default("Planned"))
                    .col(string_len(MaintenanceActionSet::Priority, 16).default("Medium"))
                    .col(timestamp_with_time_zone_null(MaintenanceActionSet::StartDate))
                    .col(timestamp_with_time_zone_null(MaintenanceActionSet::EndDate))
                    .col(double_null(MaintenanceActionSet::ActualBillableHours))
                    .col(uuid_null(MaintenanceActionSet::AssignedUserId))
                    .col(uuid_null(MaintenanceActionSet::AssignedById))
                    .col(uuid_null(MaintenanceActionSet::CompletedById))
                    .col(text_null(MaintenanceActionSet::CompletionNotes))
                    .col(double_null(MaintenanceActionSet::Meter1))
                    .col(double_null(MaintenanceActionSet::Meter2))
                    .col(double_null(MaintenanceActionSet::Meter3))
                    .col(double_null(MaintenanceActionSet::Meter4))
                    .col(uuid_null(MaintenanceActionSet::CreatedById))
                    .col(uuid_null(MaintenanceActionSet::UpdatedById))
                    .col(timestamp_with_time_zone(MaintenanceActionSet::CreatedAt))
                    .col(timestamp_with_time_zone(MaintenanceActionSet::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_action_set_asset")
                            .from(MaintenanceActionSet::Table, MaintenanceActionSet::AssetId)
                            .to(Asset::Table, Asset::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_action_set_template")
                            .from(MaintenanceActionSet::Table, MaintenanceActionSet::TemplateActionSetId)
                            .to(TemplateActionSet::Table, TemplateActionSet::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_action_set_plan")
                            .from(MaintenanceActionSet::Table, MaintenanceActionSet::MaintenancePlanId)
                            .to(MaintenancePlan::Table, MaintenancePlan::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Action::Table)
                    .if_not_exists()
                    .col(uuid(Action::Id).primary_key())
                    .col(uuid(Action::MaintenanceActionSetId))
                    .col(uuid_null(Action::TemplateActionItemId))
                    .col(string_len(Action::ActionName, 255))
                    .col(text_null(Action::Description))
                    .col(double_null(Action::EstimatedDuration))
                    .col(double_null(Action::ExpectedBillableHours))
                    .col(text_null(Action::SafetyNotes))
                    .col(text_null(Action::Notes))
                    .col(integer(Action::SequenceOrder).default(1))
                    .col(string_len(Action::Status, 32).default("Not Started"))
                    .col(timestamp_with_time_zone_null(Action::ScheduledStartTime))
                    .col(timestamp_with_time_zone_null(Action::StartTime))
                    .col(timestamp_with_time_zone_null(Action::EndTime))
                    .col(double_null(Action::BillableHours))
                    .col(text_null(Action::CompletionNotes))
                    .col(uuid_null(Action::AssignedUserId))
                    .col(uuid_null(Action::CompletedById))
                    .col(timestamp_with_time_zone(Action::CreatedAt))
                    .col(timestamp_with_time_zone(Action::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_action_event")
                            .from(Action::Table, Action::MaintenanceActionSetId)
                            .to(MaintenanceActionSet::Table, MaintenanceActionSet::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PartDemand::Table)
                    .if_not_exists()
                    .col(uuid(PartDemand::Id).primary_key())
                    .col(uuid(PartDemand::ActionId))
                    .col(uuid(PartDemand::PartId))
                    .col(double(PartDemand::QuantityRequired).default(1.0))
                    .col(double_null(PartDemand::ExpectedCost))
                    .col(text_null(PartDemand::Notes))
                    .col(string_len(PartDemand::Status, 32).default("Planned"))
                    .col(string_len(PartDemand::Priority, 16).default("Medium"))
                    .col(integer(PartDemand::SequenceOrder).default(1))
                    .col(uuid_null(PartDemand::RequestedById))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_part_demand_action")
                            .from(PartDemand::Table, PartDemand::ActionId)
                            .to(Action::Table, Action::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ActionTool::Table)
                    .if_not_exists()
                    .col(uuid(ActionTool::Id).primary_key())
                    .col(uuid(ActionTool::ActionId))
                    .col(uuid(ActionTool::ToolId))
                    .col(integer(ActionTool::QuantityRequired).default(1))
                    .col(text_null(ActionTool::Notes))
                    .col(string_len(ActionTool::Status, 32).default("Planned"))
                    .col(string_len(ActionTool::Priority, 16).default("Medium"))
                    .col(integer(ActionTool::SequenceOrder).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_action_tool_action")
                            .from(ActionTool::Table, ActionTool::ActionId)
                            .to(Action::Table, Action::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ActionTool::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(PartDemand::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Action::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MaintenanceActionSet::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MaintenanceActionSet {
    Table,
    Id,
    AssetId,
    TemplateActionSetId,
    MaintenancePlanId,
    TaskName,
    Description,
    EstimatedDuration,
    SafetyReviewRequired,
    StaffCount,
    PartsCost,
    LaborHours,
    PlannedStartDatetime,
    Status,
    Priority,
    StartDate,
    EndDate,
    ActualBillableHours,
    AssignedUserId,
    AssignedById,
    CompletedById,
    CompletionNotes,
    Meter1,
    Meter2,
    Meter3,
    Meter4,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Action {
    Table,
    Id,
    MaintenanceActionSetId,
    TemplateActionItemId,
    ActionName,
    Description,
    EstimatedDuration,
    ExpectedBillableHours,
    SafetyNotes,
    Notes,
    SequenceOrder,
    Status,
    ScheduledStartTime,
    StartTime,
    EndTime,
    BillableHours,
    CompletionNotes,
    AssignedUserId,
    CompletedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PartDemand {
    Table,
    Id,
    ActionId,
    PartId,
    QuantityRequired,
    ExpectedCost,
    Notes,
    Status,
    Priority,
    SequenceOrder,
    RequestedById,
}

#[derive(DeriveIden)]
enum ActionTool {
    Table,
    Id,
    ActionId,
    ToolId,
    QuantityRequired,
    Notes,
    Status,
    Priority,
    SequenceOrder,
}

#[derive(DeriveIden)]
enum Asset { Table, Id }

#[derive(DeriveIden)]
enum TemplateActionSet { Table, Id }

#[derive(DeriveIden)]
enum MaintenancePlan { Table, Id }
