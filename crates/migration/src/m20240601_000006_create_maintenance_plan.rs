use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MaintenancePlan::Table)
                    .if_not_exists()
                    .col(uuid(MaintenancePlan::Id).primary_key())
                    .col(string_len(MaintenancePlan::Name, 255))
                    .col(text_null(MaintenancePlan::Description))
                    .col(uuid_null(MaintenancePlan::AssetTypeId))
                    .col(uuid_null(MaintenancePlan::ModelId))
                    .col(string_len(MaintenancePlan::Status, 16).default("Active"))
                    .col(uuid(MaintenancePlan::TemplateActionSetId))
                    .col(string_len(MaintenancePlan::FrequencyType, 16))
                    .col(double_null(MaintenancePlan::DeltaHours))
                    .col(double_null(MaintenancePlan::DeltaM1))
                    .col(double_null(MaintenancePlan::DeltaM2))
                    .col(double_null(MaintenancePlan::DeltaM3))
                    .col(double_null(MaintenancePlan::DeltaM4))
                    .col(uuid_null(MaintenancePlan::CreatedById))
                    .col(uuid_null(MaintenancePlan::UpdatedById))
                    .col(timestamp_with_time_zone(MaintenancePlan::CreatedAt))
                    .col(timestamp_with_time_zone(MaintenancePlan::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_maintenance_plan_template")
                            .from(MaintenancePlan::Table, MaintenancePlan::TemplateActionSetId)
                            .to(TemplateActionSet::Table, TemplateActionSet::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MaintenancePlan::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MaintenancePlan {
    Table,
    Id,
    Name,
    Description,
    AssetTypeId,
    ModelId,
    Status,
    TemplateActionSetId,
    FrequencyType,
    DeltaHours,
    DeltaM1,
    DeltaM2,
    DeltaM3,
    DeltaM4,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TemplateActionSet { Table, Id }
