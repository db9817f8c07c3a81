use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Asset::Table)
                    .if_not_exists()
                    .col(uuid(Asset::Id).primary_key())
                    .col(string_len(Asset::Name, 255))
                    .col(string_len(Asset::SerialNumber, 128).unique_key())
                    .col(uuid_null(Asset::AssetTypeId))
                    .col(uuid_null(Asset::MakeModelId))
                    .col(double_null(Asset::Meter1))
                    .col(double_null(Asset::Meter2))
                    .col(double_null(Asset::Meter3))
                    .col(double_null(Asset::Meter4))
                    .col(boolean(Asset::IsActive).default(true))
                    .col(uuid_null(Asset::CreatedById))
                    .col(uuid_null(Asset::UpdatedById))
                    .col(timestamp_with_time_zone(Asset::CreatedAt))
                    .col(timestamp_with_time_zone(Asset::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Asset::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Asset {
    Table,
    Id,
    Name,
    SerialNumber,
    AssetTypeId,
    MakeModelId,
    Meter1,
    Meter2,
    Meter3,
    Meter4,
    IsActive,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}
