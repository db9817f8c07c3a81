use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TemplateBuilderMemory::Table)
                    .if_not_exists()
                    .col(uuid(TemplateBuilderMemory::Id).primary_key())
                    .col(string_len(TemplateBuilderMemory::Name, 255))
                    .col(string_len_null(TemplateBuilderMemory::BuildType, 64))
                    .col(string_len(TemplateBuilderMemory::BuildStatus, 32).default("Initialized"))
                    .col(boolean(TemplateBuilderMemory::IsRevision).default(false))
                    .col(uuid_null(TemplateBuilderMemory::SrcRevisionId))
                    .col(integer_null(TemplateBuilderMemory::SrcRevisionNumber))
                    .col(uuid_null(TemplateBuilderMemory::TemplateActionSetId))
                    .col(text(TemplateBuilderMemory::BuildState))
                    .col(uuid_null(TemplateBuilderMemory::CreatedById))
                    .col(uuid_null(TemplateBuilderMemory::UpdatedById))
                    .col(timestamp_with_time_zone(TemplateBuilderMemory::CreatedAt))
                    .col(timestamp_with_time_zone(TemplateBuilderMemory::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_builder_memory_template")
                            .from(TemplateBuilderMemory::Table, TemplateBuilderMemory::TemplateActionSetId)
                            .to(TemplateActionSet::Table, TemplateActionSet::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateBuilderAttachmentReference::Table)
                    .if_not_exists()
                    .col(uuid(TemplateBuilderAttachmentReference::Id).primary_key())
                    .col(uuid(TemplateBuilderAttachmentReference::TemplateBuilderMemoryId))
                    .col(uuid(TemplateBuilderAttachmentReference::AttachmentId))
                    .col(string_len(TemplateBuilderAttachmentReference::AttachmentLevel, 16))
                    .col(integer_null(TemplateBuilderAttachmentReference::ActionIndex))
                    .col(text_null(TemplateBuilderAttachmentReference::Description))
                    .col(integer(TemplateBuilderAttachmentReference::SequenceOrder).default(1))
                    .col(boolean(TemplateBuilderAttachmentReference::IsRequired).default(false))
                    .col(boolean(TemplateBuilderAttachmentReference::IsFinalized).default(false))
                    .col(uuid_null(TemplateBuilderAttachmentReference::CreatedById))
                    .col(timestamp_with_time_zone(TemplateBuilderAttachmentReference::CreatedAt))
                    .col(timestamp_with_time_zone(TemplateBuilderAttachmentReference::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_builder_attachment_reference_memory")
                            .from(
                                TemplateBuilderAttachmentReference::Table,
                                TemplateBuilderAttachmentReference::TemplateBuilderMemoryId,
                            )
                            .to(TemplateBuilderMemory::Table, TemplateBuilderMemory::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateBuilderAttachmentReference::Table).to_owned())
            .await?;
        manager.drop_table(Table::drop().table(TemplateBuilderMemory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TemplateBuilderMemory {
    Table,
    Id,
    Name,
    BuildType,
    BuildStatus,
    IsRevision,
    SrcRevisionId,
    SrcRevisionNumber,
    TemplateActionSetId,
    BuildState,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TemplateBuilderAttachmentReference {
    Table,
    Id,
    TemplateBuilderMemoryId,
    AttachmentId,
    AttachmentLevel,
    ActionIndex,
    Description,
    SequenceOrder,
    IsRequired,
    IsFinalized,
    CreatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TemplateActionSet { Table, Id }
