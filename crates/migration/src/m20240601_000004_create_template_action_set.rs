use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TemplateActionSet::Table)
                    .if_not_exists()
                    .col(uuid(TemplateActionSet::Id).primary_key())
                    .col(string_len(TemplateActionSet::TaskName, 255))
                    .col(text_null(TemplateActionSet::Description))
                    .col(double_null(TemplateActionSet::EstimatedDuration))
                    .col(boolean(TemplateActionSet::SafetyReviewRequired).default(false))
                    .col(integer_null(TemplateActionSet::StaffCount))
                    .col(double_null(TemplateActionSet::PartsCost))
                    .col(double_null(TemplateActionSet::LaborHours))
                    .col(string_len_null(TemplateActionSet::Revision, 32))
                    .col(uuid_null(TemplateActionSet::PriorRevisionId))
                    .col(boolean(TemplateActionSet::IsActive).default(true))
                    // plain column: plans reference templates, not the other way round
                    .col(uuid_null(TemplateActionSet::MaintenancePlanId))
                    .col(uuid_null(TemplateActionSet::AssetTypeId))
                    .col(uuid_null(TemplateActionSet::MakeModelId))
                    .col(uuid_null(TemplateActionSet::CreatedById))
                    .col(uuid_null(TemplateActionSet::UpdatedById))
                    .col(timestamp_with_time_zone(TemplateActionSet::CreatedAt))
                    .col(timestamp_with_time_zone(TemplateActionSet::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_action_set_prior_revision")
                            .from(TemplateActionSet::Table, TemplateActionSet::PriorRevisionId)
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
                    .table(TemplateActionSetAttachment::Table)
                    .if_not_exists()
                    .col(uuid(TemplateActionSetAttachment::Id).primary_key())
                    .col(uuid(TemplateActionSetAttachment::TemplateActionSetId))
                    .col(uuid(TemplateActionSetAttachment::AttachmentId))
                    .col(string_len(TemplateActionSetAttachment::AttachmentType, 32).default("Document"))
                    .col(string_len_null(TemplateActionSetAttachment::Caption, 255))
                    .col(text_null(TemplateActionSetAttachment::Description))
                    .col(integer(TemplateActionSetAttachment::DisplayOrder).default(1))
                    .col(integer(TemplateActionSetAttachment::SequenceOrder).default(1))
                    .col(boolean(TemplateActionSetAttachment::IsRequired).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_action_set_attachment_set")
                            .from(TemplateActionSetAttachment::Table, TemplateActionSetAttachment::TemplateActionSetId)
                            .to(TemplateActionSet::Table, TemplateActionSet::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TemplateActionSetAttachment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TemplateActionSet::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TemplateActionSet {
    Table,
    Id,
    TaskName,
    Description,
    EstimatedDuration,
    SafetyReviewRequired,
    StaffCount,
    PartsCost,
    LaborHours,
    Revision,
    PriorRevisionId,
    IsActive,
    MaintenancePlanId,
    AssetTypeId,
    MakeModelId,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TemplateActionSetAttachment {
    Table,
    Id,
    TemplateActionSetId,
    AttachmentId,
    AttachmentType,
    Caption,
    Description,
    DisplayOrder,
    SequenceOrder,
    IsRequired,
}
