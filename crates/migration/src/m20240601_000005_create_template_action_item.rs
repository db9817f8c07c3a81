use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TemplateActionItem::Table)
                    .if_not_exists()
                    .col(uuid(TemplateActionItem::Id).primary_key())
                    .col(uuid(TemplateActionItem::TemplateActionSetId))
                    .col(uuid_null(TemplateActionItem::ProtoActionItemId))
                    .col(string_len(TemplateActionItem::ActionName, 255))
                    .col(text_null(TemplateActionItem::Description))
                    .col(double_null(TemplateActionItem::EstimatedDuration))
                    .col(double_null(TemplateActionItem::ExpectedBillableHours))
                    .col(text_null(TemplateActionItem::SafetyNotes))
                    .col(text_null(TemplateActionItem::Notes))
                    .col(boolean(TemplateActionItem::IsRequired).default(true))
                    .col(text_null(TemplateActionItem::Instructions))
                    .col(string_len_null(TemplateActionItem::InstructionsType, 32))
                    .col(integer(TemplateActionItem::MinimumStaffCount).default(1))
                    .col(text_null(TemplateActionItem::RequiredSkills))
                    .col(integer(TemplateActionItem::SequenceOrder).default(1))
                    .col(string_len_null(TemplateActionItem::Revision, 32))
                    .col(uuid_null(TemplateActionItem::PriorRevisionId))
                    .col(uuid_null(TemplateActionItem::CreatedById))
                    .col(uuid_null(TemplateActionItem::UpdatedById))
                    .col(timestamp_with_time_zone(TemplateActionItem::CreatedAt))
                    .col(timestamp_with_time_zone(TemplateActionItem::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_action_item_set")
                            .from(TemplateActionItem::Table, TemplateActionItem::TemplateActionSetId)
                            .to(TemplateActionSet::Table, TemplateActionSet::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_action_item_proto")
                            .from(TemplateActionItem::Table, TemplateActionItem::ProtoActionItemId)
                            .to(ProtoActionItem::Table, ProtoActionItem::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplatePartDemand::Table)
                    .if_not_exists()
                    .col(uuid(TemplatePartDemand::Id).primary_key())
                    .col(uuid(TemplatePartDemand::TemplateActionItemId))
                    .col(uuid(TemplatePartDemand::PartId))
                    .col(double(TemplatePartDemand::QuantityRequired).default(1.0))
                    .col(double_null(TemplatePartDemand::ExpectedCost))
                    .col(text_null(TemplatePartDemand::Notes))
                    .col(boolean(TemplatePartDemand::IsOptional).default(false))
                    .col(integer(TemplatePartDemand::SequenceOrder).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_part_demand_item")
                            .from(TemplatePartDemand::Table, TemplatePartDemand::TemplateActionItemId)
                            .to(TemplateActionItem::Table, TemplateActionItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateActionTool::Table)
                    .if_not_exists()
                    .col(uuid(TemplateActionTool::Id).primary_key())
                    .col(uuid(TemplateActionTool::TemplateActionItemId))
                    .col(uuid(TemplateActionTool::ToolId))
                    .col(integer(TemplateActionTool::QuantityRequired).default(1))
                    .col(text_null(TemplateActionTool::Notes))
                    .col(boolean(TemplateActionTool::IsRequired).default(true))
                    .col(integer(TemplateActionTool::SequenceOrder).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_action_tool_item")
                            .from(TemplateActionTool::Table, TemplateActionTool::TemplateActionItemId)
                            .to(TemplateActionItem::Table, TemplateActionItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TemplateActionAttachment::Table)
                    .if_not_exists()
                    .col(uuid(TemplateActionAttachment::Id).primary_key())
                    .col(uuid(TemplateActionAttachment::TemplateActionItemId))
                    .col(uuid(TemplateActionAttachment::AttachmentId))
                    .col(string_len(TemplateActionAttachment::AttachmentType, 32).default("Document"))
                    .col(string_len_null(TemplateActionAttachment::Caption, 255))
                    .col(text_null(TemplateActionAttachment::Description))
                    .col(integer(TemplateActionAttachment::DisplayOrder).default(1))
                    .col(integer(TemplateActionAttachment::SequenceOrder).default(1))
                    .col(boolean(TemplateActionAttachment::IsRequired).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_template_action_attachment_item")
                            .from(TemplateActionAttachment::Table, TemplateActionAttachment::TemplateActionItemId)
                            .to(TemplateActionItem::Table, TemplateActionItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TemplateActionAttachment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TemplateActionTool::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TemplatePartDemand::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TemplateActionItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TemplateActionItem {
    Table,
    Id,
    TemplateActionSetId,
    ProtoActionItemId,
    ActionName,
    Description,
    EstimatedDuration,
    ExpectedBillableHours,
    SafetyNotes,
    Notes,
    IsRequired,
    Instructions,
    InstructionsType,
    MinimumStaffCount,
    RequiredSkills,
    SequenceOrder,
    Revision,
    PriorRevisionId,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TemplatePartDemand {
    Table,
    Id,
    TemplateActionItemId,
    PartId,
    QuantityRequired,
    ExpectedCost,
    Notes,
    IsOptional,
    SequenceOrder,
}

#[derive(DeriveIden)]
enum TemplateActionTool {
    Table,
    Id,
    TemplateActionItemId,
    ToolId,
    QuantityRequired,
    Notes,
    IsRequired,
    SequenceOrder,
}

#[derive(DeriveIden)]
enum TemplateActionAttachment {
    Table,
    Id,
    TemplateActionItemId,
    AttachmentId,
    AttachmentType,
    Caption,
    Description,
    DisplayOrder,
    SequenceOrder,
    IsRequired,
}

#[derive(DeriveIden)]
enum TemplateActionSet { Table, Id }

#[derive(DeriveIden)]
enum ProtoActionItem { Table, Id }
