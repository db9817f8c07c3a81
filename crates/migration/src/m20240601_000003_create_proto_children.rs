use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProtoPartDemand::Table)
                    .if_not_exists()
                    .col(uuid(ProtoPartDemand::Id).primary_key())
                    .col(uuid(ProtoPartDemand::ProtoActionItemId))
                    .col(uuid(ProtoPartDemand::PartId))
                    .col(double(ProtoPartDemand::QuantityRequired).default(1.0))
                    .col(double_null(ProtoPartDemand::ExpectedCost))
                    .col(text_null(ProtoPartDemand::Notes))
                    .col(boolean(ProtoPartDemand::IsOptional).default(false))
                    .col(integer(ProtoPartDemand::SequenceOrder).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proto_part_demand_item")
                            .from(ProtoPartDemand::Table, ProtoPartDemand::ProtoActionItemId)
                            .to(ProtoActionItem::Table, ProtoActionItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProtoActionTool::Table)
                    .if_not_exists()
                    .col(uuid(ProtoActionTool::Id).primary_key())
                    .col(uuid(ProtoActionTool::ProtoActionItemId))
                    .col(uuid(ProtoActionTool::ToolId))
                    .col(integer(ProtoActionTool::QuantityRequired).default(1))
                    .col(text_null(ProtoActionTool::Notes))
                    .col(boolean(ProtoActionTool::IsRequired).default(true))
                    .col(integer(ProtoActionTool::SequenceOrder).default(1))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proto_action_tool_item")
                            .from(ProtoActionTool::Table, ProtoActionTool::ProtoActionItemId)
                            .to(ProtoActionItem::Table, ProtoActionItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProtoActionAttachment::Table)
                    .if_not_exists()
                    .col(uuid(ProtoActionAttachment::Id).primary_key())
                    .col(uuid(ProtoActionAttachment::ProtoActionItemId))
                    .col(uuid(ProtoActionAttachment::AttachmentId))
                    .col(string_len(ProtoActionAttachment::AttachmentType, 32).default("Document"))
                    .col(string_len_null(ProtoActionAttachment::Caption, 255))
                    .col(text_null(ProtoActionAttachment::Description))
                    .col(integer(ProtoActionAttachment::DisplayOrder).default(1))
                    .col(integer(ProtoActionAttachment::SequenceOrder).default(1))
                    .col(boolean(ProtoActionAttachment::IsRequired).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proto_action_attachment_item")
                            .from(ProtoActionAttachment::Table, ProtoActionAttachment::ProtoActionItemId)
                            .to(ProtoActionItem::Table, ProtoActionItem::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProtoActionAttachment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ProtoActionTool::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ProtoPartDemand::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProtoPartDemand {
    Table,
    Id,
    ProtoActionItemId,
    PartId,
    QuantityRequired,
    ExpectedCost,
    Notes,
    IsOptional,
    SequenceOrder,
}

#[derive(DeriveIden)]
enum ProtoActionTool {
    Table,
    Id,
    ProtoActionItemId,
    ToolId,
    QuantityRequired,
    Notes,
    IsRequired,
    SequenceOrder,
}

#[derive(DeriveIden)]
enum ProtoActionAttachment {
    Table,
    Id,
    ProtoActionItemId,
    AttachmentId,
    AttachmentType,
    Caption,
    Description,
    DisplayOrder,
    SequenceOrder,
    IsRequired,
}

#[derive(DeriveIden)]
enum ProtoActionItem { Table, Id }
