use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProtoActionItem::Table)
                    .if_not_exists()
                    .col(uuid(ProtoActionItem::Id).primary_key())
                    .col(string_len(ProtoActionItem::ActionName, 255))
                    .col(text_null(ProtoActionItem::Description))
                    .col(double_null(ProtoActionItem::EstimatedDuration))
                    .col(double_null(ProtoActionItem::ExpectedBillableHours))
                    .col(text_null(ProtoActionItem::SafetyNotes))
                    .col(text_null(ProtoActionItem::Notes))
                    .col(boolean(ProtoActionItem::IsRequired).default(true))
                    .col(text_null(ProtoActionItem::Instructions))
                    .col(string_len_null(ProtoActionItem::InstructionsType, 32))
                    .col(integer(ProtoActionItem::MinimumStaffCount).default(1))
                    .col(text_null(ProtoActionItem::RequiredSkills))
                    .col(string_len_null(ProtoActionItem::Revision, 32))
                    .col(uuid_null(ProtoActionItem::PriorRevisionId))
                    .col(uuid_null(ProtoActionItem::CreatedById))
                    .col(uuid_null(ProtoActionItem::UpdatedById))
                    .col(timestamp_with_time_zone(ProtoActionItem::CreatedAt))
                    .col(timestamp_with_time_zone(ProtoActionItem::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proto_action_item_prior_revision")
                            .from(ProtoActionItem::Table, ProtoActionItem::PriorRevisionId)
                            .to(ProtoActionItem::Table, ProtoActionItem::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProtoActionItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProtoActionItem {
    Table,
    Id,
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
    Revision,
    PriorRevisionId,
    CreatedById,
    UpdatedById,
    CreatedAt,
    UpdatedAt,
}
