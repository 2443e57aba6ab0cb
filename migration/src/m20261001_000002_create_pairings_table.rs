use sea_orm_migration::prelude::*;

use crate::m20261001_000001_create_participants_table::Participants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pairings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pairings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pairings::MentorId).integer().not_null())
                    .col(ColumnDef::new(Pairings::LearnerId).integer().not_null())
                    .col(
                        ColumnDef::new(Pairings::PairId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Pairings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Pairings::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // 参加者が削除されたらペアリングも削除
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pairings_mentor_id")
                            .from(Pairings::Table, Pairings::MentorId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pairings_learner_id")
                            .from(Pairings::Table, Pairings::LearnerId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // アクティブなペアリング検索用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Pairings::Table)
                    .name("idx_pairings_ends_at")
                    .col(Pairings::EndsAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Pairings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pairings {
    Table,
    Id,
    MentorId,
    LearnerId,
    PairId,
    CreatedAt,
    EndsAt,
}
