use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Participants::FullName).string().not_null())
                    .col(ColumnDef::new(Participants::Role).string().not_null())
                    .col(
                        ColumnDef::new(Participants::Manager)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Participants::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participants::TimeAvailability)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Participants::Interests).json().not_null())
                    .col(
                        ColumnDef::new(Participants::Org)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Participants::OrgChartDistance)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Participants::OrgLevel)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Participants::TimeAtOrgLevel)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Participants::TrackChange)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Participants::Comments)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    // expires にはDBデフォルトを持たせない（アプリ側の保持ポリシーで算出）
                    .col(
                        ColumnDef::new(Participants::Expires)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 保持期間スイープ用インデックス
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Participants::Table)
                    .name("idx_participants_expires")
                    .col(Participants::Expires)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Participants {
    Table,
    Id,
    Email,
    FullName,
    Role,
    Manager,
    Approved,
    TimeAvailability,
    Interests,
    Org,
    OrgChartDistance,
    OrgLevel,
    TimeAtOrgLevel,
    TrackChange,
    Comments,
    Expires,
    CreatedAt,
}
