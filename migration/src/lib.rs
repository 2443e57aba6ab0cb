// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// 参加者・ペアリング関連マイグレーション
mod m20261001_000001_create_participants_table;
mod m20261001_000002_create_pairings_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_participants_table::Migration),
            // participants への外部キーを持つため後に実行
            Box::new(m20261001_000002_create_pairings_table::Migration),
        ]
    }
}
