// src/domain/pairing_model.rs
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// メンターと学習者のペアリング
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pairings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub mentor_id: i32,
    pub learner_id: i32,
    /// PAIR_ID_HASH_SECRET で鍵付けしたペア識別子
    #[sea_orm(unique)]
    pub pair_id: String,
    pub created_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participant_model::Entity",
        from = "Column::MentorId",
        to = "super::participant_model::Column::Id",
        on_delete = "Cascade"
    )]
    Mentor,
    #[sea_orm(
        belongs_to = "super::participant_model::Entity",
        from = "Column::LearnerId",
        to = "super::participant_model::Column::Id",
        on_delete = "Cascade"
    )]
    Learner,
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    /// now 時点で有効なペアリングか
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.ends_at > now
    }

    pub fn involves(&self, participant_id: i32) -> bool {
        self.mentor_id == participant_id || self.learner_id == participant_id
    }
}
