// src/repository/pairing_repository.rs
use crate::domain::pairing_model::{self, ActiveModel as PairingActiveModel, Entity as PairingEntity};
use chrono::{DateTime, Utc};
use sea_orm::{entity::*, query::*, Condition, ConnectionTrait, DbConn, DbErr, Set};

pub struct PairingRepository {
    db: DbConn,
}

impl PairingRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_pair_id_on<C: ConnectionTrait>(
        conn: &C,
        pair_id: &str,
    ) -> Result<Option<pairing_model::Model>, DbErr> {
        PairingEntity::find()
            .filter(pairing_model::Column::PairId.eq(pair_id))
            .one(conn)
            .await
    }

    pub async fn create_on<C: ConnectionTrait>(
        conn: &C,
        mentor_id: i32,
        learner_id: i32,
        pair_id: String,
        ends_at: DateTime<Utc>,
    ) -> Result<pairing_model::Model, DbErr> {
        let active = PairingActiveModel {
            mentor_id: Set(mentor_id),
            learner_id: Set(learner_id),
            pair_id: Set(pair_id),
            ends_at: Set(ends_at),
            ..<PairingActiveModel as ActiveModelBehavior>::new()
        };
        active.insert(conn).await
    }

    pub async fn update_ends_at_on<C: ConnectionTrait>(
        conn: &C,
        pairing: pairing_model::Model,
        ends_at: DateTime<Utc>,
    ) -> Result<pairing_model::Model, DbErr> {
        let mut active: PairingActiveModel = pairing.into();
        active.ends_at = Set(ends_at);
        active.update(conn).await
    }

    /// 参加者が属する、now 時点で有効なペアリング
    pub async fn find_active_for_participant(
        &self,
        participant_id: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<pairing_model::Model>, DbErr> {
        PairingEntity::find()
            .filter(
                Condition::any()
                    .add(pairing_model::Column::MentorId.eq(participant_id))
                    .add(pairing_model::Column::LearnerId.eq(participant_id)),
            )
            .filter(pairing_model::Column::EndsAt.gt(now))
            .order_by_asc(pairing_model::Column::EndsAt)
            .all(&self.db)
            .await
    }
}
