// src/repository/participant_repository.rs
use crate::domain::expiration::ExpirationPolicy;
use crate::domain::pairing_model::{self, Entity as PairingEntity};
use crate::domain::participant_model::{
    self, ActiveModel as ParticipantActiveModel, Entity as ParticipantEntity, NewParticipant,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Query;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbConn, DbErr, PaginatorTrait, Set};

pub struct ParticipantRepository {
    db: DbConn,
    policy: ExpirationPolicy,
}

impl ParticipantRepository {
    pub fn new(db: DbConn, policy: ExpirationPolicy) -> Self {
        Self { db, policy }
    }

    pub async fn find_all(&self) -> Result<Vec<participant_model::Model>, DbErr> {
        ParticipantEntity::find()
            .order_by_asc(participant_model::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<participant_model::Model>, DbErr> {
        Self::find_by_id_on(&self.db, id).await
    }

    pub async fn find_by_id_on<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> Result<Option<participant_model::Model>, DbErr> {
        ParticipantEntity::find_by_id(id).one(conn).await
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<participant_model::Model>, DbErr> {
        ParticipantEntity::find()
            .filter(participant_model::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// 参加者を作成する（有効期限は保持ポリシーから算出）
    pub async fn create(&self, new: NewParticipant) -> Result<participant_model::Model, DbErr> {
        self.create_at(new, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        new: NewParticipant,
        now: DateTime<Utc>,
    ) -> Result<participant_model::Model, DbErr> {
        let mut active = new.into_active_model(self.policy.default_expiration_at(now));
        active.created_at = Set(now);
        active.insert(&self.db).await
    }

    pub async fn update_expires_on<C: ConnectionTrait>(
        conn: &C,
        participant: participant_model::Model,
        expires: DateTime<Utc>,
    ) -> Result<participant_model::Model, DbErr> {
        let mut active: ParticipantActiveModel = participant.into();
        active.expires = Set(expires);
        active.update(conn).await
    }

    /// 期限切れかつアクティブなペアリングに属さない参加者を削除
    pub async fn delete_lapsed(&self, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let active_mentors = Query::select()
            .column(pairing_model::Column::MentorId)
            .from(PairingEntity)
            .and_where(pairing_model::Column::EndsAt.gt(now))
            .to_owned();
        let active_learners = Query::select()
            .column(pairing_model::Column::LearnerId)
            .from(PairingEntity)
            .and_where(pairing_model::Column::EndsAt.gt(now))
            .to_owned();

        let result = ParticipantEntity::delete_many()
            .filter(participant_model::Column::Expires.lte(now))
            .filter(participant_model::Column::Id.not_in_subquery(active_mentors))
            .filter(participant_model::Column::Id.not_in_subquery(active_learners))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn count(&self) -> Result<u64, DbErr> {
        ParticipantEntity::find().count(&self.db).await
    }
}
