// src/service/pairing_service.rs

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::domain::expiration::ExpirationPolicy;
use crate::domain::{pairing_model, participant_model};
use crate::error::{AppError, AppResult};
use crate::repository::pairing_repository::PairingRepository;
use crate::repository::participant_repository::ParticipantRepository;
use crate::utils::pair_id::PairIdHasher;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, TransactionTrait};
use tracing::info;

/// ペアリング記録の結果
#[derive(Debug, Clone)]
pub struct PairingOutcome {
    pub pairing: pairing_model::Model,
    pub mentor: participant_model::Model,
    pub learner: participant_model::Model,
    /// 既存ペアリングの更新だったか
    pub renewed: bool,
}

pub struct PairingService {
    db: DbPool,
    policy: ExpirationPolicy,
    hasher: PairIdHasher,
}

impl PairingService {
    pub fn new(db: DbPool, policy: ExpirationPolicy, hasher: PairIdHasher) -> Self {
        Self { db, policy, hasher }
    }

    pub fn from_app_config(db: DbPool, app_config: &AppConfig) -> AppResult<Self> {
        let hasher = PairIdHasher::new(&app_config.pair_id_hash_secret)
            .map_err(|e| AppError::InternalServerError(format!("Invalid pair id secret: {}", e)))?;
        Ok(Self::new(db, app_config.expiration_policy(), hasher))
    }

    pub fn pair_id(&self, mentor_id: i32, learner_id: i32) -> String {
        self.hasher.pair_id(mentor_id, learner_id)
    }

    /// ペアリングを記録し、両参加者の有効期限を延長する
    pub async fn record_pairing(
        &self,
        mentor_id: i32,
        learner_id: i32,
        ends_at: DateTime<Utc>,
    ) -> AppResult<PairingOutcome> {
        self.record_pairing_at(mentor_id, learner_id, ends_at, Utc::now())
            .await
    }

    pub async fn record_pairing_at(
        &self,
        mentor_id: i32,
        learner_id: i32,
        ends_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<PairingOutcome> {
        if mentor_id == learner_id {
            return Err(AppError::ValidationError(
                "A participant cannot be paired with themselves".to_string(),
            ));
        }
        if ends_at <= now {
            return Err(AppError::ValidationError(
                "Pairing end must be in the future".to_string(),
            ));
        }
        if self.policy.pairing_expiration(ends_at).is_none() {
            return Err(AppError::ValidationError(
                "Pairing end is out of range".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let mentor = Self::load_participant(&txn, mentor_id).await?;
        let learner = Self::load_participant(&txn, learner_id).await?;

        let pair_id = self.pair_id(mentor_id, learner_id);
        let (pairing, renewed) = match PairingRepository::find_by_pair_id_on(&txn, &pair_id).await? {
            Some(existing) => {
                let ends_at = existing.ends_at.max(ends_at);
                (
                    PairingRepository::update_ends_at_on(&txn, existing, ends_at).await?,
                    true,
                )
            }
            None => (
                PairingRepository::create_on(&txn, mentor_id, learner_id, pair_id, ends_at).await?,
                false,
            ),
        };

        let mentor = self.extend(&txn, mentor, pairing.ends_at, now).await?;
        let learner = self.extend(&txn, learner, pairing.ends_at, now).await?;

        txn.commit().await?;

        info!(
            pairing_id = pairing.id,
            mentor_id,
            learner_id,
            ends_at = %pairing.ends_at,
            renewed,
            "Pairing recorded"
        );

        Ok(PairingOutcome {
            pairing,
            mentor,
            learner,
            renewed,
        })
    }

    async fn load_participant<C: ConnectionTrait>(
        conn: &C,
        id: i32,
    ) -> AppResult<participant_model::Model> {
        ParticipantRepository::find_by_id_on(conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Participant with id {} not found", id)))
    }

    async fn extend<C: ConnectionTrait>(
        &self,
        conn: &C,
        participant: participant_model::Model,
        pairing_ends_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<participant_model::Model> {
        let expires = self
            .policy
            .extended_for_pairing(participant.expires, pairing_ends_at);
        if expires == participant.expires {
            return Ok(participant);
        }
        if self.policy.is_lapsed(participant.expires, now) {
            info!(
                participant_id = participant.id,
                lapsed_at = %participant.expires,
                "Lapsed participant record kept by pairing"
            );
        }
        Ok(ParticipantRepository::update_expires_on(conn, participant, expires).await?)
    }
}
