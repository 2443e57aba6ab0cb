// src/service/participant_service.rs

use crate::api::dto::enrollment_dto::EnrollmentRequest;
use crate::api::dto::participant_dto::ParticipantResponse;
use crate::db::DbPool;
use crate::domain::expiration::ExpirationPolicy;
use crate::error::{AppError, AppResult};
use crate::repository::participant_repository::ParticipantRepository;
use sea_orm::SqlErr;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct ParticipantService {
    repo: Arc<ParticipantRepository>,
}

impl ParticipantService {
    pub fn new(db_pool: DbPool, policy: ExpirationPolicy) -> Self {
        Self {
            repo: Arc::new(ParticipantRepository::new(db_pool, policy)),
        }
    }

    // --- Read ---
    pub async fn list_participants(&self) -> AppResult<Vec<ParticipantResponse>> {
        let participants = self.repo.find_all().await?;
        Ok(participants.into_iter().map(Into::into).collect())
    }

    pub async fn get_participant(&self, id: i32) -> AppResult<ParticipantResponse> {
        self.repo
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Participant with id {} not found", id)))
    }

    pub async fn get_participant_by_email(&self, email: &str) -> AppResult<ParticipantResponse> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::BadRequest("email must not be empty".to_string()));
        }

        self.repo
            .find_by_email(email)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))
    }

    // --- Enrollment ---
    /// サインイン済みユーザー本人を参加者として登録する
    pub async fn enroll(
        &self,
        email: &str,
        payload: EnrollmentRequest,
    ) -> AppResult<ParticipantResponse> {
        payload.validate()?;

        if self.repo.find_by_email(email).await?.is_some() {
            return Err(already_enrolled());
        }

        // 同時登録は一意制約で検出する
        let created = self
            .repo
            .create(payload.into_new_participant(email))
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => already_enrolled(),
                _ => AppError::from(e),
            })?;

        info!(
            participant_id = created.id,
            role = %created.role,
            expires = %created.expires,
            "Participant enrolled"
        );
        Ok(created.into())
    }
}

fn already_enrolled() -> AppError {
    AppError::Conflict("This account is already enrolled".to_string())
}
