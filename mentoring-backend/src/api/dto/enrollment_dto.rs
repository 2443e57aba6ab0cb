// src/api/dto/enrollment_dto.rs
use crate::domain::participant_model::NewParticipant;
use crate::domain::participant_role::ParticipantRole;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const SHORT_TEXT_MAX_LENGTH: u64 = 255;
const COMMENTS_MAX_LENGTH: u64 = 4000;

// --- Request DTOs ---

#[derive(Deserialize, Serialize, Debug, Clone, Validate)]
pub struct EnrollmentRequest {
    #[validate(length(
        min = 1,
        max = SHORT_TEXT_MAX_LENGTH,
        message = "Full name must be between 1 and 255 characters"
    ))]
    pub full_name: String,

    #[validate(custom(function = validate_role))]
    pub role: String,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH, message = "Manager must not exceed 255 characters"))]
    #[serde(default)]
    pub manager: String,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH))]
    #[serde(default)]
    pub time_availability: String,

    #[validate(custom(function = validate_interests))]
    #[serde(default)]
    pub interests: Vec<String>,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH))]
    #[serde(default)]
    pub org: String,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH))]
    #[serde(default)]
    pub org_chart_distance: String,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH))]
    #[serde(default)]
    pub org_level: String,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH))]
    #[serde(default)]
    pub time_at_org_level: String,

    #[validate(length(max = SHORT_TEXT_MAX_LENGTH))]
    #[serde(default)]
    pub track_change: String,

    #[validate(length(max = COMMENTS_MAX_LENGTH, message = "Comments must not exceed 4000 characters"))]
    #[serde(default)]
    pub comments: String,
}

impl EnrollmentRequest {
    /// 検証済みリクエストを新規参加者に変換（メールアドレスはセッションから）
    pub fn into_new_participant(self, email: &str) -> NewParticipant {
        NewParticipant {
            email: email.to_string(),
            full_name: self.full_name.trim().to_string(),
            // validate_role を通過済み
            role: ParticipantRole::from_str(&self.role).unwrap_or(ParticipantRole::Learner),
            manager: self.manager,
            time_availability: self.time_availability,
            interests: self
                .interests
                .into_iter()
                .map(|i| i.trim().to_string())
                .collect(),
            org: self.org,
            org_chart_distance: self.org_chart_distance,
            org_level: self.org_level,
            time_at_org_level: self.time_at_org_level,
            track_change: self.track_change,
            comments: self.comments,
        }
    }
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if ParticipantRole::from_str(role).is_none() {
        let mut error = ValidationError::new("invalid_role");
        error.message = Some("Role must be one of: mentor, learner, both".into());
        return Err(error);
    }
    Ok(())
}

fn validate_interests(interests: &[String]) -> Result<(), ValidationError> {
    if interests.len() > 50 {
        let mut error = ValidationError::new("too_many_interests");
        error.message = Some("At most 50 interests may be given".into());
        return Err(error);
    }
    if interests
        .iter()
        .any(|i| i.trim().is_empty() || i.len() > SHORT_TEXT_MAX_LENGTH as usize)
    {
        let mut error = ValidationError::new("invalid_interest");
        error.message = Some("Interests must be non-empty and at most 255 characters".into());
        return Err(error);
    }
    Ok(())
}
