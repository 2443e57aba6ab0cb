// src/api/dto/participant_dto.rs
use crate::domain::participant_model;
use serde::{Deserialize, Serialize};

/// 管理APIで公開する参加者フィールド
///
/// expires などライフサイクル管理用の値は公開しない。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ParticipantResponse {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub full_name: String,
    pub manager: String,
    pub approved: bool,
    pub time_availability: String,
    pub org: String,
    pub org_chart_distance: String,
    pub org_level: String,
    pub time_at_org_level: String,
    pub interests: Vec<String>,
    pub track_change: String,
    pub comments: String,
}

impl From<participant_model::Model> for ParticipantResponse {
    fn from(model: participant_model::Model) -> Self {
        let interests = model.interest_list();
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            full_name: model.full_name,
            manager: model.manager,
            approved: model.approved,
            time_availability: model.time_availability,
            org: model.org,
            org_chart_distance: model.org_chart_distance,
            org_level: model.org_level,
            time_at_org_level: model.time_at_org_level,
            interests,
            track_change: model.track_change,
            comments: model.comments,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ByEmailQuery {
    pub email: String,
}
