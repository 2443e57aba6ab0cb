// src/domain/participant_model.rs
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

use super::participant_role::ParticipantRole;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub manager: String,
    pub approved: bool,
    pub time_availability: String,
    /// 関心分野（文字列のJSON配列）
    pub interests: Json,
    pub org: String,
    pub org_chart_distance: String,
    pub org_level: String,
    pub time_at_org_level: String,
    pub track_change: String,
    #[sea_orm(column_type = "Text")]
    pub comments: String,
    /// The date that this information expires. This can be extended (such as when
    /// a pairing is made), and expiration is contingent on not being in a current
    /// pair. This field accomplishes the "lean data" practice of not keeping
    /// user information forever.
    pub expires: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            approved: Set(false),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        // expires は保持ポリシーで算出してから保存すること
        if insert && matches!(self.expires, ActiveValue::NotSet) {
            return Err(DbErr::Custom(
                "participant.expires must be computed before insert".to_string(),
            ));
        }
        Ok(self)
    }
}

impl Model {
    pub fn role(&self) -> Option<ParticipantRole> {
        ParticipantRole::from_str(&self.role)
    }

    pub fn interest_list(&self) -> Vec<String> {
        match &self.interests {
            Json::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// 新規参加者の入力（有効期限は含まない）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewParticipant {
    pub email: String,
    pub full_name: String,
    pub role: ParticipantRole,
    pub manager: String,
    pub time_availability: String,
    pub interests: Vec<String>,
    pub org: String,
    pub org_chart_distance: String,
    pub org_level: String,
    pub time_at_org_level: String,
    pub track_change: String,
    pub comments: String,
}

impl NewParticipant {
    /// 有効期限を与えて ActiveModel を組み立てる
    pub fn into_active_model(self, expires: DateTime<Utc>) -> ActiveModel {
        ActiveModel {
            email: Set(self.email),
            full_name: Set(self.full_name),
            role: Set(self.role.as_str().to_string()),
            manager: Set(self.manager),
            time_availability: Set(self.time_availability),
            interests: Set(Json::from(self.interests)),
            org: Set(self.org),
            org_chart_distance: Set(self.org_chart_distance),
            org_level: Set(self.org_level),
            time_at_org_level: Set(self.time_at_org_level),
            track_change: Set(self.track_change),
            comments: Set(self.comments),
            expires: Set(expires),
            ..<ActiveModel as ActiveModelBehavior>::new()
        }
    }
}
