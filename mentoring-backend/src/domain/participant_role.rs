// src/domain/participant_role.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 参加者の役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Mentor,
    Learner,
    Both,
}

impl ParticipantRole {
    /// 文字列からParticipantRoleに変換
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mentor" => Some(Self::Mentor),
            "learner" => Some(Self::Learner),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::Learner => "learner",
            Self::Both => "both",
        }
    }

    pub fn is_mentor(&self) -> bool {
        matches!(self, Self::Mentor | Self::Both)
    }

    pub fn is_learner(&self) -> bool {
        matches!(self, Self::Learner | Self::Both)
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
