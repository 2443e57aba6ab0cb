// src/domain/capability.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// SSO グループ「mozilliansorg_mentoring-committee」のメンバーは staff として全操作が可能
pub const DEFAULT_STAFF_GROUP: &str = "mozilliansorg_mentoring-committee";

/// SSOグループから付与される権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// 管理APIを利用できる
    Staff,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityMapError {
    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("group name '{0}' must not contain whitespace")]
    InvalidGroupName(String),
}

/// グループ名 → 権限セットの対応表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCapabilityMap {
    entries: BTreeMap<String, BTreeSet<Capability>>,
}

impl GroupCapabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, group: &str, capability: Capability) -> Result<Self, CapabilityMapError> {
        let group = group.trim();
        if group.is_empty() {
            return Err(CapabilityMapError::EmptyGroupName);
        }
        if group.chars().any(char::is_whitespace) {
            return Err(CapabilityMapError::InvalidGroupName(group.to_string()));
        }

        self.entries
            .entry(group.to_string())
            .or_default()
            .insert(capability);
        Ok(self)
    }

    pub fn from_staff_groups<S: AsRef<str>>(groups: &[S]) -> Result<Self, CapabilityMapError> {
        groups
            .iter()
            .try_fold(Self::new(), |map, group| map.grant(group.as_ref(), Capability::Staff))
    }

    pub fn default_staff() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            DEFAULT_STAFF_GROUP.to_string(),
            BTreeSet::from([Capability::Staff]),
        );
        Self { entries }
    }

    /// 所属グループに対応する権限の和集合
    pub fn capabilities_for<'a, I>(&self, groups: I) -> BTreeSet<Capability>
    where
        I: IntoIterator<Item = &'a str>,
    {
        groups
            .into_iter()
            .filter_map(|group| self.entries.get(group))
            .flatten()
            .copied()
            .collect()
    }

    pub fn groups_with(&self, capability: Capability) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, caps)| caps.contains(&capability))
            .map(|(group, _)| group.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
