// src/domain/session_user.rs

use super::capability::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// セッショントークンに埋め込むユーザー情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl SessionUser {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: BTreeSet<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn is_staff(&self) -> bool {
        self.has_capability(Capability::Staff)
    }
}
