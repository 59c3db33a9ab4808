use serde::{Deserialize, Serialize};

use crate::{entity::prelude::ProfileModel, ids::UserId};

/// The authenticated caller of a core operation.
///
/// Operations take a `Session` explicitly instead of reading an ambient
/// current user; RPC handlers resolve one from the connecting node key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId, email: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            display_name,
        }
    }

    pub fn from_profile(profile: &ProfileModel) -> Self {
        Self {
            user_id: profile.id,
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
        }
    }

    /// The part of the email before `@`, if there is one.
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
    }

    /// Display name, else email local part, else `fallback`.
    pub fn name_or(&self, fallback: &str) -> String {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.email_local_part())
            .unwrap_or(fallback)
            .to_string()
    }
}
