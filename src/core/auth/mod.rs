// ─── Player Identity ───
// Best-effort credentials read from a launcher's local account store.

pub mod modrinth;
pub mod prism;
pub mod vanilla;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::LauncherResult;

pub const OFFLINE_PLAYER_NAME: &str = "Player";
pub const OFFLINE_ACCESS_TOKEN: &str = "0";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Msa,
    Legacy,
}

impl AccountKind {
    /// Value substituted for `${user_type}`.
    pub fn user_type(self) -> &'static str {
        match self {
            AccountKind::Msa => "msa",
            AccountKind::Legacy => "legacy",
        }
    }
}

/// Identity passed to the game. Built fresh for every launch, never stored.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthInfo {
    pub player_name: String,
    pub uuid: String,
    pub access_token: String,
    pub account_kind: AccountKind,
    pub xuid: Option<String>,
}

impl Default for AuthInfo {
    fn default() -> Self {
        Self::offline()
    }
}

impl AuthInfo {
    /// Fixed identity used when no usable credentials were found.
    pub fn offline() -> Self {
        Self {
            player_name: OFFLINE_PLAYER_NAME.into(),
            uuid: nil_uuid(),
            access_token: OFFLINE_ACCESS_TOKEN.into(),
            account_kind: AccountKind::Legacy,
            xuid: None,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.account_kind == AccountKind::Legacy && self.access_token == OFFLINE_ACCESS_TOKEN
    }

    /// Fill blank fields from the offline identity.
    pub fn sanitized(mut self) -> Self {
        if self.player_name.trim().is_empty() {
            self.player_name = OFFLINE_PLAYER_NAME.into();
        }
        if self.uuid.trim().is_empty() {
            self.uuid = nil_uuid();
        }
        if self.access_token.trim().is_empty() {
            self.access_token = OFFLINE_ACCESS_TOKEN.into();
        }
        if self.xuid.as_deref().is_some_and(|x| x.trim().is_empty()) {
            self.xuid = None;
        }
        self
    }
}

/// A launcher's local account store.
#[async_trait]
pub trait AuthReader: Send + Sync {
    /// `Ok(None)` when the store exists but holds no usable account.
    async fn read_auth(&self) -> LauncherResult<Option<AuthInfo>>;
}

pub fn nil_uuid() -> String {
    uuid::Uuid::nil().hyphenated().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_identity_is_fixed() {
        let offline = AuthInfo::offline();
        assert_eq!(offline.player_name, "Player");
        assert_eq!(offline.uuid, "00000000-0000-0000-0000-000000000000");
        assert_eq!(offline.access_token, "0");
        assert_eq!(offline.account_kind.user_type(), "legacy");
        assert!(offline.is_offline());
    }

    #[test]
    fn sanitized_fills_blank_fields() {
        let info = AuthInfo {
            player_name: " ".into(),
            uuid: String::new(),
            access_token: "tok".into(),
            account_kind: AccountKind::Msa,
            xuid: Some(String::new()),
        }
        .sanitized();

        assert_eq!(info.player_name, "Player");
        assert_eq!(info.uuid, nil_uuid());
        assert_eq!(info.access_token, "tok");
        assert_eq!(info.xuid, None);
        assert!(!info.is_offline());
    }
}
