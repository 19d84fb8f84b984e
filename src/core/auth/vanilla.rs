use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};

use super::{AccountKind, AuthInfo};

/// Official launcher `launcher_accounts.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountCache {
    #[serde(default)]
    active_account_local_id: Option<String>,
    #[serde(default)]
    accounts: BTreeMap<String, CachedAccount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedAccount {
    #[serde(default)]
    minecraft_profile: Option<MinecraftProfile>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MinecraftProfile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Read the active account from `<dot_minecraft>/launcher_accounts.json`.
pub async fn read_account_cache(dot_minecraft: &Path) -> LauncherResult<Option<AuthInfo>> {
    let path = dot_minecraft.join("launcher_accounts.json");
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;
    let cache: AccountCache = serde_json::from_str(&raw)?;

    let active = cache
        .active_account_local_id
        .as_deref()
        .and_then(|id| cache.accounts.get(id))
        .or_else(|| cache.accounts.values().next());

    let Some(account) = active else {
        return Ok(None);
    };

    let profile = account.minecraft_profile.as_ref();
    let info = AuthInfo {
        player_name: profile
            .and_then(|p| p.name.clone())
            .or_else(|| account.username.clone())
            .unwrap_or_default(),
        uuid: profile.and_then(|p| p.id.clone()).unwrap_or_default(),
        access_token: account.access_token.clone().unwrap_or_default(),
        account_kind: AccountKind::Msa,
        xuid: None,
    };
    Ok(Some(info.sanitized()))
}
