use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

use super::{AccountKind, AuthInfo};

/// Prism/MultiMC `accounts.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountList {
    #[serde(default)]
    active_account: Option<String>,
    #[serde(default)]
    accounts: Vec<Account>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    ygg: Option<Yggdrasil>,
    #[serde(default, rename = "type")]
    account_type: Option<String>,
    #[serde(default)]
    xuid: Option<String>,
    #[serde(default)]
    active: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Yggdrasil {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    extra: Option<YggdrasilExtra>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YggdrasilExtra {
    #[serde(default)]
    access_token: Option<String>,
}

impl Account {
    fn profile_id(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.id.as_deref())
    }

    fn token(&self) -> Option<String> {
        let ygg = self.ygg.as_ref();
        self.access_token
            .clone()
            .or_else(|| {
                ygg.and_then(|y| y.extra.as_ref())
                    .and_then(|e| e.access_token.clone())
            })
            .or_else(|| ygg.and_then(|y| y.token.clone()))
    }
}

/// Read the active account from `<data_dir>/accounts.json`.
///
/// Selection: the account whose profile id equals `activeAccount`, then one
/// flagged `"active": true`, then the first account.
pub async fn read_accounts(data_dir: &Path) -> LauncherResult<Option<AuthInfo>> {
    let path = data_dir.join("accounts.json");
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;
    let list: AccountList = serde_json::from_str(&raw)?;
    debug!("Found {} accounts in {:?}", list.accounts.len(), path);

    let active_id = list.active_account.as_deref();
    let selected = list
        .accounts
        .iter()
        .find(|a| active_id.is_some() && a.profile_id() == active_id)
        .or_else(|| list.accounts.iter().find(|a| a.active))
        .or_else(|| list.accounts.first());

    let Some(account) = selected else {
        return Ok(None);
    };

    let profile = account.profile.as_ref();
    let info = AuthInfo {
        player_name: profile.and_then(|p| p.name.clone()).unwrap_or_default(),
        uuid: profile.and_then(|p| p.id.clone()).unwrap_or_default(),
        access_token: account.token().unwrap_or_default(),
        account_kind: match account.account_type.as_deref() {
            Some(kind) if kind.eq_ignore_ascii_case("msa") => AccountKind::Msa,
            _ => AccountKind::Legacy,
        },
        xuid: account.xuid.clone(),
    };
    Ok(Some(info.sanitized()))
}
