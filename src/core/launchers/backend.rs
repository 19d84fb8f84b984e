use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::auth::{AuthInfo, AuthReader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::LauncherKind;
use crate::core::java::JavaLocator;
use crate::core::state::LauncherDirs;
use crate::core::version::{VersionDataReader, VersionDescriptor, VersionQuery};

use super::{CurseForgeApp, ModrinthApp, PrismLauncher, VanillaLauncher};

/// Dispatcher over the per-launcher readers, without `Box<dyn>`.
#[derive(Debug, Clone)]
pub enum LauncherBackend {
    Vanilla(VanillaLauncher),
    Prism(PrismLauncher),
    Modrinth(ModrinthApp),
    CurseForge(CurseForgeApp),
}

impl LauncherBackend {
    pub fn for_kind(kind: LauncherKind, dirs: &LauncherDirs) -> Self {
        let dot_minecraft = VanillaLauncher::new(dirs.dot_minecraft());
        match kind {
            LauncherKind::Vanilla => Self::Vanilla(dot_minecraft),
            LauncherKind::Prism | LauncherKind::MultiMc => {
                Self::Prism(PrismLauncher::new(kind, dirs.data_dir(kind), dot_minecraft))
            }
            LauncherKind::Modrinth => Self::Modrinth(ModrinthApp::new(dirs.data_dir(kind))),
            LauncherKind::CurseForge => {
                Self::CurseForge(CurseForgeApp::new(dirs.curseforge_install(), dot_minecraft))
            }
        }
    }

    pub fn auth(&self) -> &dyn AuthReader {
        match self {
            LauncherBackend::Vanilla(b) => b,
            LauncherBackend::Prism(b) => b,
            LauncherBackend::Modrinth(b) => b,
            LauncherBackend::CurseForge(b) => b,
        }
    }

    pub fn versions(&self) -> &dyn VersionDataReader {
        match self {
            LauncherBackend::Vanilla(b) => b,
            LauncherBackend::Prism(b) => b,
            LauncherBackend::Modrinth(b) => b,
            LauncherBackend::CurseForge(b) => b,
        }
    }

    pub fn java(&self) -> &dyn JavaLocator {
        match self {
            LauncherBackend::Vanilla(b) => b,
            LauncherBackend::Prism(b) => b,
            LauncherBackend::Modrinth(b) => b,
            LauncherBackend::CurseForge(b) => b,
        }
    }
}

/// One backend per launcher kind, assembled once per host.
#[derive(Debug, Clone)]
pub struct ResolverRegistry {
    backends: HashMap<LauncherKind, LauncherBackend>,
}

impl ResolverRegistry {
    pub fn new(dirs: &LauncherDirs) -> Self {
        let backends = LauncherKind::ALL
            .into_iter()
            .map(|kind| (kind, LauncherBackend::for_kind(kind, dirs)))
            .collect();
        Self { backends }
    }

    pub fn backend(&self, kind: LauncherKind) -> LauncherResult<&LauncherBackend> {
        self.backends
            .get(&kind)
            .ok_or_else(|| LauncherError::InvalidLauncherKind(kind.to_string()))
    }

    /// Best-effort identity: the launcher's own store, then the official
    /// launcher's, then the offline identity. Never fails.
    pub async fn resolve_auth(&self, kind: LauncherKind) -> AuthInfo {
        let mut chain = vec![kind];
        if kind != LauncherKind::Vanilla {
            chain.push(LauncherKind::Vanilla);
        }

        for source in chain {
            let Ok(backend) = self.backend(source) else {
                continue;
            };
            match backend.auth().read_auth().await {
                Ok(Some(info)) => {
                    debug!(
                        "Using {} account '{}' ({})",
                        source,
                        info.player_name,
                        info.account_kind.user_type()
                    );
                    return info;
                }
                Ok(None) => debug!("No usable account in the {} store", source),
                Err(err) => warn!("Could not read {} accounts: {}", source, err),
            }
        }

        warn!("No account found; launching with the offline identity");
        AuthInfo::offline()
    }

    pub async fn resolve_version(
        &self,
        kind: LauncherKind,
        query: VersionQuery<'_>,
    ) -> LauncherResult<VersionDescriptor> {
        let descriptor = self.backend(kind)?.versions().read_version_data(query).await?;
        if descriptor.main_class.trim().is_empty() {
            warn!(
                "Version data for {} has no main class",
                query.minecraft_version
            );
            return Err(LauncherError::VersionDataMissing {
                version: query.minecraft_version.to_string(),
                searched: descriptor.libraries_root,
            });
        }
        Ok(descriptor)
    }

    pub fn java_locator(&self, kind: LauncherKind) -> LauncherResult<&dyn JavaLocator> {
        Ok(self.backend(kind)?.java())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::auth::AccountKind;

    fn write_json(path: &Path, value: serde_json::Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, value.to_string()).unwrap();
    }

    #[tokio::test]
    async fn auth_falls_back_to_vanilla_store() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("vanilla/launcher_accounts.json"),
            serde_json::json!({ "accounts": { "x": {
                "minecraftProfile": { "id": "u1", "name": "Alex" }, "accessToken": "t" } } }),
        );

        let registry = ResolverRegistry::new(&LauncherDirs::rooted_at(dir.path()));
        let info = registry.resolve_auth(LauncherKind::Prism).await;
        assert_eq!(info.player_name, "Alex");
        assert_eq!(info.account_kind, AccountKind::Msa);
    }

    #[tokio::test]
    async fn auth_without_any_store_is_offline() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ResolverRegistry::new(&LauncherDirs::rooted_at(dir.path()));
        for kind in LauncherKind::ALL {
            assert!(registry.resolve_auth(kind).await.is_offline());
        }
    }

    #[tokio::test]
    async fn corrupt_store_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("multimc")).unwrap();
        std::fs::write(dir.path().join("multimc/accounts.json"), "{ nope").unwrap();

        let registry = ResolverRegistry::new(&LauncherDirs::rooted_at(dir.path()));
        assert!(registry.resolve_auth(LauncherKind::MultiMc).await.is_offline());
    }

    #[tokio::test]
    async fn descriptor_without_main_class_is_missing_data() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("vanilla/versions/1.20.1/1.20.1.json"),
            serde_json::json!({ "id": "1.20.1" }),
        );

        let registry = ResolverRegistry::new(&LauncherDirs::rooted_at(dir.path()));
        let err = registry
            .resolve_version(
                LauncherKind::Vanilla,
                VersionQuery {
                    instance_path: dir.path(),
                    minecraft_version: "1.20.1",
                    loader_version: "",
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::VersionDataMissing { .. }));
    }
}
