use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::core::auth::{self, AuthInfo, AuthReader};
use crate::core::error::LauncherResult;
use crate::core::java::{JavaLocator, RuntimeRoot};
use crate::core::version::{MergeMode, VersionDataReader, VersionDescriptor, VersionQuery};

use super::VanillaLauncher;

/// CurseForge app; its `minecraft/Install` folder is a `.minecraft`-shaped tree.
#[derive(Debug, Clone)]
pub struct CurseForgeApp {
    install: VanillaLauncher,
    fallback: VanillaLauncher,
}

impl CurseForgeApp {
    pub fn new(install_root: PathBuf, fallback: VanillaLauncher) -> Self {
        Self {
            install: VanillaLauncher::new(install_root),
            fallback,
        }
    }
}

#[async_trait]
impl AuthReader for CurseForgeApp {
    async fn read_auth(&self) -> LauncherResult<Option<AuthInfo>> {
        auth::vanilla::read_account_cache(self.install.root()).await
    }
}

#[async_trait]
impl VersionDataReader for CurseForgeApp {
    /// Loader descriptors contribute libraries and main class only.
    async fn read_version_data(&self, query: VersionQuery<'_>) -> LauncherResult<VersionDescriptor> {
        if self.install.has_version(query.minecraft_version).await
            || !self.fallback.has_version(query.minecraft_version).await
        {
            return self
                .install
                .resolve_layout(query, MergeMode::LibrariesOnly)
                .await;
        }

        debug!(
            "Minecraft {} not in {:?}; using {:?}",
            query.minecraft_version,
            self.install.root(),
            self.fallback.root()
        );
        self.fallback
            .resolve_layout(query, MergeMode::LibrariesOnly)
            .await
    }
}

#[async_trait]
impl JavaLocator for CurseForgeApp {
    fn runtime_roots(&self) -> Vec<RuntimeRoot> {
        vec![RuntimeRoot::Mojang(self.install.root().join("runtime"))]
    }
}
