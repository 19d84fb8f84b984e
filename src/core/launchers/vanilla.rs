use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::auth::{self, AuthInfo, AuthReader};
use crate::core::error::LauncherResult;
use crate::core::java::{JavaLocator, RuntimeRoot};
use crate::core::state::paths;
use crate::core::version::{
    read_version_file, DescriptorLayout, MergeMode, VersionDataReader, VersionDescriptor,
    VersionQuery,
};

use super::load_base_descriptor;

/// The official launcher, or any `.minecraft`-shaped tree.
#[derive(Debug, Clone)]
pub struct VanillaLauncher {
    root: PathBuf,
}

impl VanillaLauncher {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub async fn has_version(&self, minecraft_version: &str) -> bool {
        let descriptor = self
            .versions_dir()
            .join(minecraft_version)
            .join(format!("{}.json", minecraft_version));
        paths::is_file(&descriptor).await
    }

    fn layout(&self, client_jar: PathBuf) -> DescriptorLayout {
        DescriptorLayout {
            libraries_root: self.root.join("libraries"),
            assets_root: self.root.join("assets"),
            client_jar,
        }
    }

    /// `versions/<mc>/<mc>.json`, plus an installed loader version folder
    /// inheriting from it when a loader version is requested.
    pub async fn resolve_layout(
        &self,
        query: VersionQuery<'_>,
        mode: MergeMode,
    ) -> LauncherResult<VersionDescriptor> {
        let mc = query.minecraft_version;
        let version_dir = self.versions_dir().join(mc);
        let base = load_base_descriptor(
            &version_dir.join(format!("{}.json", mc)),
            mc,
            &self.root,
            self.layout(version_dir.join(format!("{}.jar", mc))),
        )
        .await?;

        if !query.has_loader() {
            return Ok(base);
        }

        match self.find_loader_version(mc, query.loader_version).await {
            Some(loader) => {
                info!(
                    "Merging loader descriptor {} over Minecraft {}",
                    loader.id.as_deref().unwrap_or("?"),
                    mc
                );
                Ok(base.merge_loader(loader, mode))
            }
            None => {
                warn!(
                    "No installed version inherits from {} with loader {}; launching the base version",
                    mc, query.loader_version
                );
                Ok(base)
            }
        }
    }

    /// A sibling version folder whose descriptor inherits from `mc` and whose
    /// name carries `loader_version` as a whole `-`-separated component.
    async fn find_loader_version(
        &self,
        minecraft_version: &str,
        loader_version: &str,
    ) -> Option<VersionDescriptor> {
        let mut entries = tokio::fs::read_dir(self.versions_dir()).await.ok()?;
        let mut candidates = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name != minecraft_version && names_loader_version(&name, loader_version) {
                candidates.push((name, entry.path()));
            }
        }
        candidates.sort();

        for (name, dir) in candidates {
            let json = dir.join(format!("{}.json", name));
            let file = match read_version_file(&json).await {
                Ok(file) => file,
                Err(err) => {
                    debug!("Skipping {:?}: {}", json, err);
                    continue;
                }
            };
            if file.inherits_from.as_deref() != Some(minecraft_version) {
                continue;
            }
            let layout = self.layout(dir.join(format!("{}.jar", name)));
            return Some(VersionDescriptor::from_file(file, layout));
        }
        None
    }
}

/// `fabric-loader-0.15.7-1.20.1` names `0.15.7` but not `0.15.1` or `15.7`.
fn names_loader_version(folder: &str, loader_version: &str) -> bool {
    folder.match_indices(loader_version).any(|(start, _)| {
        let end = start + loader_version.len();
        let starts_clean = start == 0 || folder[..start].ends_with('-');
        let ends_clean = end == folder.len() || folder[end..].starts_with('-');
        starts_clean && ends_clean
    })
}

#[async_trait]
impl AuthReader for VanillaLauncher {
    async fn read_auth(&self) -> LauncherResult<Option<AuthInfo>> {
        auth::vanilla::read_account_cache(&self.root).await
    }
}

#[async_trait]
impl VersionDataReader for VanillaLauncher {
    async fn read_version_data(&self, query: VersionQuery<'_>) -> LauncherResult<VersionDescriptor> {
        self.resolve_layout(query, MergeMode::Full).await
    }
}

#[async_trait]
impl JavaLocator for VanillaLauncher {
    fn runtime_roots(&self) -> Vec<RuntimeRoot> {
        vec![RuntimeRoot::Mojang(self.root.join("runtime"))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LauncherError;
    use crate::core::version::LibraryLocation;

    fn write_json(path: &Path, value: serde_json::Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, value.to_string()).unwrap();
    }

    fn query<'a>(instance: &'a Path, mc: &'a str, loader: &'a str) -> VersionQuery<'a> {
        VersionQuery {
            instance_path: instance,
            minecraft_version: mc,
            loader_version: loader,
        }
    }

    #[tokio::test]
    async fn reads_plain_version() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("versions/1.20.1/1.20.1.json"),
            serde_json::json!({ "id": "1.20.1", "mainClass": "net.minecraft.client.main.Main", "assets": "5" }),
        );

        let launcher = VanillaLauncher::new(dir.path().to_path_buf());
        let desc = launcher
            .read_version_data(query(dir.path(), "1.20.1", ""))
            .await
            .unwrap();
        assert_eq!(desc.main_class, "net.minecraft.client.main.Main");
        assert_eq!(desc.client_jar, dir.path().join("versions/1.20.1/1.20.1.jar"));
        assert_eq!(desc.libraries_root, dir.path().join("libraries"));
    }

    #[tokio::test]
    async fn merges_installed_loader_version() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("versions/1.20.1/1.20.1.json"),
            serde_json::json!({ "mainClass": "net.minecraft.client.main.Main",
                                "libraries": [{ "name": "com.mojang:logging:1.1.1" }] }),
        );
        write_json(
            &dir.path().join("versions/fabric-loader-0.15.7-1.20.1/fabric-loader-0.15.7-1.20.1.json"),
            serde_json::json!({ "id": "fabric-loader-0.15.7-1.20.1", "inheritsFrom": "1.20.1",
                                "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
                                "libraries": [{ "name": "net.fabricmc:fabric-loader:0.15.7" }] }),
        );

        let launcher = VanillaLauncher::new(dir.path().to_path_buf());
        let desc = launcher
            .read_version_data(query(dir.path(), "1.20.1", "0.15.7"))
            .await
            .unwrap();
        assert_eq!(desc.main_class, "net.fabricmc.loader.impl.launch.knot.KnotClient");
        assert_eq!(
            desc.libraries[0].location,
            LibraryLocation::Coordinate("net.fabricmc:fabric-loader:0.15.7".into())
        );
        assert_eq!(desc.client_jar, dir.path().join("versions/1.20.1/1.20.1.jar"));
    }

    #[tokio::test]
    async fn loader_version_must_match_a_whole_component() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("versions/1.20.1/1.20.1.json"),
            serde_json::json!({ "mainClass": "net.minecraft.client.main.Main" }),
        );
        write_json(
            &dir.path().join("versions/fabric-loader-0.15.11-1.20.1/fabric-loader-0.15.11-1.20.1.json"),
            serde_json::json!({ "id": "fabric-loader-0.15.11-1.20.1", "inheritsFrom": "1.20.1",
                                "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
                                "libraries": [{ "name": "net.fabricmc:fabric-loader:0.15.11" }] }),
        );

        let launcher = VanillaLauncher::new(dir.path().to_path_buf());
        let desc = launcher
            .read_version_data(query(dir.path(), "1.20.1", "0.15.1"))
            .await
            .unwrap();
        assert_eq!(desc.main_class, "net.minecraft.client.main.Main");
        assert!(desc.libraries.is_empty());
    }

    #[test]
    fn loader_version_components() {
        assert!(names_loader_version("fabric-loader-0.15.7-1.20.1", "0.15.7"));
        assert!(names_loader_version("1.20.1-forge-47.2.0", "47.2.0"));
        assert!(names_loader_version("neoforge-20.4.80-beta", "20.4.80-beta"));
        assert!(!names_loader_version("fabric-loader-0.15.11-1.20.1", "0.15.1"));
        assert!(!names_loader_version("fabric-loader-0.15.7-1.20.1", "15.7"));
    }

    #[tokio::test]
    async fn missing_version_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = VanillaLauncher::new(dir.path().to_path_buf());
        let err = launcher
            .read_version_data(query(dir.path(), "1.20.1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::VersionDataMissing { .. }));
    }
}
