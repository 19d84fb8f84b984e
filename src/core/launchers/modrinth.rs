use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::auth::{self, AuthInfo, AuthReader};
use crate::core::error::LauncherResult;
use crate::core::java::{JavaLocator, RuntimeRoot};
use crate::core::state::paths;
use crate::core::version::{
    DescriptorLayout, MergeMode, VersionDataReader, VersionDescriptor, VersionQuery,
};

use super::{load_base_descriptor, load_optional_descriptor};

/// Modrinth App keeps shared version metadata under `<data>/meta`.
#[derive(Debug, Clone)]
pub struct ModrinthApp {
    data_dir: PathBuf,
}

impl ModrinthApp {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn meta_dir(&self) -> PathBuf {
        self.data_dir.join("meta")
    }

    fn versions_dir(&self) -> PathBuf {
        self.meta_dir().join("versions")
    }

    fn layout(&self, client_jar: PathBuf) -> DescriptorLayout {
        DescriptorLayout {
            libraries_root: self.meta_dir().join("libraries"),
            assets_root: self.meta_dir().join("assets"),
            client_jar,
        }
    }
}

/// `<mc>-<loader>`, or plain `<mc>` without a loader.
pub fn version_key(minecraft_version: &str, loader_version: &str) -> String {
    if loader_version.trim().is_empty() {
        minecraft_version.to_string()
    } else {
        format!("{}-{}", minecraft_version, loader_version)
    }
}

#[async_trait]
impl AuthReader for ModrinthApp {
    async fn read_auth(&self) -> LauncherResult<Option<AuthInfo>> {
        auth::modrinth::read_app_db(&self.data_dir).await
    }
}

#[async_trait]
impl VersionDataReader for ModrinthApp {
    async fn read_version_data(&self, query: VersionQuery<'_>) -> LauncherResult<VersionDescriptor> {
        let key = version_key(query.minecraft_version, query.loader_version);
        let version_dir = self.versions_dir().join(&key);
        let client_jar = version_dir.join(format!("{}.jar", key));
        debug!("Modrinth version key {}", key);

        let combined = load_base_descriptor(
            &version_dir.join(format!("{}.json", key)),
            query.minecraft_version,
            &version_dir,
            self.layout(client_jar.clone()),
        )
        .await?;

        let parent = match combined.inherits_from.clone() {
            Some(parent) if parent != key => parent,
            _ => return Ok(combined),
        };

        let parent_dir = self.versions_dir().join(&parent);
        let parent_jar = if paths::is_file(&client_jar).await {
            client_jar
        } else {
            parent_dir.join(format!("{}.jar", parent))
        };
        match load_optional_descriptor(
            &parent_dir.join(format!("{}.json", parent)),
            self.layout(parent_jar),
        )
        .await
        {
            Some(base) => {
                info!("Merging {} over parent version {}", key, parent);
                Ok(base.merge_loader(combined, MergeMode::Full))
            }
            None => Ok(combined),
        }
    }
}

#[async_trait]
impl JavaLocator for ModrinthApp {
    fn runtime_roots(&self) -> Vec<RuntimeRoot> {
        vec![RuntimeRoot::Flat(self.meta_dir().join("java_versions"))]
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::error::LauncherError;

    fn write_json(path: &Path, value: serde_json::Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, value.to_string()).unwrap();
    }

    fn query<'a>(mc: &'a str, loader: &'a str) -> VersionQuery<'a> {
        VersionQuery {
            instance_path: Path::new("/instances/test"),
            minecraft_version: mc,
            loader_version: loader,
        }
    }

    #[test]
    fn combined_version_key() {
        assert_eq!(version_key("1.20.1", "0.15.7"), "1.20.1-0.15.7");
        assert_eq!(version_key("1.20.1", ""), "1.20.1");
    }

    #[tokio::test]
    async fn reads_combined_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("meta/versions/1.20.1-0.15.7/1.20.1-0.15.7.json"),
            serde_json::json!({ "id": "1.20.1-0.15.7",
                                "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient" }),
        );

        let app = ModrinthApp::new(dir.path().to_path_buf());
        let desc = app.read_version_data(query("1.20.1", "0.15.7")).await.unwrap();
        assert_eq!(desc.main_class, "net.fabricmc.loader.impl.launch.knot.KnotClient");
        assert_eq!(desc.libraries_root, dir.path().join("meta/libraries"));
        assert_eq!(
            desc.client_jar,
            dir.path().join("meta/versions/1.20.1-0.15.7/1.20.1-0.15.7.jar")
        );
    }

    #[tokio::test]
    async fn inherits_from_parent_version() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("meta/versions/1.20.1/1.20.1.json"),
            serde_json::json!({ "mainClass": "net.minecraft.client.main.Main",
                                "assets": "5",
                                "libraries": [{ "name": "a:a:1" }] }),
        );
        write_json(
            &dir.path().join("meta/versions/1.20.1-47.2.0/1.20.1-47.2.0.json"),
            serde_json::json!({ "inheritsFrom": "1.20.1",
                                "mainClass": "cpw.mods.bootstraplauncher.BootstrapLauncher",
                                "libraries": [{ "name": "c:c:1" }] }),
        );

        let app = ModrinthApp::new(dir.path().to_path_buf());
        let desc = app.read_version_data(query("1.20.1", "47.2.0")).await.unwrap();
        assert_eq!(desc.main_class, "cpw.mods.bootstraplauncher.BootstrapLauncher");
        assert_eq!(desc.libraries.len(), 2);
        assert_eq!(desc.asset_index_name, "5");
        assert_eq!(desc.client_jar, dir.path().join("meta/versions/1.20.1/1.20.1.jar"));
    }

    #[tokio::test]
    async fn missing_combined_descriptor_fails_closed() {
        let dir = tempfile::tempdir().unwrap();
        let app = ModrinthApp::new(dir.path().to_path_buf());
        let err = app
            .read_version_data(query("1.20.1", "0.15.7"))
            .await
            .unwrap_err();
        match err {
            LauncherError::VersionDataMissing { version, searched } => {
                assert_eq!(version, "1.20.1");
                assert!(searched.ends_with("1.20.1-0.15.7"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
