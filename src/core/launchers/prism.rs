use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::auth::{self, AuthInfo, AuthReader};
use crate::core::error::LauncherResult;
use crate::core::instance::LauncherKind;
use crate::core::java::{JavaLocator, RuntimeRoot};
use crate::core::version::{
    read_version_file, DescriptorLayout, MergeMode, VersionDataReader, VersionDescriptor,
    VersionQuery,
};

use super::{load_optional_descriptor, VanillaLauncher};

/// Component uids a loader descriptor may live under, in lookup order.
const LOADER_UIDS: [&str; 4] = [
    "net.minecraftforge",
    "net.fabricmc.fabric-loader",
    "org.quiltmc.quilt-loader",
    "net.neoforged",
];

/// Prism Launcher and MultiMC share one data layout.
#[derive(Debug, Clone)]
pub struct PrismLauncher {
    kind: LauncherKind,
    data_dir: PathBuf,
    fallback: VanillaLauncher,
}

impl PrismLauncher {
    pub fn new(kind: LauncherKind, data_dir: PathBuf, fallback: VanillaLauncher) -> Self {
        Self {
            kind,
            data_dir,
            fallback,
        }
    }

    pub fn kind(&self) -> LauncherKind {
        self.kind
    }

    fn meta_dir(&self) -> PathBuf {
        self.data_dir.join("meta")
    }

    fn layout(&self, minecraft_version: &str) -> DescriptorLayout {
        let libraries_root = self.data_dir.join("libraries");
        let client_jar = libraries_root
            .join("com")
            .join("mojang")
            .join("minecraft")
            .join(minecraft_version)
            .join(format!("minecraft-{}-client.jar", minecraft_version));
        DescriptorLayout {
            libraries_root,
            assets_root: self.data_dir.join("assets"),
            client_jar,
        }
    }

    async fn find_loader(&self, query: VersionQuery<'_>) -> Option<VersionDescriptor> {
        for uid in LOADER_UIDS {
            let path = self
                .meta_dir()
                .join(uid)
                .join(format!("{}.json", query.loader_version));
            if let Some(loader) =
                load_optional_descriptor(&path, self.layout(query.minecraft_version)).await
            {
                debug!("Loader component {} {}", uid, query.loader_version);
                return Some(loader);
            }
        }
        None
    }
}

#[async_trait]
impl AuthReader for PrismLauncher {
    async fn read_auth(&self) -> LauncherResult<Option<AuthInfo>> {
        auth::prism::read_accounts(&self.data_dir).await
    }
}

#[async_trait]
impl VersionDataReader for PrismLauncher {
    async fn read_version_data(&self, query: VersionQuery<'_>) -> LauncherResult<VersionDescriptor> {
        let mc = query.minecraft_version;
        let base_path = self.meta_dir().join("net.minecraft").join(format!("{}.json", mc));

        let base_file = match read_version_file(&base_path).await {
            Ok(file) => file,
            Err(err) => {
                warn!(
                    "{} meta for Minecraft {} unavailable ({}); falling back to {:?}",
                    self.kind,
                    mc,
                    err,
                    self.fallback.root()
                );
                return self.fallback.resolve_layout(query, MergeMode::Full).await;
            }
        };
        let base = VersionDescriptor::from_file(base_file, self.layout(mc));

        if !query.has_loader() {
            return Ok(base);
        }
        match self.find_loader(query).await {
            Some(loader) => Ok(base.merge_loader(loader, MergeMode::Full)),
            None => {
                info!(
                    "No loader component {} found under {:?}",
                    query.loader_version,
                    self.meta_dir()
                );
                Ok(base)
            }
        }
    }
}

#[async_trait]
impl JavaLocator for PrismLauncher {
    fn runtime_roots(&self) -> Vec<RuntimeRoot> {
        vec![
            RuntimeRoot::Flat(self.data_dir.join("java")),
            RuntimeRoot::Flat(self.data_dir.join("jre")),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::core::version::{ArgToken, LibraryLocation};

    fn write_json(path: &Path, value: serde_json::Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, value.to_string()).unwrap();
    }

    fn launcher(root: &Path) -> PrismLauncher {
        PrismLauncher::new(
            LauncherKind::Prism,
            root.join("prism"),
            VanillaLauncher::new(root.join("dot-minecraft")),
        )
    }

    fn query<'a>(mc: &'a str, loader: &'a str) -> VersionQuery<'a> {
        VersionQuery {
            instance_path: Path::new("/instances/test"),
            minecraft_version: mc,
            loader_version: loader,
        }
    }

    #[tokio::test]
    async fn merges_first_matching_loader_component() {
        let dir = tempfile::tempdir().unwrap();
        let meta = dir.path().join("prism/meta");
        write_json(
            &meta.join("net.minecraft/1.20.1.json"),
            serde_json::json!({ "mainClass": "net.minecraft.client.main.Main",
                                "libraries": [{ "name": "a:a:1" }],
                                "arguments": { "game": ["--base"] } }),
        );
        write_json(
            &meta.join("net.fabricmc.fabric-loader/0.15.7.json"),
            serde_json::json!({ "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
                                "libraries": [{ "name": "net.fabricmc:fabric-loader:0.15.7" }],
                                "arguments": { "game": ["--loader"] } }),
        );

        let desc = launcher(dir.path())
            .read_version_data(query("1.20.1", "0.15.7"))
            .await
            .unwrap();
        assert_eq!(desc.main_class, "net.fabricmc.loader.impl.launch.knot.KnotClient");
        assert_eq!(
            desc.libraries[0].location,
            LibraryLocation::Coordinate("net.fabricmc:fabric-loader:0.15.7".into())
        );
        assert_eq!(
            desc.game_args,
            vec![ArgToken::literal("--base"), ArgToken::literal("--loader")]
        );
        assert!(desc
            .client_jar
            .ends_with("com/mojang/minecraft/1.20.1/minecraft-1.20.1-client.jar"));
    }

    #[tokio::test]
    async fn missing_meta_falls_back_to_vanilla_tree() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            &dir.path().join("dot-minecraft/versions/1.19.2/1.19.2.json"),
            serde_json::json!({ "mainClass": "net.minecraft.client.main.Main" }),
        );

        let desc = launcher(dir.path())
            .read_version_data(query("1.19.2", ""))
            .await
            .unwrap();
        assert_eq!(
            desc.client_jar,
            dir.path().join("dot-minecraft/versions/1.19.2/1.19.2.jar")
        );
    }

    #[test]
    fn bundled_runtimes_live_in_java_and_jre() {
        let prism = launcher(Path::new("/data"));
        assert_eq!(
            prism.runtime_roots(),
            vec![
                RuntimeRoot::Flat(PathBuf::from("/data/prism/java")),
                RuntimeRoot::Flat(PathBuf::from("/data/prism/jre")),
            ]
        );
    }
}
