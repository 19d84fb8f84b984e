pub mod runtime;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::{paths, LaunchSettings};

pub use runtime::required_java_for_minecraft_version;

/// A directory a launcher installs runtimes under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeRoot {
    /// Children are runtime homes.
    Flat(PathBuf),
    /// Mojang's `<component>/<os>/<component>` tree.
    Mojang(PathBuf),
}

impl RuntimeRoot {
    /// Directories whose children are runtime homes. Walks the disk.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        match self {
            RuntimeRoot::Flat(dir) => vec![dir.clone()],
            RuntimeRoot::Mojang(root) => runtime::mojang_runtime_search_dirs(root),
        }
    }
}

/// Where a launcher keeps the runtimes it bundles.
#[async_trait]
pub trait JavaLocator: Send + Sync {
    fn runtime_roots(&self) -> Vec<RuntimeRoot>;

    async fn bundled_java(&self, required_major: u32) -> Option<PathBuf> {
        let roots = self.runtime_roots();
        debug!("Scanning bundled runtimes in {:?}", roots);
        tokio::task::spawn_blocking(move || {
            let search_dirs: Vec<PathBuf> =
                roots.iter().flat_map(RuntimeRoot::search_dirs).collect();
            runtime::scan_runtime_dirs(&search_dirs, required_major)
        })
        .await
        .ok()
        .flatten()
    }
}

/// Finds a Java executable, trying the launcher's own runtimes before the
/// machine-wide ones.
#[derive(Debug, Clone)]
pub struct JavaResolver {
    default_home: Option<PathBuf>,
    search_path: bool,
    known_paths: Vec<PathBuf>,
}

impl JavaResolver {
    pub fn from_settings(settings: &LaunchSettings) -> Self {
        Self {
            default_home: settings.default_java_home(),
            search_path: true,
            known_paths: runtime::common_java_paths(),
        }
    }

    /// Only bundled runtimes and `default_home`; nothing machine-wide.
    pub fn isolated(default_home: Option<PathBuf>) -> Self {
        Self {
            default_home,
            search_path: false,
            known_paths: Vec::new(),
        }
    }

    pub async fn resolve(
        &self,
        locator: &dyn JavaLocator,
        minecraft_version: &str,
    ) -> LauncherResult<PathBuf> {
        let required = required_java_for_minecraft_version(minecraft_version);
        debug!("Minecraft {} requires Java {}+", minecraft_version, required);

        if let Some(java) = locator.bundled_java(required).await {
            info!("Using launcher-bundled Java: {:?}", java);
            return Ok(java);
        }

        if let Some(home) = &self.default_home {
            let candidate = home.join("bin").join(runtime::java_exe());
            if paths::is_file(&candidate).await {
                info!("Using configured Java home: {:?}", candidate);
                return Ok(candidate);
            }
            debug!("Configured Java home {:?} has no java binary", home);
        }

        if self.search_path {
            if let Some(java) = runtime::search_path_for_java().await {
                info!("Using Java from PATH: {:?}", java);
                return Ok(java);
            }
        }

        for java in &self.known_paths {
            if paths::is_file(java).await {
                info!("Using Java from a common install path: {:?}", java);
                return Ok(java.clone());
            }
        }

        Err(LauncherError::JavaNotFound { required })
    }
}
