use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::instance::LauncherKind;

use super::settings::LaunchSettings;

/// Where each launcher keeps its data on this machine.
#[derive(Debug, Clone)]
pub struct LauncherDirs {
    overrides: HashMap<LauncherKind, PathBuf>,
    home_dir: PathBuf,
    data_dir: PathBuf,
}

impl LauncherDirs {
    pub fn from_settings(settings: &LaunchSettings) -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = dirs::data_dir().unwrap_or_else(|| home_dir.clone());
        Self {
            overrides: settings.launcher_dirs.clone(),
            home_dir,
            data_dir,
        }
    }

    /// Every launcher rooted under `root/<kind>`; used to sandbox tests.
    pub fn rooted_at(root: &Path) -> Self {
        let overrides = LauncherKind::ALL
            .into_iter()
            .map(|kind| (kind, root.join(kind.to_string())))
            .collect();
        Self {
            overrides,
            home_dir: root.to_path_buf(),
            data_dir: root.to_path_buf(),
        }
    }

    pub fn with_override(mut self, kind: LauncherKind, dir: PathBuf) -> Self {
        self.overrides.insert(kind, dir);
        self
    }

    /// Root data directory of `kind`.
    ///
    /// For CurseForge this is the `curseforge/minecraft` folder; its
    /// `.minecraft`-shaped tree lives under `Install/`.
    pub fn data_dir(&self, kind: LauncherKind) -> PathBuf {
        if let Some(dir) = self.overrides.get(&kind) {
            return dir.clone();
        }

        match kind {
            LauncherKind::Prism => self.data_dir.join("PrismLauncher"),
            LauncherKind::MultiMc => {
                if cfg!(any(target_os = "windows", target_os = "macos")) {
                    self.data_dir.join("MultiMC")
                } else {
                    self.data_dir.join("multimc")
                }
            }
            LauncherKind::Modrinth => {
                if cfg!(target_os = "windows") {
                    self.data_dir.join("ModrinthApp")
                } else {
                    self.data_dir.join("com.modrinth.theseus")
                }
            }
            LauncherKind::Vanilla => {
                if cfg!(target_os = "windows") {
                    self.data_dir.join(".minecraft")
                } else if cfg!(target_os = "macos") {
                    self.data_dir.join("minecraft")
                } else {
                    self.home_dir.join(".minecraft")
                }
            }
            LauncherKind::CurseForge => {
                if cfg!(target_os = "macos") {
                    self.home_dir
                        .join("Documents")
                        .join("curseforge")
                        .join("minecraft")
                } else {
                    self.home_dir.join("curseforge").join("minecraft")
                }
            }
        }
    }

    /// The official launcher's `.minecraft` directory.
    pub fn dot_minecraft(&self) -> PathBuf {
        self.data_dir(LauncherKind::Vanilla)
    }

    /// CurseForge's `.minecraft`-shaped install tree.
    pub fn curseforge_install(&self) -> PathBuf {
        self.data_dir(LauncherKind::CurseForge).join("Install")
    }
}

/// `Path::is_file` without blocking the runtime thread.
pub async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}
