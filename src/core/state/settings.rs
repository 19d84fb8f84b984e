use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::LauncherKind;

const APP_DIR_NAME: &str = "InstanceLaunch";
const SETTINGS_FILE: &str = "launch_settings.json";

/// User-tunable launch settings, persisted as `launch_settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    pub max_memory_mb: u32,
    pub min_memory_mb: u32,
    /// Substituted for `${launcher_name}`.
    pub launcher_name: String,
    /// Substituted for `${launcher_version}`.
    pub launcher_version: String,
    /// Substituted for `${clientid}`.
    pub client_id: String,
    /// Default runtime tried after the launcher-bundled ones.
    /// Falls back to `JAVA_HOME` when unset.
    pub java_home: Option<PathBuf>,
    /// Per-launcher data directory overrides.
    pub launcher_dirs: HashMap<LauncherKind, PathBuf>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            max_memory_mb: 4096,
            min_memory_mb: 1024,
            launcher_name: "InstanceLaunch".into(),
            launcher_version: env!("CARGO_PKG_VERSION").into(),
            client_id: "null".into(),
            java_home: None,
            launcher_dirs: HashMap::new(),
        }
    }
}

impl LaunchSettings {
    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error
    /// only when the caller asked for it explicitly.
    pub fn load(path: Option<&Path>) -> LauncherResult<Self> {
        match path {
            Some(explicit) => Self::load_from(explicit),
            None => Ok(load_settings_from_disk(&default_settings_path()).unwrap_or_default()),
        }
    }

    pub fn load_from(path: &Path) -> LauncherResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|err| LauncherError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Fixed heap flags placed at the front of every JVM command line.
    pub fn heap_flags(&self) -> Vec<String> {
        let max = self.max_memory_mb.max(512);
        let min = self.min_memory_mb.clamp(256, max);
        vec![format!("-Xmx{}M", max), format!("-Xms{}M", min)]
    }

    /// Configured default runtime home: `java_home`, else `JAVA_HOME`.
    pub fn default_java_home(&self) -> Option<PathBuf> {
        self.java_home.clone().or_else(|| {
            std::env::var_os("JAVA_HOME")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }
}

fn load_settings_from_disk(path: &Path) -> Option<LaunchSettings> {
    let raw = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(settings) => {
            debug!("Loaded launch settings from {:?}", path);
            Some(settings)
        }
        Err(err) => {
            warn!("Ignoring invalid launch settings at {:?}: {}", path, err);
            None
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(SETTINGS_FILE)
}
