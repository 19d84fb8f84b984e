use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::error::LauncherError;

/// Third-party launchers whose on-disk layout we know how to read.
/// Fixed when the instance is detected; every resolver keys off it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LauncherKind {
    Vanilla,
    Prism,
    MultiMc,
    Modrinth,
    CurseForge,
}

impl LauncherKind {
    pub const ALL: [LauncherKind; 5] = [
        LauncherKind::Vanilla,
        LauncherKind::Prism,
        LauncherKind::MultiMc,
        LauncherKind::Modrinth,
        LauncherKind::CurseForge,
    ];
}

impl std::fmt::Display for LauncherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LauncherKind::Vanilla => write!(f, "vanilla"),
            LauncherKind::Prism => write!(f, "prism"),
            LauncherKind::MultiMc => write!(f, "multimc"),
            LauncherKind::Modrinth => write!(f, "modrinth"),
            LauncherKind::CurseForge => write!(f, "curseforge"),
        }
    }
}

impl FromStr for LauncherKind {
    type Err = LauncherError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vanilla" | "official" => Ok(LauncherKind::Vanilla),
            "prism" | "prismlauncher" => Ok(LauncherKind::Prism),
            "multimc" => Ok(LauncherKind::MultiMc),
            "modrinth" => Ok(LauncherKind::Modrinth),
            "curseforge" => Ok(LauncherKind::CurseForge),
            _ => Err(LauncherError::InvalidLauncherKind(raw.to_string())),
        }
    }
}

/// Mod loader families, as reported by the instance detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    Vanilla,
    Forge,
    Fabric,
    NeoForge,
    Quilt,
}

impl FromStr for LoaderType {
    type Err = LauncherError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "vanilla" | "none" => Ok(LoaderType::Vanilla),
            "forge" => Ok(LoaderType::Forge),
            "fabric" => Ok(LoaderType::Fabric),
            "neoforge" => Ok(LoaderType::NeoForge),
            "quilt" => Ok(LoaderType::Quilt),
            _ => Err(LauncherError::InvalidLoader(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderInfo {
    #[serde(rename = "type")]
    pub loader_type: LoaderType,
    pub version: String,
}

/// `<type>:<version>`, e.g. `fabric:0.15.7`.
impl FromStr for LoaderInfo {
    type Err = LauncherError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (kind, version) = raw
            .split_once(':')
            .ok_or_else(|| LauncherError::InvalidLoader(raw.to_string()))?;
        if version.trim().is_empty() {
            return Err(LauncherError::InvalidLoader(raw.to_string()));
        }
        Ok(Self {
            loader_type: kind.parse()?,
            version: version.trim().to_string(),
        })
    }
}

/// What the instance detector hands over for a launch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub instance_path: PathBuf,
    pub minecraft_version: String,
    #[serde(default)]
    pub loader: Option<LoaderInfo>,
    pub launcher_kind: LauncherKind,
}

impl LaunchRequest {
    /// Loader version, or an empty string for vanilla instances.
    pub fn loader_version(&self) -> &str {
        match &self.loader {
            Some(loader) if loader.loader_type != LoaderType::Vanilla => loader.version.trim(),
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launcher_kind_round_trips_through_display() {
        for kind in LauncherKind::ALL {
            assert_eq!(kind.to_string().parse::<LauncherKind>().unwrap(), kind);
        }
        assert!("technic".parse::<LauncherKind>().is_err());
    }

    #[test]
    fn launch_request_parses_detector_payload() {
        let request: LaunchRequest = serde_json::from_value(serde_json::json!({
            "instancePath": "/games/pack",
            "minecraftVersion": "1.20.1",
            "loader": { "type": "forge", "version": "47.4.1" },
            "launcherKind": "modrinth"
        }))
        .unwrap();

        assert_eq!(request.launcher_kind, LauncherKind::Modrinth);
        assert_eq!(request.loader_version(), "47.4.1");
    }

    #[test]
    fn loader_spec_parses_type_and_version() {
        let loader: LoaderInfo = "neoforge:21.1.77".parse().unwrap();
        assert_eq!(loader.loader_type, LoaderType::NeoForge);
        assert_eq!(loader.version, "21.1.77");
        assert!("fabric".parse::<LoaderInfo>().is_err());
        assert!("rift:1.0".parse::<LoaderInfo>().is_err());
    }

    #[test]
    fn vanilla_loader_has_no_loader_version() {
        let request = LaunchRequest {
            instance_path: PathBuf::from("/games/plain"),
            minecraft_version: "1.16.5".into(),
            loader: Some(LoaderInfo {
                loader_type: LoaderType::Vanilla,
                version: "1.16.5".into(),
            }),
            launcher_kind: LauncherKind::Vanilla,
        };
        assert_eq!(request.loader_version(), "");
    }
}
