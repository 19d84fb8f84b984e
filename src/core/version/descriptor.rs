// ─── Version Descriptor ───
// Parses launcher-written version JSON and merges base + loader descriptors.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

use super::rules::Rule;

/// A version JSON as written by a launcher (Mojang format and its
/// Prism/Modrinth/CurseForge variants).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionFile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub inherits_from: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    /// Legacy `minecraftArguments` field (pre-1.13).
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetIndexInfo {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<ArgToken>,
    #[serde(default)]
    pub jvm: Vec<ArgToken>,
}

/// One entry of `arguments.jvm` / `arguments.game`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgToken {
    Literal(String),
    Conditional {
        #[serde(default)]
        rules: Vec<Rule>,
        value: ArgValue,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArgValue {
    One(String),
    Many(Vec<String>),
}

impl ArgToken {
    pub fn literal(value: &str) -> Self {
        ArgToken::Literal(value.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<Rule>>,
    #[serde(default)]
    pub natives: Option<serde_json::Value>,
    #[serde(default)]
    pub include_in_classpath: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibDownloadArtifact {
    #[serde(default)]
    pub path: Option<String>,
}

/// Where a library's jar lives, relative to the libraries root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryLocation {
    /// `downloads.artifact.path`
    ArtifactPath(String),
    /// Maven coordinate from `name`.
    Coordinate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub location: LibraryLocation,
    pub rules: Vec<Rule>,
    /// Native archives are unpacked by the owning launcher, never put on `-cp`.
    pub is_native: bool,
    pub include_in_classpath: bool,
}

impl Library {
    pub fn coordinate(coord: &str) -> Self {
        Self {
            location: LibraryLocation::Coordinate(coord.to_string()),
            rules: Vec::new(),
            is_native: false,
            include_in_classpath: true,
        }
    }

    fn from_entry(entry: LibraryEntry) -> Option<Self> {
        let artifact_path = entry
            .downloads
            .and_then(|d| d.artifact)
            .and_then(|a| a.path)
            .filter(|p| !p.trim().is_empty());

        let location = match (artifact_path, entry.name) {
            (Some(path), _) => LibraryLocation::ArtifactPath(path),
            (None, Some(name)) if !name.trim().is_empty() => LibraryLocation::Coordinate(name),
            _ => {
                debug!("Library entry without name or artifact path (skipping)");
                return None;
            }
        };

        Some(Self {
            location,
            rules: entry.rules.unwrap_or_default(),
            is_native: entry.natives.is_some(),
            include_in_classpath: entry.include_in_classpath.unwrap_or(true),
        })
    }
}

/// Directories a descriptor's relative data resolves against.
#[derive(Debug, Clone)]
pub struct DescriptorLayout {
    pub libraries_root: PathBuf,
    pub assets_root: PathBuf,
    pub client_jar: PathBuf,
}

/// Normalized launch description: one base version plus an optional loader.
#[derive(Debug, Clone)]
pub struct VersionDescriptor {
    pub id: Option<String>,
    pub inherits_from: Option<String>,
    pub main_class: String,
    pub libraries: Vec<Library>,
    pub jvm_args: Vec<ArgToken>,
    pub game_args: Vec<ArgToken>,
    pub legacy_arguments: Option<String>,
    pub asset_index_name: String,
    pub assets_root: PathBuf,
    pub libraries_root: PathBuf,
    pub client_jar: PathBuf,
}

/// How much of a loader descriptor is folded into the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Libraries, main class and argument templates.
    Full,
    /// Libraries and main class only.
    LibrariesOnly,
}

impl VersionDescriptor {
    pub fn from_file(file: VersionFile, layout: DescriptorLayout) -> Self {
        let asset_index_name = file
            .assets
            .clone()
            .filter(|a| !a.trim().is_empty())
            .or_else(|| file.asset_index.as_ref().map(|ai| ai.id.clone()))
            .unwrap_or_else(|| "legacy".to_string());
        let (jvm_args, game_args) = match file.arguments {
            Some(args) => (args.jvm, args.game),
            None => (Vec::new(), Vec::new()),
        };

        Self {
            id: file.id,
            inherits_from: file.inherits_from,
            main_class: file.main_class.unwrap_or_default(),
            libraries: file
                .libraries
                .into_iter()
                .filter_map(Library::from_entry)
                .collect(),
            jvm_args,
            game_args,
            legacy_arguments: file.minecraft_arguments.filter(|a| !a.trim().is_empty()),
            asset_index_name,
            assets_root: layout.assets_root,
            libraries_root: layout.libraries_root,
            client_jar: layout.client_jar,
        }
    }

    /// Fold a loader descriptor into this base descriptor.
    ///
    /// Loader libraries and JVM args go first, loader game args after the
    /// base ones, and a loader main class replaces the base one.
    pub fn merge_loader(mut self, loader: VersionDescriptor, mode: MergeMode) -> Self {
        if !loader.main_class.trim().is_empty() {
            self.main_class = loader.main_class;
        }

        let mut libraries = loader.libraries;
        libraries.append(&mut self.libraries);
        self.libraries = libraries;

        if mode == MergeMode::Full {
            let mut jvm_args = loader.jvm_args;
            jvm_args.append(&mut self.jvm_args);
            self.jvm_args = jvm_args;
            self.game_args.extend(loader.game_args);

            if loader.legacy_arguments.is_some() {
                self.legacy_arguments = loader.legacy_arguments;
            }
        }

        if loader.id.is_some() {
            self.id = loader.id;
        }
        self
    }

    pub fn has_jvm_template(&self) -> bool {
        !self.jvm_args.is_empty()
    }
}

/// Read and parse a version JSON from disk.
pub async fn read_version_file(path: &Path) -> LauncherResult<VersionFile> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let parsed = serde_json::from_str::<VersionFile>(&raw)?;
    debug!(
        "Parsed version file {:?} ({} libraries)",
        path,
        parsed.libraries.len()
    );
    Ok(parsed)
}
