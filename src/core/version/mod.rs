pub mod descriptor;
pub mod rules;

use std::path::Path;

use async_trait::async_trait;

use crate::core::error::LauncherResult;

pub use descriptor::{
    read_version_file, ArgToken, ArgValue, DescriptorLayout, Library, LibraryLocation, MergeMode,
    VersionDescriptor, VersionFile,
};
pub use rules::{current_os_name, evaluate, evaluate_in, Rule, RuleAction, RuleEnvironment};

/// What a launch asks the version data of a launcher for.
#[derive(Debug, Clone, Copy)]
pub struct VersionQuery<'a> {
    pub instance_path: &'a Path,
    pub minecraft_version: &'a str,
    /// Empty when the instance runs without a mod loader.
    pub loader_version: &'a str,
}

impl VersionQuery<'_> {
    pub fn has_loader(&self) -> bool {
        !self.loader_version.trim().is_empty()
    }
}

/// A launcher's on-disk version metadata.
#[async_trait]
pub trait VersionDataReader: Send + Sync {
    /// Locate and merge the base and loader descriptors. Never downloads.
    async fn read_version_data(&self, query: VersionQuery<'_>) -> LauncherResult<VersionDescriptor>;
}
