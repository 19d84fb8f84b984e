pub mod backend;
pub mod curseforge;
pub mod modrinth;
pub mod prism;
pub mod vanilla;

use std::path::Path;

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::paths;
use crate::core::version::{read_version_file, DescriptorLayout, VersionDescriptor};

pub use backend::{LauncherBackend, ResolverRegistry};
pub use curseforge::CurseForgeApp;
pub use modrinth::ModrinthApp;
pub use prism::PrismLauncher;
pub use vanilla::VanillaLauncher;

/// Read a base descriptor; absent or unparsable data fails closed.
pub(crate) async fn load_base_descriptor(
    path: &Path,
    minecraft_version: &str,
    searched: &Path,
    layout: DescriptorLayout,
) -> LauncherResult<VersionDescriptor> {
    if !paths::is_file(path).await {
        debug!("Base descriptor {:?} does not exist", path);
        return Err(LauncherError::VersionDataMissing {
            version: minecraft_version.to_string(),
            searched: searched.to_path_buf(),
        });
    }

    match read_version_file(path).await {
        Ok(file) => Ok(VersionDescriptor::from_file(file, layout)),
        Err(err) => {
            warn!("Unreadable base descriptor {:?}: {}", path, err);
            Err(LauncherError::VersionDataMissing {
                version: minecraft_version.to_string(),
                searched: searched.to_path_buf(),
            })
        }
    }
}

/// Read an optional descriptor (loader data); failures are logged and skipped.
pub(crate) async fn load_optional_descriptor(
    path: &Path,
    layout: DescriptorLayout,
) -> Option<VersionDescriptor> {
    if !paths::is_file(path).await {
        return None;
    }
    match read_version_file(path).await {
        Ok(file) => Some(VersionDescriptor::from_file(file, layout)),
        Err(err) => {
            warn!("Skipping unreadable descriptor {:?}: {}", path, err);
            None
        }
    }
}
