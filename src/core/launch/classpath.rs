// ─── Classpath Builder ───
// Constructs the classpath string for launching Minecraft.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::MavenArtifact;
use crate::core::version::{self, Library, LibraryLocation, RuleEnvironment, VersionDescriptor};

/// Builds the classpath string for a merged descriptor.
///
/// Includes, in order:
/// - the client jar, when it exists
/// - every library that is not native, not excluded, allowed by its rules
///   and present on disk
///
/// Entries are not de-duplicated. Uses `;` on Windows, `:` on Linux/macOS.
pub fn build_classpath(descriptor: &VersionDescriptor) -> LauncherResult<String> {
    build_classpath_in(descriptor, &RuleEnvironment::current())
}

pub fn build_classpath_in(
    descriptor: &VersionDescriptor,
    env: &RuleEnvironment,
) -> LauncherResult<String> {
    let mut entries: Vec<String> = Vec::new();

    if descriptor.client_jar.is_file() {
        entries.push(safe_path_str(&descriptor.client_jar));
    } else {
        debug!("Client jar not found: {:?}", descriptor.client_jar);
    }

    for library in &descriptor.libraries {
        if library.is_native || !library.include_in_classpath {
            continue;
        }
        if !version::evaluate_in(&library.rules, env) {
            continue;
        }
        let Some(path) = library_path(&descriptor.libraries_root, library) else {
            continue;
        };
        if path.is_file() {
            entries.push(safe_path_str(&path));
        } else {
            debug!("Library not found on disk (skipping): {:?}", path);
        }
    }

    if entries.is_empty() {
        return Err(LauncherError::NoLibrariesFound);
    }

    debug!("Classpath has {} entries", entries.len());
    Ok(entries.join(get_classpath_separator()))
}

/// Where a library's jar lives under `libraries_root`.
pub fn library_path(libraries_root: &Path, library: &Library) -> Option<PathBuf> {
    match &library.location {
        LibraryLocation::ArtifactPath(relative) => Some(libraries_root.join(relative)),
        LibraryLocation::Coordinate(coord) => match MavenArtifact::parse(coord) {
            Ok(artifact) => Some(libraries_root.join(artifact.local_path())),
            Err(err) => {
                debug!("{} (skipping)", err);
                None
            }
        },
    }
}

pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

pub fn safe_path_str(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        // Java mis-handles `\\?\C:\...` extended-length paths on the classpath.
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::{Rule, RuleAction};

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"jar").unwrap();
    }

    fn descriptor(root: &Path, libraries: Vec<Library>) -> VersionDescriptor {
        VersionDescriptor {
            id: None,
            inherits_from: None,
            main_class: "net.minecraft.client.main.Main".into(),
            libraries,
            jvm_args: Vec::new(),
            game_args: Vec::new(),
            legacy_arguments: None,
            asset_index_name: "legacy".into(),
            assets_root: root.join("assets"),
            libraries_root: root.join("libraries"),
            client_jar: root.join("client.jar"),
        }
    }

    fn linux() -> RuleEnvironment {
        RuleEnvironment::for_os("linux")
    }

    #[test]
    fn client_jar_then_libraries_in_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("client.jar"));
        touch(&root.join("libraries/c/c/1/c-1.jar"));
        touch(&root.join("libraries/a/a/1/a-1.jar"));
        touch(&root.join("libraries/com/example/b/2.0/b-2.0.jar"));

        let desc = descriptor(
            root,
            vec![
                Library::coordinate("c:c:1"),
                Library::coordinate("a:a:1"),
                Library {
                    location: LibraryLocation::ArtifactPath("com/example/b/2.0/b-2.0.jar".into()),
                    ..Library::coordinate("unused:unused:0")
                },
            ],
        );

        let classpath = build_classpath_in(&desc, &linux()).unwrap();
        let expected = [
            root.join("client.jar"),
            root.join("libraries/c/c/1/c-1.jar"),
            root.join("libraries/a/a/1/a-1.jar"),
            root.join("libraries/com/example/b/2.0/b-2.0.jar"),
        ]
        .iter()
        .map(|p| safe_path_str(p))
        .collect::<Vec<_>>()
        .join(get_classpath_separator());
        assert_eq!(classpath, expected);
    }

    #[test]
    fn skips_natives_excluded_rejected_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for coord in ["n/n/1/n-1.jar", "x/x/1/x-1.jar", "w/w/1/w-1.jar", "ok/ok/1/ok-1.jar"] {
            touch(&root.join("libraries").join(coord));
        }

        let desc = descriptor(
            root,
            vec![
                Library {
                    is_native: true,
                    ..Library::coordinate("n:n:1")
                },
                Library {
                    include_in_classpath: false,
                    ..Library::coordinate("x:x:1")
                },
                Library {
                    rules: vec![Rule::for_os(RuleAction::Allow, "windows")],
                    ..Library::coordinate("w:w:1")
                },
                Library::coordinate("missing:missing:1"),
                Library::coordinate("ok:ok:1"),
            ],
        );

        let classpath = build_classpath_in(&desc, &linux()).unwrap();
        assert_eq!(classpath, safe_path_str(&root.join("libraries/ok/ok/1/ok-1.jar")));
    }

    #[test]
    fn duplicates_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("libraries/a/a/1/a-1.jar"));

        let desc = descriptor(
            root,
            vec![Library::coordinate("a:a:1"), Library::coordinate("a:a:1")],
        );
        let classpath = build_classpath_in(&desc, &linux()).unwrap();
        assert_eq!(classpath.split(get_classpath_separator()).count(), 2);
    }

    #[test]
    fn classifier_coordinates_resolve() {
        let root = Path::new("/libs");
        let path = library_path(
            root,
            &Library::coordinate("org.lwjgl:lwjgl:3.3.1:natives-linux"),
        )
        .unwrap();
        assert_eq!(
            path,
            root.join("org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-natives-linux.jar")
        );
    }

    #[test]
    fn empty_classpath_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let desc = descriptor(dir.path(), vec![Library::coordinate("a:a:1")]);
        assert!(matches!(
            build_classpath_in(&desc, &linux()),
            Err(LauncherError::NoLibrariesFound)
        ));
    }
}
