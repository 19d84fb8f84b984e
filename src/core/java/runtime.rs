use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::state::paths;

/// Minimum Java major for a Minecraft release, keyed on its minor number.
pub fn required_java_for_minecraft_version(minecraft_version: &str) -> u32 {
    let minor = minecraft_version
        .split('.')
        .nth(1)
        .and_then(|part| leading_number(part))
        .unwrap_or(0);

    if minor >= 21 {
        21
    } else if minor >= 17 {
        17
    } else {
        8
    }
}

fn leading_number(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Major version from a version string; `1.8.0_392` reads as 8.
pub fn parse_major_version(version: &str) -> Option<u32> {
    let mut parts = version.split(['.', '_', '+', '-']);
    let first = leading_number(parts.next()?)?;
    if first == 1 {
        parts.next().and_then(leading_number).or(Some(first))
    } else {
        Some(first)
    }
}

/// `JAVA_VERSION` from the contents of a runtime's `release` file.
pub fn parse_release_major(contents: &str) -> Option<u32> {
    contents.lines().find_map(|line| {
        let value = line.trim().strip_prefix("JAVA_VERSION=")?;
        parse_major_version(value.trim().trim_matches('"'))
    })
}

/// Whether the runtime rooted at `runtime_root` satisfies `required_major`.
///
/// A missing or unreadable `release` file is accepted.
pub fn release_satisfies(runtime_root: &Path, required_major: u32) -> bool {
    let release = runtime_root.join("release");
    let Ok(contents) = std::fs::read_to_string(&release) else {
        debug!("No readable release file in {:?} (accepting)", runtime_root);
        return true;
    };
    match parse_release_major(&contents) {
        Some(major) => {
            debug!("Runtime {:?} reports Java {}", runtime_root, major);
            major >= required_major
        }
        None => true,
    }
}

pub fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// The java executable inside a runtime directory, if present.
pub fn locate_java_binary(runtime_root: &Path) -> Option<PathBuf> {
    let primary = runtime_root.join("bin").join(java_exe());
    if primary.is_file() {
        return Some(primary);
    }

    let mac_layout = runtime_root
        .join("Contents")
        .join("Home")
        .join("bin")
        .join(java_exe());
    mac_layout.is_file().then_some(mac_layout)
}

/// The runtime home a java binary belongs to (`<home>/bin/java`).
fn runtime_home(java_bin: &Path) -> Option<&Path> {
    java_bin.parent()?.parent()
}

/// First bundled runtime under `search_dirs` that satisfies `required_major`.
///
/// Each search dir holds one runtime per child directory; children are tried
/// in sorted order.
pub fn scan_runtime_dirs(search_dirs: &[PathBuf], required_major: u32) -> Option<PathBuf> {
    for search_dir in search_dirs {
        let Ok(entries) = std::fs::read_dir(search_dir) else {
            continue;
        };
        let mut roots: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        roots.sort();

        for root in roots {
            let Some(java_bin) = locate_java_binary(&root) else {
                continue;
            };
            let home = runtime_home(&java_bin).unwrap_or(&root);
            if release_satisfies(home, required_major) {
                return Some(java_bin);
            }
            debug!("Runtime {:?} is older than Java {}", root, required_major);
        }
    }
    None
}

/// Mojang's platform folder name prefix inside `runtime/<component>/`.
pub fn mojang_runtime_os_prefix() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "mac-os"
    } else {
        "linux"
    }
}

/// `runtime/<component>/<os>` directories of a Mojang-style runtime tree.
pub fn mojang_runtime_search_dirs(runtime_root: &Path) -> Vec<PathBuf> {
    let Ok(components) = std::fs::read_dir(runtime_root) else {
        return Vec::new();
    };
    let prefix = mojang_runtime_os_prefix();
    let mut dirs: Vec<PathBuf> = components
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .flat_map(|component| {
            std::fs::read_dir(&component)
                .into_iter()
                .flatten()
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_dir()
                        && path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with(prefix))
                })
                .collect::<Vec<_>>()
        })
        .collect();
    dirs.sort();
    dirs
}

/// Well-known install locations checked last.
pub fn common_java_paths() -> Vec<PathBuf> {
    let exe = java_exe();
    if cfg!(target_os = "windows") {
        let program_files = PathBuf::from("C:\\Program Files");
        vec![
            program_files.join("Java").join("jre-17").join("bin").join(exe),
            program_files
                .join("Eclipse Adoptium")
                .join("jre-17")
                .join("bin")
                .join(exe),
            program_files.join("Microsoft").join("jdk-17").join("bin").join(exe),
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/usr/bin/java"),
            PathBuf::from("/Library/Java/JavaVirtualMachines/jdk-17.jdk/Contents/Home/bin/java"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/bin/java"),
            PathBuf::from("/usr/lib/jvm/java-17-openjdk-amd64/bin/java"),
            PathBuf::from("/usr/lib/jvm/java-17/bin/java"),
            PathBuf::from("/usr/lib/jvm/java-17-openjdk/bin/java"),
        ]
    }
}

/// First `java` on the executable search path (`which` / `where`).
pub async fn search_path_for_java() -> Option<PathBuf> {
    let lookup = if cfg!(windows) { "where" } else { "which" };
    let output = tokio::process::Command::new(lookup)
        .arg("java")
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }
    let candidate = PathBuf::from(first);
    paths::is_file(&candidate).await.then_some(candidate)
}
