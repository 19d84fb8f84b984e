use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::{LaunchRequest, LauncherKind, LoaderInfo};
use crate::core::launch::Launcher;

/// Read the instance detector's JSON hand-off.
pub fn load_request(path: &Path) -> LauncherResult<LaunchRequest> {
    let raw = std::fs::read_to_string(path).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn build_request(
    instance_path: PathBuf,
    minecraft_version: String,
    loader: Option<LoaderInfo>,
    launcher_kind: LauncherKind,
) -> LaunchRequest {
    let instance_path = std::fs::canonicalize(&instance_path).unwrap_or(instance_path);
    LaunchRequest {
        instance_path,
        minecraft_version,
        loader,
        launcher_kind,
    }
}

/// Spawn the game; with `wait`, stay alive until it exits and stop it on Ctrl-C.
pub async fn launch_instance(
    launcher: &Launcher,
    request: &LaunchRequest,
    wait: bool,
) -> LauncherResult<()> {
    let outcome = launcher.launch(request).await?;
    println!("pid {}", outcome.pid);
    println!("java {}", outcome.java.display());
    println!("main class {}", outcome.main_class);

    if !wait {
        info!(
            "Leaving pid {} running in the background; logs stop with this process",
            outcome.pid
        );
        return Ok(());
    }

    let interrupted = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };
    match launcher.wait_for_exit(outcome, interrupted).await {
        Some(code) => println!("exited with code {}", code),
        None => println!("exited without an exit code"),
    }
    Ok(())
}

pub async fn print_java(
    launcher: &Launcher,
    kind: LauncherKind,
    minecraft_version: &str,
) -> LauncherResult<()> {
    let java = launcher.resolve_java(kind, minecraft_version).await?;
    println!("{}", java.display());
    Ok(())
}

pub async fn print_command(launcher: &Launcher, request: &LaunchRequest) -> LauncherResult<()> {
    let plan = launcher.plan(request).await?;
    println!("{}", plan.command_line());
    Ok(())
}

pub async fn print_auth(launcher: &Launcher, kind: LauncherKind) -> LauncherResult<()> {
    let auth = launcher.resolve_auth(kind).await;
    println!("{} ({})", auth.player_name, auth.account_kind.user_type());
    Ok(())
}
