// ─── Launch Task ───
// Resolves an instance's launch inputs and spawns the game process.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::core::auth::AuthInfo;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::{LaunchRequest, LauncherKind};
use crate::core::java::JavaResolver;
use crate::core::launchers::ResolverRegistry;
use crate::core::state::{LaunchSettings, LauncherDirs};
use crate::core::version::{VersionDescriptor, VersionQuery};

use super::arguments::{self, LaunchVariables, VariableSources};
use super::classpath::{build_classpath, safe_path_str};
use super::registry::{GameProcess, ProcessRegistry};

/// Natives live inside the instance, next to the launcher's own data.
pub const NATIVES_SUBDIR: [&str; 2] = [".launch", "natives"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Resolving,
    Spawning,
    Running,
    Exited,
}

impl std::fmt::Display for LaunchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchState::Idle => write!(f, "idle"),
            LaunchState::Resolving => write!(f, "resolving"),
            LaunchState::Spawning => write!(f, "spawning"),
            LaunchState::Running => write!(f, "running"),
            LaunchState::Exited => write!(f, "exited"),
        }
    }
}

fn transition(instance_path: &Path, from: LaunchState, to: LaunchState) {
    info!("[{}] {} -> {}", instance_label(instance_path), from, to);
}

/// A fully resolved invocation, ready to spawn.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub instance_path: PathBuf,
    pub java: PathBuf,
    pub args: Vec<String>,
    pub main_class: String,
    pub natives_dir: PathBuf,
    pub auth: AuthInfo,
}

impl LaunchPlan {
    /// The command line, quoted for pasting into a shell.
    pub fn command_line(&self) -> String {
        let program = shell_escape(&self.java.to_string_lossy());
        let args = self
            .args
            .iter()
            .map(|arg| shell_escape(arg))
            .collect::<Vec<_>>()
            .join(" ");

        if args.is_empty() {
            program
        } else {
            format!("{} {}", program, args)
        }
    }
}

/// What a successful launch hands back.
#[derive(Debug)]
pub struct LaunchOutcome {
    pub pid: u32,
    pub instance_path: PathBuf,
    pub java: PathBuf,
    pub main_class: String,
    /// Resolves to the exit code once the game terminates.
    pub exit: JoinHandle<Option<i32>>,
}

/// Sequences resolution, spawning and registration for one host.
pub struct Launcher {
    settings: LaunchSettings,
    resolvers: ResolverRegistry,
    java: JavaResolver,
    processes: ProcessRegistry,
}

impl Launcher {
    /// Launcher over this machine's launcher directories and the global
    /// process registry.
    pub fn new(settings: LaunchSettings) -> Self {
        let dirs = LauncherDirs::from_settings(&settings);
        Self {
            resolvers: ResolverRegistry::new(&dirs),
            java: JavaResolver::from_settings(&settings),
            processes: ProcessRegistry::global().clone(),
            settings,
        }
    }

    pub fn with_parts(
        settings: LaunchSettings,
        resolvers: ResolverRegistry,
        java: JavaResolver,
        processes: ProcessRegistry,
    ) -> Self {
        Self {
            settings,
            resolvers,
            java,
            processes,
        }
    }

    pub fn processes(&self) -> &ProcessRegistry {
        &self.processes
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    pub async fn resolve_auth(&self, kind: LauncherKind) -> AuthInfo {
        self.resolvers.resolve_auth(kind).await
    }

    pub async fn resolve_java(
        &self,
        kind: LauncherKind,
        minecraft_version: &str,
    ) -> LauncherResult<PathBuf> {
        let locator = self.resolvers.java_locator(kind)?;
        self.java.resolve(locator, minecraft_version).await
    }

    pub async fn resolve_version(&self, request: &LaunchRequest) -> LauncherResult<VersionDescriptor> {
        let query = VersionQuery {
            instance_path: &request.instance_path,
            minecraft_version: &request.minecraft_version,
            loader_version: request.loader_version(),
        };
        self.resolvers
            .resolve_version(request.launcher_kind, query)
            .await
    }

    /// Resolve everything needed to start the game without spawning it.
    pub async fn plan(&self, request: &LaunchRequest) -> LauncherResult<LaunchPlan> {
        let kind = request.launcher_kind;
        let auth = self.resolve_auth(kind).await;
        let java = self.resolve_java(kind, &request.minecraft_version).await?;
        let descriptor = self.resolve_version(request).await?;
        let natives_dir = natives_dir(&request.instance_path);

        // Classpath and variables stat and canonicalize every jar.
        let (descriptor, variables) = {
            let auth = auth.clone();
            let settings = self.settings.clone();
            let minecraft_version = request.minecraft_version.clone();
            let instance_path = request.instance_path.clone();
            let natives_dir = natives_dir.clone();
            tokio::task::spawn_blocking(move || -> LauncherResult<_> {
                let classpath = build_classpath(&descriptor)?;
                let variables = LaunchVariables::from_sources(&VariableSources {
                    auth: &auth,
                    settings: &settings,
                    descriptor: &descriptor,
                    minecraft_version: &minecraft_version,
                    instance_path: &instance_path,
                    natives_dir: &natives_dir,
                    classpath: &classpath,
                });
                Ok((descriptor, variables))
            })
            .await
            .map_err(|err| LauncherError::Io {
                path: request.instance_path.clone(),
                source: std::io::Error::other(err),
            })??
        };

        let args = assemble_args(&self.settings, &descriptor, &variables);
        let unresolved = arguments::unresolved_placeholders(&args);
        if !unresolved.is_empty() {
            warn!("Unresolved launch placeholders: {}", unresolved.join(", "));
        }

        Ok(LaunchPlan {
            instance_path: request.instance_path.clone(),
            java,
            args,
            main_class: descriptor.main_class,
            natives_dir,
            auth,
        })
    }

    /// Launch the game as a detached child process.
    ///
    /// Returns once the process is spawned and registered; an exit observer
    /// deregisters it when it terminates.
    pub async fn launch(&self, request: &LaunchRequest) -> LauncherResult<LaunchOutcome> {
        let reservation = self.processes.reserve(&request.instance_path)?;
        let instance_path = request.instance_path.clone();
        transition(&instance_path, LaunchState::Idle, LaunchState::Resolving);

        let plan = match self.plan(request).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!("[{}] launch aborted: {}", instance_label(&instance_path), err);
                transition(&instance_path, LaunchState::Resolving, LaunchState::Idle);
                return Err(err);
            }
        };

        transition(&instance_path, LaunchState::Resolving, LaunchState::Spawning);
        tokio::fs::create_dir_all(&plan.natives_dir)
            .await
            .map_err(|source| LauncherError::Io {
                path: plan.natives_dir.clone(),
                source,
            })?;

        info!("Launching Minecraft with Java: {:?}", plan.java);
        debug!("Command (copy/paste): {}", plan.command_line());

        let mut child = spawn_detached(&plan).map_err(|err| {
            error!("Failed to spawn {:?}: {}", plan.java, err);
            err
        })?;
        let Some(pid) = child.id() else {
            return Err(LauncherError::SpawnFailed(
                "process exited before its pid could be read".into(),
            ));
        };

        reservation.commit(GameProcess {
            pid,
            instance_path: instance_path.clone(),
            start_time: Utc::now(),
            java: plan.java.clone(),
        });
        transition(&instance_path, LaunchState::Spawning, LaunchState::Running);
        info!("Launched {:?} (pid {})", instance_path, pid);

        forward_output(&mut child, &instance_path);

        let processes = self.processes.clone();
        let observed_path = instance_path.clone();
        let exit = tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => {
                    info!(
                        "Minecraft process for {:?} exited with status: {:?}",
                        observed_path,
                        status.code()
                    );
                    status.code()
                }
                Err(err) => {
                    warn!("Lost track of pid {}: {}", pid, err);
                    None
                }
            };
            processes.remove_if_pid(&observed_path, pid);
            transition(&observed_path, LaunchState::Running, LaunchState::Exited);
            code
        });

        Ok(LaunchOutcome {
            pid,
            instance_path,
            java: plan.java,
            main_class: plan.main_class,
            exit,
        })
    }

    /// Wait for the game to exit. If `stop` resolves first, terminate it and
    /// keep waiting for the exit observer.
    pub async fn wait_for_exit<F>(&self, outcome: LaunchOutcome, stop: F) -> Option<i32>
    where
        F: Future<Output = ()>,
    {
        let mut exit = outcome.exit;
        tokio::select! {
            joined = &mut exit => return observed_code(joined),
            _ = stop => {
                info!("Stopping {:?} (pid {})", outcome.instance_path, outcome.pid);
                if !self.processes.kill(&outcome.instance_path) {
                    warn!("Could not signal pid {}", outcome.pid);
                }
                debug!("{} game(s) still registered", self.processes.list().len());
            }
        }
        observed_code(exit.await)
    }
}

fn observed_code(joined: Result<Option<i32>, tokio::task::JoinError>) -> Option<i32> {
    joined.unwrap_or_else(|err| {
        warn!("Exit observer failed: {}", err);
        None
    })
}

pub fn natives_dir(instance_path: &Path) -> PathBuf {
    NATIVES_SUBDIR
        .iter()
        .fold(instance_path.to_path_buf(), |dir, part| dir.join(part))
}

/// `[heap flags, jvm args, main class, game args, legacy args]`.
pub fn assemble_args(
    settings: &LaunchSettings,
    descriptor: &VersionDescriptor,
    variables: &LaunchVariables,
) -> Vec<String> {
    let mut args = settings.heap_flags();

    if descriptor.has_jvm_template() {
        args.extend(arguments::expand(&descriptor.jvm_args, variables));
    } else {
        args.extend(arguments::expand(&arguments::default_jvm_template(), variables));
    }

    args.push(descriptor.main_class.clone());
    args.extend(arguments::expand(&descriptor.game_args, variables));

    if let Some(legacy) = &descriptor.legacy_arguments {
        args.extend(arguments::expand(&arguments::legacy_tokens(legacy), variables));
    }
    args
}

fn spawn_detached(plan: &LaunchPlan) -> LauncherResult<tokio::process::Child> {
    let mut cmd = std::process::Command::new(&plan.java);
    cmd.args(&plan.args);
    cmd.current_dir(&plan.instance_path);
    configure_native_library_env(&mut cmd, &plan.natives_dir);
    configure_platform_spawn(&mut cmd);

    let mut cmd = tokio::process::Command::from(cmd);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    cmd.spawn()
        .map_err(|e| LauncherError::SpawnFailed(format!("{:?}: {}", plan.java, e)))
}

fn forward_output(child: &mut tokio::process::Child, instance_path: &Path) {
    if let Some(stdout) = child.stdout.take() {
        let label = instance_label(instance_path);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!("[mc:{}][stdout] {}", label, line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let label = instance_label(instance_path);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!("[mc:{}][stderr] {}", label, line);
            }
        });
    }
}

fn instance_label(instance_path: &Path) -> String {
    instance_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| instance_path.to_string_lossy().to_string())
}

fn configure_native_library_env(cmd: &mut std::process::Command, natives_dir: &Path) {
    let native_path = safe_path_str(natives_dir);

    if cfg!(target_os = "windows") {
        cmd.env("PATH", append_env_path("PATH", &native_path));
    } else if cfg!(target_os = "linux") {
        cmd.env(
            "LD_LIBRARY_PATH",
            append_env_path("LD_LIBRARY_PATH", &native_path),
        );
    } else if cfg!(target_os = "macos") {
        cmd.env(
            "DYLD_LIBRARY_PATH",
            append_env_path("DYLD_LIBRARY_PATH", &native_path),
        );
    }
}

fn configure_platform_spawn(cmd: &mut std::process::Command) {
    #[cfg(unix)]
    {
        cmd.process_group(0);
    }

    #[cfg(target_os = "windows")]
    {
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);

        // Terminal session vars make LWJGL treat the game as a console app.
        cmd.env_remove("WT_SESSION");
        cmd.env_remove("TERM");
        cmd.env_remove("ConEmuANSI");
    }
}

fn append_env_path(var_name: &str, value: &str) -> String {
    let separator = if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    };
    match std::env::var(var_name) {
        Ok(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, separator, existing)
        }
        _ => value.to_string(),
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
