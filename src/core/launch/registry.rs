// ─── Process Registry ───
// Process-wide map from instance path to the game running from it.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// A running game owned by the registry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProcess {
    pub pid: u32,
    pub instance_path: PathBuf,
    pub start_time: DateTime<Utc>,
    pub java: PathBuf,
}

#[derive(Debug, Default)]
struct RegistryState {
    running: HashMap<PathBuf, GameProcess>,
    launching: HashSet<PathBuf>,
}

/// At most one game per instance path. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    state: Arc<Mutex<RegistryState>>,
}

static GLOBAL: OnceLock<ProcessRegistry> = OnceLock::new();

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every launch in this process.
    pub fn global() -> &'static ProcessRegistry {
        GLOBAL.get_or_init(ProcessRegistry::new)
    }

    pub fn is_running(&self, instance_path: &Path) -> bool {
        self.state.lock().running.contains_key(instance_path)
    }

    pub fn get(&self, instance_path: &Path) -> Option<GameProcess> {
        self.state.lock().running.get(instance_path).cloned()
    }

    pub fn list(&self) -> Vec<GameProcess> {
        let mut processes: Vec<GameProcess> =
            self.state.lock().running.values().cloned().collect();
        processes.sort_by_key(|p| p.start_time);
        processes
    }

    /// Claim `instance_path` for a launch that is about to resolve.
    ///
    /// Fails when a game is running from it or another launch holds it.
    pub fn reserve(&self, instance_path: &Path) -> LauncherResult<LaunchReservation> {
        let mut state = self.state.lock();
        if state.running.contains_key(instance_path) || state.launching.contains(instance_path) {
            return Err(LauncherError::AlreadyRunning(instance_path.to_path_buf()));
        }
        state.launching.insert(instance_path.to_path_buf());
        Ok(LaunchReservation {
            registry: self.clone(),
            instance_path: instance_path.to_path_buf(),
        })
    }

    /// Remove the entry for `instance_path` only if it still belongs to `pid`.
    pub fn remove_if_pid(&self, instance_path: &Path, pid: u32) -> bool {
        let mut state = self.state.lock();
        match state.running.get(instance_path) {
            Some(process) if process.pid == pid => {
                state.running.remove(instance_path);
                debug!("Deregistered pid {} for {:?}", pid, instance_path);
                true
            }
            _ => false,
        }
    }

    /// Ask the game to stop. The entry is removed once the signal was sent.
    pub fn kill(&self, instance_path: &Path) -> bool {
        let Some(process) = self.get(instance_path) else {
            return false;
        };

        match send_terminate(process.pid) {
            Ok(()) => {
                self.remove_if_pid(instance_path, process.pid);
                info!("Sent terminate to pid {} ({:?})", process.pid, instance_path);
                true
            }
            Err(err) => {
                warn!("Could not signal pid {}: {}", process.pid, err);
                false
            }
        }
    }
}

/// Holds an instance path while its launch resolves; released on drop.
#[derive(Debug)]
pub struct LaunchReservation {
    registry: ProcessRegistry,
    instance_path: PathBuf,
}

impl LaunchReservation {
    pub fn instance_path(&self) -> &Path {
        &self.instance_path
    }

    /// Turn the reservation into a running entry.
    pub fn commit(self, process: GameProcess) {
        let mut state = self.registry.state.lock();
        state.running.insert(self.instance_path.clone(), process);
    }
}

impl Drop for LaunchReservation {
    fn drop(&mut self) {
        self.registry.state.lock().launching.remove(&self.instance_path);
    }
}

fn send_terminate(pid: u32) -> Result<(), String> {
    #[cfg(target_os = "windows")]
    let status = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/T"])
        .status();

    #[cfg(not(target_os = "windows"))]
    let status = Command::new("kill").args(["-15", &pid.to_string()]).status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(format!("signal command exited with {:?}", status.code())),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(pid: u32, path: &str) -> GameProcess {
        GameProcess {
            pid,
            instance_path: PathBuf::from(path),
            start_time: Utc::now(),
            java: PathBuf::from("/usr/bin/java"),
        }
    }

    #[test]
    fn reservation_blocks_a_second_launch() {
        let registry = ProcessRegistry::new();
        let path = Path::new("/instances/a");

        let reservation = registry.reserve(path).unwrap();
        assert!(matches!(
            registry.reserve(path),
            Err(LauncherError::AlreadyRunning(_))
        ));
        assert!(!registry.is_running(path));

        drop(reservation);
        assert!(registry.reserve(path).is_ok());
    }

    #[test]
    fn committed_process_is_running_until_removed() {
        let registry = ProcessRegistry::new();
        let path = Path::new("/instances/a");

        registry.reserve(path).unwrap().commit(process(42, "/instances/a"));
        assert!(registry.is_running(path));
        assert_eq!(registry.list().len(), 1);
        assert!(matches!(
            registry.reserve(path),
            Err(LauncherError::AlreadyRunning(_))
        ));

        assert!(!registry.remove_if_pid(path, 7));
        assert!(registry.is_running(path));
        assert!(registry.remove_if_pid(path, 42));
        assert!(!registry.is_running(path));
    }

    #[test]
    fn kill_of_unknown_path_is_false() {
        let registry = ProcessRegistry::new();
        assert!(!registry.kill(Path::new("/instances/none")));
    }

    #[cfg(unix)]
    #[test]
    fn kill_terminates_and_deregisters() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let registry = ProcessRegistry::new();
        let path = Path::new("/instances/sleepy");
        registry
            .reserve(path)
            .unwrap()
            .commit(process(child.id(), "/instances/sleepy"));

        assert!(registry.kill(path));
        assert!(!registry.is_running(path));
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[cfg(unix)]
    #[test]
    fn failed_signal_keeps_the_entry() {
        // Above any kernel pid_max, and still positive as a pid_t.
        let pid = i32::MAX as u32;

        let registry = ProcessRegistry::new();
        let path = Path::new("/instances/gone");
        registry.reserve(path).unwrap().commit(process(pid, "/instances/gone"));

        assert!(!registry.kill(path));
        assert!(registry.is_running(path));
    }
}
