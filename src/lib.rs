pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::instance::{LaunchRequest, LauncherKind};
pub use crate::core::launch::{Launcher, ProcessRegistry};
pub use crate::core::state::LaunchSettings;

/// Initialize structured logging; `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,instance_launch_lib=debug")),
        )
        .init();
}
