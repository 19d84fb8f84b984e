pub mod paths;
pub mod settings;

pub use paths::LauncherDirs;
pub use settings::LaunchSettings;
