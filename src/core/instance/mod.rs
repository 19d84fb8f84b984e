pub mod model;

pub use model::{LaunchRequest, LauncherKind, LoaderInfo, LoaderType};
