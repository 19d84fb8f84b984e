pub mod arguments;
pub mod classpath;
pub mod registry;
pub mod task;

pub use arguments::{expand, unresolved_placeholders, LaunchVariables};
pub use classpath::build_classpath;
pub use registry::{GameProcess, LaunchReservation, ProcessRegistry};
pub use task::{LaunchOutcome, LaunchPlan, LaunchState, Launcher};
