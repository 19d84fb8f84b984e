// ─── Instance Launch Core ───
// Resolves how to start an instance created by a third-party launcher and
// supervises the game process.
//
// Architecture:
//   core/
//     instance/   — Launcher kinds + launch request model
//     version/    — Version descriptors, merge rules, OS rules
//     maven/      — Maven coordinate parser
//     auth/       — Account store readers + offline identity
//     java/       — Bundled and system Java lookup
//     launchers/  — Per-launcher readers behind one registry
//     launch/     — Classpath, argument expansion, spawn, process registry
//     state/      — Launch settings + launcher directories

pub mod auth;
pub mod error;
pub mod instance;
pub mod java;
pub mod launch;
pub mod launchers;
pub mod maven;
pub mod state;
pub mod version;
