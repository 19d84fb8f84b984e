use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;

use instance_launch_lib::commands;
use instance_launch_lib::core::instance::{LaunchRequest, LauncherKind, LoaderInfo};
use instance_launch_lib::{LaunchSettings, Launcher, LauncherError, LauncherResult};

#[derive(Parser, Debug)]
#[clap(
    name = "instance-launch",
    about = "Launch Minecraft instances created by third-party launchers",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Launch settings file (defaults to the per-user config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Spawn the game for an instance
    Launch {
        #[clap(flatten)]
        target: Target,

        /// Keep running until the game exits; Ctrl-C stops the game
        #[clap(long)]
        wait: bool,
    },
    /// Print the Java runtime that would be used
    Java {
        #[clap(long)]
        launcher: LauncherKind,

        #[clap(long = "mc")]
        minecraft_version: String,
    },
    /// Print the full command line without spawning
    Command {
        #[clap(flatten)]
        target: Target,
    },
    /// Print the player identity that would be used
    Auth {
        #[clap(long)]
        launcher: LauncherKind,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// JSON hand-off written by the instance detector
    #[clap(long, conflicts_with_all = ["instance", "launcher", "minecraft_version", "loader"])]
    request: Option<PathBuf>,

    /// Instance directory
    #[clap(long, required_unless_present = "request")]
    instance: Option<PathBuf>,

    #[clap(long, required_unless_present = "request")]
    launcher: Option<LauncherKind>,

    #[clap(long = "mc", required_unless_present = "request")]
    minecraft_version: Option<String>,

    /// Mod loader as `<type>:<version>`, e.g. `fabric:0.15.7`
    #[clap(long)]
    loader: Option<LoaderInfo>,
}

impl Target {
    fn into_request(self) -> LauncherResult<LaunchRequest> {
        if let Some(path) = self.request {
            return commands::load_request(&path);
        }
        match (self.instance, self.launcher, self.minecraft_version) {
            (Some(instance), Some(launcher), Some(minecraft_version)) => Ok(
                commands::build_request(instance, minecraft_version, self.loader, launcher),
            ),
            _ => Err(LauncherError::IncompleteRequest(
                "missing --instance, --launcher or --mc".into(),
            )),
        }
    }
}

async fn run(cli: Cli) -> LauncherResult<()> {
    let settings = LaunchSettings::load(cli.config.as_deref())?;
    let launcher = Launcher::new(settings);

    match cli.command {
        Command::Launch { target, wait } => {
            let request = target.into_request()?;
            commands::launch_instance(&launcher, &request, wait).await
        }
        Command::Java {
            launcher: kind,
            minecraft_version,
        } => commands::print_java(&launcher, kind, &minecraft_version).await,
        Command::Command { target } => {
            let request = target.into_request()?;
            commands::print_command(&launcher, &request).await
        }
        Command::Auth { launcher: kind } => commands::print_auth(&launcher, kind).await,
    }
}

fn main() -> ExitCode {
    instance_launch_lib::init_logging();
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Cannot start the async runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
