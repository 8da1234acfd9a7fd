use clap::{Parser, Subcommand};
use stackcheck::console::commands::{CallableTrait, ProfileCommand, StatusCommand};
use stackcheck::health::RunOptions;
use stackcheck::telemetry::{get_subscriber, init_subscriber, LogLevelControl};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stackcheck", version, about = "Health checks for a profile's services")]
struct Cli {
    /// Log at debug level on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file. Without it, `configuration` in the working directory is read with any supported extension (.yaml, .toml, .json, ...)
    #[arg(long, env = "STACKCHECK_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check the profile, repository, database and optional services
    Status {
        /// Also check the message broker
        #[arg(long)]
        rabbitmq: bool,
        /// Also check the daemon (implies --rabbitmq)
        #[arg(long)]
        daemon: bool,
        /// Profile to check instead of the default one
        #[arg(long, env = "STACKCHECK_PROFILE")]
        profile: Option<String>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the resolved profile
    Profile {
        #[arg(long, env = "STACKCHECK_PROFILE")]
        profile: Option<String>,
    },
}

fn main() {
    // before parsing, so `.env` can supply the clap env fallbacks too
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "error" };
    let (subscriber, log) = get_subscriber("stackcheck".into(), level.into());
    let log = match init_subscriber(subscriber) {
        Ok(()) => log,
        Err(e) => {
            eprintln!("Warning: {e:#}");
            LogLevelControl::disabled()
        }
    };

    let code = match get_command(cli, log).call() {
        Ok(exit_code) => exit_code.code(),
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

fn get_command(cli: Cli, log: LogLevelControl) -> Box<dyn CallableTrait> {
    match cli.command {
        Commands::Status {
            rabbitmq,
            daemon,
            profile,
            json,
        } => Box::new(StatusCommand::new(
            cli.config,
            profile,
            RunOptions::new(rabbitmq, daemon),
            json,
            log,
        )),
        Commands::Profile { profile } => Box::new(ProfileCommand::new(cli.config, profile)),
    }
}
