//! buildspec CLI tool.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "buildspec")]
#[command(about = "Resolve build descriptors into per-variant configurations", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "BUILDSPEC_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a build descriptor without resolving it
    Validate {
        /// Path to the descriptor
        #[arg(default_value = "build.kdl")]
        path: String,
    },
    /// Resolve every build type of a descriptor
    Resolve(commands::resolve::ResolveArgs),
}

/// Filter used when `RUST_LOG` is unset. Logs go to stderr.
const DEFAULT_LOG_FILTER: &str = "warn";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
        Commands::Resolve(args) => {
            if !commands::resolve::run(&args)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
