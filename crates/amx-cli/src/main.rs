//! AMX host CLI
//!
//! Inspects Pawn program images, runs the machine initializer with the
//! standard libraries and calls natives from the command line.
//!
//! Set `AMX_LOG` (e.g. `AMX_LOG=debug`) to see initializer stages.

mod commands;

use amx_engine::InitPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "amx")]
#[command(about = "Pawn abstract machine host tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header and symbol tables of a program image
    Info {
        /// Program image (.amx)
        image: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Initialize a machine and report every stage
    Init {
        /// Program image (.amx)
        image: PathBuf,
        /// How library failures count (overrides the config file)
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,
        /// Runtime options file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Initialize a machine and call one native
    Call {
        /// Program image (.amx)
        image: PathBuf,
        /// Native function name
        native: String,
        /// Arguments: integers are passed as cells, anything else as a string
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
        /// Runtime options file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Only the machine status counts
    Ignore,
    /// Fail with the first library error
    Strict,
    /// Fail if any native is left unbound
    Bound,
}

impl From<PolicyArg> for InitPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Ignore => InitPolicy::IgnoreLibraryFailures,
            PolicyArg::Strict => InitPolicy::FailOnLibraryError,
            PolicyArg::Bound => InitPolicy::RequireAllNativesBound,
        }
    }
}

/// Log to stderr, filtered by `AMX_LOG` (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_env("AMX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { image, json } => commands::info::execute(&image, json),
        Commands::Init {
            image,
            policy,
            config,
            json,
        } => commands::init::execute(&image, policy.map(Into::into), config.as_deref(), json),
        Commands::Call {
            image,
            native,
            args,
            config,
        } => commands::call::execute(&image, &native, &args, config.as_deref()),
    }
}
