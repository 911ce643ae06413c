use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use checks::Phase;
use checks::config::Config;
use checks::format::OutputFormat;
use checks::registry::CheckRegistry;

mod commands;
mod telemetry;

/// Upgrade-test checks, rendered as testdrive scripts
///
/// Each check declares an initialize script, one or more manipulate scripts
/// and a validate script. An orchestrator runs initialize on the oldest
/// version, each manipulate step after successive upgrades, and validate
/// on the final version. This tool prints and exports those scripts; it
/// never connects to a database.
///
/// QUICK START:
///
///   checks list
///   checks show rename-table --phase manipulate --step 2
///   checks plan rename-table --format json
///   checks export --out target/checks
#[derive(Parser)]
#[command(name = "checks")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'checks <command> --help' for more information on a specific command.")]
struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(long, global = true, env = "CHECKS_CONFIG", default_value = "checks.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered checks
    List {
        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print a check's scripts
    ///
    /// Without --phase, prints every script in execution order.
    Show {
        /// Check name
        name: String,

        /// Only print this phase
        #[arg(long, value_enum)]
        phase: Option<PhaseArg>,

        /// Only print this 1-based step of the phase
        #[arg(long, requires = "phase")]
        step: Option<usize>,
    },

    /// Print the ordered execution plan of a check
    Plan {
        /// Check name
        name: String,

        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Write one .td file per step into <out>/<check>/
    ///
    /// With no names, exports the checks selected in the configuration.
    Export {
        /// Checks to export
        names: Vec<String>,

        /// Output directory (defaults to the configured export dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    Initialize,
    Manipulate,
    Validate,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Initialize => Self::Initialize,
            PhaseArg::Manipulate => Self::Manipulate,
            PhaseArg::Validate => Self::Validate,
        }
    }
}

fn main() -> Result<()> {
    let _telemetry = telemetry::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List { format } => {
            let (config, registry) = load(&cli.config)?;
            commands::list(&registry, OutputFormat::resolve(format, config.output.format))
        }
        Commands::Show { name, phase, step } => {
            let (_, registry) = load(&cli.config)?;
            commands::show(&registry, &name, phase.map(Phase::from), step)
        }
        Commands::Plan { name, format } => {
            let (config, registry) = load(&cli.config)?;
            commands::plan(
                &registry,
                &name,
                OutputFormat::resolve(format, config.output.format),
            )
        }
        Commands::Export { names, out } => {
            let (config, registry) = load(&cli.config)?;
            commands::export(&registry, &config, &names, out)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "checks", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the configuration and build the registry of built-in checks.
fn load(config_path: &Path) -> Result<(Config, CheckRegistry)> {
    let config = Config::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let registry = checks::all_checks::registry().context("Built-in checks are malformed")?;
    Ok((config, registry))
}
