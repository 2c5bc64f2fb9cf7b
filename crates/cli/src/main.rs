use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(
    name = "tabula",
    version,
    about = "Turn bank and card statement CSV exports into ledger entries."
)]
struct Cli {
    /// Log more: -v info, -vv debug, -vvv trace. RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract transactions and a closing balance from statements.
    Extract {
        /// Importer config (TOML)
        #[arg(long, short)]
        config: PathBuf,
        /// Categorization rules (TOML, `[[rules]]` tables)
        #[arg(long)]
        rules: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Beancount)]
        format: OutputFormat,
        /// Statement files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Report which statements the config can read.
    Identify {
        #[arg(long, short)]
        config: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the latest settlement date of each statement.
    FileDate {
        #[arg(long, short)]
        config: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Extract {
            config,
            rules,
            format,
            files,
        } => {
            let importer = commands::load_importer(&config, rules.as_deref())?;
            commands::extract(&importer, &files, format, out)
        }
        Commands::Identify { config, files } => {
            let importer = commands::load_importer(&config, None)?;
            commands::identify(&importer, &files, out)
        }
        Commands::FileDate { config, files } => {
            let importer = commands::load_importer(&config, None)?;
            commands::file_date(&importer, &files, out)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(cli.command, &mut out) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
