use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-sheets")]
#[command(about = "Fetch product-catalog API responses and transcribe them into a workbook")]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "catalog-config.toml", global = true)]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Override the monitoring setting from the config (`--monitor` or
    /// `--monitor=false`)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub monitor: Option<bool>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Query every endpoint and store the raw JSON responses
    Fetch {
        /// Show the requests without sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Transcribe stored responses into the workbook
    Transcribe {
        /// Show the sheet layout plan without touching the workbook
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch, then transcribe
    Run {
        /// Show the whole plan without network or file writes
        #[arg(long)]
        dry_run: bool,
    },
}

impl Command {
    pub fn dry_run(&self) -> bool {
        match self {
            Command::Fetch { dry_run }
            | Command::Transcribe { dry_run }
            | Command::Run { dry_run } => *dry_run,
        }
    }

    pub fn fetches(&self) -> bool {
        matches!(self, Command::Fetch { .. } | Command::Run { .. })
    }

    pub fn transcribes(&self) -> bool {
        matches!(self, Command::Transcribe { .. } | Command::Run { .. })
    }
}
