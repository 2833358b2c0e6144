use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::{DEFAULT_DETAIL_COMPANY, DEFAULT_LOOKBACK_DAYS};

#[derive(Parser)]
#[command(name = "automaker-stocks")]
#[command(about = "Share-price dashboard for Japanese automakers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard server
    Serve {
        /// Port to listen on (default: PORT env var or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the closing-price table of the last N days
    Overview {
        /// Lookback window in days (1-365)
        #[arg(short, long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        days: u16,

        /// Company to include (repeatable, default: all)
        #[arg(short, long = "company")]
        companies: Vec<String>,

        /// Print the long (Date, Name, price) table as CSV instead
        #[arg(long)]
        csv: bool,
    },
    /// Print 6 months of daily bars with the moving average for one company
    Detail {
        /// Company name, e.g. TOYOTA
        #[arg(short, long, default_value = DEFAULT_DETAIL_COMPANY)]
        company: String,
    },
}

pub fn run() {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port);
        }
        Commands::Overview { days, companies, csv } => {
            commands::overview::run(days, companies, csv);
        }
        Commands::Detail { company } => {
            commands::detail::run(company);
        }
    }
}

/// Log to stderr so table output on stdout stays clean
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
