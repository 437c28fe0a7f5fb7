use clap::{Parser, Subcommand};

mod commands;

use commands::{AnalyzeArgs, FetchDataArgs, FillRateArgs, TrendArgs};

#[derive(Parser)]
#[command(name = "tank-recon")]
#[command(about = "Reconcile tank-level telemetry against transport tickets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the drain/ticket reconciliation over a date range
    Analyze(AnalyzeArgs),
    /// Fetch level readings and store them as a CSV snapshot
    FetchData(FetchDataArgs),
    /// Summarize per-vessel net fill rates and time to capacity
    FillRate(FillRateArgs),
    /// Detect persistent long-term trend changes for one vessel
    Trend(TrendArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args).await?,
        Commands::FetchData(args) => commands::fetch_data::run(args).await?,
        Commands::FillRate(args) => commands::fill_rate::run(args).await?,
        Commands::Trend(args) => commands::trend::run(args).await?,
    }

    Ok(())
}
