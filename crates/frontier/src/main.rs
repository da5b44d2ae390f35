use std::path::PathBuf;

use clap::{Parser, Subcommand};
use frontier::config::Overrides;
use frontier::data::OutputDirectory;
use frontier::{RunRequest, execute, init_logging};

#[derive(Parser, Debug)]
#[command(name = "frontier")]
#[command(about = "Monte Carlo efficient-frontier estimation with swarm refinement")]
struct Args {
    /// Path to the data directory (default: ~/.frontier/)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate, select and refine an allocation from a price CSV
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Price CSV: `Date,<asset>...` with ISO dates, empty cell = missing
    #[arg(long)]
    prices: PathBuf,

    /// YAML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of random portfolios
    #[arg(long)]
    trials: Option<usize>,

    /// Annual risk-free rate in percent
    #[arg(long, allow_hyphen_values = true)]
    risk_free_rate: Option<f64>,

    /// Annualized volatility ceiling; minimum variance seeds the swarm when omitted
    #[arg(long)]
    risk_ceiling: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory (default: <data_dir>/runs/<timestamp>)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(OutputDirectory::default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    match args.command {
        Command::Run(run) => {
            let output = match run.out {
                Some(dir) => OutputDirectory::new(dir),
                None => OutputDirectory::timestamped(&data_dir),
            };
            let request = RunRequest {
                prices: run.prices,
                config: run.config,
                overrides: Overrides {
                    trials: run.trials,
                    risk_free_rate_pct: run.risk_free_rate,
                    risk_ceiling: run.risk_ceiling,
                    seed: run.seed,
                },
                output,
            };

            let outcome = execute(&request)?;
            let allocation = &outcome.allocation;

            println!("{:<12} {:>8}", "asset", "weight");
            for w in &allocation.weights {
                println!("{:<12} {:>7.2}%", w.asset, w.weight * 100.0);
            }
            println!();
            println!("expected return (daily) {:.6}", allocation.metrics.expected_return);
            println!("volatility (annual)     {:.4}", allocation.metrics.volatility);
            println!("sharpe ratio            {:.4}", allocation.metrics.sharpe_ratio);
            println!("risk ceiling            {:.4}", allocation.risk_ceiling);
            println!();
            println!("wrote {}", outcome.simulation_path.display());
            println!("wrote {}", outcome.allocation_path.display());
        }
    }

    tracing::info!("frontier shutting down");
    Ok(())
}
