use std::path::PathBuf;

use carculator::{init_logging, render};
use carculator_core::{DEFAULT_ITERATIONS, VehicleInputParameters, load_parameters};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "carculator")]
#[command(about = "Evaluate vehicle input parameters statically or by Monte Carlo sampling")]
struct Args {
    /// Default-parameter table (JSON or YAML)
    table: PathBuf,

    /// File holding a list of extra parameter names (JSON or YAML)
    #[arg(short, long)]
    extra: Option<PathBuf>,

    /// Resolve point estimates instead of sampling
    #[arg(long = "static")]
    static_only: bool,

    /// Number of Monte Carlo iterations
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Seed for reproducible sampling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to the data directory holding the log (default: ~/.carculator/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".carculator")
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let table = load_parameters(args.table.clone())?;
    let extra = match args.extra {
        Some(path) => load_parameters(path)?,
        None => serde_json::Value::Array(Vec::new()),
    };
    let mut catalog = VehicleInputParameters::from_value(table, extra)?;

    if args.static_only {
        catalog.static_values()?;
    } else if let Some(seed) = args.seed {
        catalog.stochastic_with_seed(args.iterations, seed)?;
    } else {
        catalog.stochastic(args.iterations)?;
    }
    tracing::info!(
        table = %args.table.display(),
        evaluated = catalog.values().len(),
        "evaluation finished"
    );

    print!("{}", render(&catalog));
    Ok(())
}
