use clap::{Args, Parser, Subcommand};
use reach_rs::config::OutputFormat;
use std::path::PathBuf;

/// Cross-section hydraulics, rating curves and single-reach storage routing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where a cross-section comes from: a CSV file or a project store node.
#[derive(Args, Debug, Clone)]
pub struct ProfileSource {
    /// CSV file with `width,elevation` columns
    #[arg(long, conflicts_with = "db")]
    pub profile: Option<PathBuf>,

    /// SQLite project store
    #[arg(long, requires_all = ["project", "node"])]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub node: Option<String>,

    /// Manning n, overrides the stored value
    #[arg(short = 'n', long)]
    pub manning_n: Option<f64>,

    /// Reference water level, overrides the stored value
    #[arg(long, allow_hyphen_values = true)]
    pub water_level: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wetted area, top width and perimeter at one water level
    Geometry {
        #[command(flatten)]
        source: ProfileSource,

        /// Water level (elevation)
        #[arg(long, allow_hyphen_values = true)]
        level: f64,
    },

    /// Manning rating curve from invert to bankfull
    Rating {
        #[command(flatten)]
        source: ProfileSource,

        /// Bed slope S0
        #[arg(long, default_value_t = reach_rs::config::DEFAULT_BED_SLOPE)]
        slope: f64,

        #[arg(long, default_value_t = reach_rs::config::DEFAULT_RATING_SAMPLES)]
        samples: usize,

        /// Write the table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store the bankfull sample as the node's design point (store only)
        #[arg(long, requires = "db")]
        save_design: bool,
    },

    /// Run one reach simulation
    Simulate {
        #[command(flatten)]
        source: ProfileSource,

        /// Simulation config (TOML); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, default_value = "simulation_results.csv")]
        output: PathBuf,
    },

    /// Simulate every node of a project in parallel
    Batch {
        db: PathBuf,

        project: String,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Sqlite)]
        format: OutputFormat,

        /// Directory for per-node CSV files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

pub fn get_args() -> Cli {
    Cli::parse()
}
