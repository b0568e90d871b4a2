use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fastibs::{IntersectConfig, MapConfig, StatsConfig, DEFAULT_WINDOW_SIZE};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Alignment-free sequence similarity against pre-built k-mer indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Windowed k-mer presence, variation and distance statistics (TSV)
    Stats {
        /// Path to k-mer index file
        index: PathBuf,

        /// Path to fasta/fastq file of reference sequences (optionally gzipped)
        sequences: PathBuf,

        /// Window size in bases (must exceed the index's k)
        #[arg(short = 'w', long = "window-size", default_value_t = DEFAULT_WINDOW_SIZE)]
        window_size: usize,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,

        /// Number of execution threads (0 = auto)
        #[arg(short = 't', long = "threads", default_value_t = 0)]
        threads: usize,

        /// Path to JSON summary file
        #[arg(short = 's', long = "summary")]
        summary: Option<PathBuf>,

        /// Suppress progress reporting
        #[arg(short = 'q', long = "quiet", default_value_t = false)]
        quiet: bool,
    },
    /// Per-base coverage of each sequence by indexed k-mers
    Map {
        /// Path to k-mer index file
        index: PathBuf,

        /// Path to fasta/fastq file of reference sequences (optionally gzipped)
        sequences: PathBuf,

        /// Path to output file (- for stdout)
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,

        /// Number of execution threads (0 = auto)
        #[arg(short = 't', long = "threads", default_value_t = 0)]
        threads: usize,

        /// Suppress progress reporting
        #[arg(short = 'q', long = "quiet", default_value_t = false)]
        quiet: bool,
    },
    /// Count k-mers shared by two indexes
    Intersect {
        /// Path to first k-mer index file
        index_a: PathBuf,

        /// Path to second k-mer index file
        index_b: PathBuf,

        /// Suppress progress reporting
        #[arg(short = 'q', long = "quiet", default_value_t = false)]
        quiet: bool,
    },
    /// Index commands
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
}

#[derive(Subcommand)]
enum IndexCommands {
    /// Show index information
    Info {
        /// Path to index file
        index: PathBuf,
    },
}

fn output_path(output: &str) -> Option<PathBuf> {
    if output == "-" {
        None
    } else {
        Some(PathBuf::from(output))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Stats {
            index,
            sequences,
            window_size,
            output,
            threads,
            summary,
            quiet,
        } => {
            let mut config = StatsConfig::new(index, sequences)
                .with_window_size(*window_size)
                .with_threads(*threads)
                .with_quiet(*quiet);
            config.output_path = output_path(output);
            config.summary_path = summary.clone();

            config
                .execute()
                .context("Failed to compute window statistics")?;
        }
        Commands::Map {
            index,
            sequences,
            output,
            threads,
            quiet,
        } => {
            let mut config = MapConfig::new(index, sequences)
                .with_threads(*threads)
                .with_quiet(*quiet);
            config.output_path = output_path(output);

            config.execute().context("Failed to map coverage")?;
        }
        Commands::Intersect {
            index_a,
            index_b,
            quiet,
        } => {
            IntersectConfig::new(index_a, index_b)
                .with_quiet(*quiet)
                .execute()
                .context("Failed to intersect indexes")?;
        }
        Commands::Index { command } => match command {
            IndexCommands::Info { index } => {
                fastibs::index_info(index).context("Failed to run index info command")?;
            }
        },
    }

    Ok(())
}
