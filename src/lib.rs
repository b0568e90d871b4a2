//! # FastIBS
//!
//! Alignment-free similarity between a pre-built k-mer index and reference
//! sequences. Canonical k-mers of each reference are looked up in the index
//! and runs of absent k-mers are summarised per window.
//!
//! This crate provides both a library and a binary.
//!
#![doc = include_str!("../README.md")]

pub mod error;
pub mod fastx;
pub mod index;
pub mod index_format;
pub mod index_info;
pub mod intersect;
pub mod kmer;
pub mod mapping;
pub mod output;
pub mod stats;
pub mod tasks;
pub mod window;

// Re-export the important structures and functions for library users
pub use error::{Error, Result};
pub use fastx::{read_sequences, SequenceFormat, SequenceRecord};
pub use index::{KmerIndex, KmerLister, KmerListing, KmerLookup, info as index_info};
pub use index_format::IndexHeader;
pub use intersect::{intersect_paths, run_intersect};
pub use mapping::{run_mapping, SequenceCoverage};
pub use stats::{run_stats, StatsSummary, WindowStats};
pub use tasks::TaskRunner;
pub use window::{chunk_sequences, Window};

use std::path::{Path, PathBuf};

pub const DEFAULT_WINDOW_SIZE: usize = 50_000;

/// Configuration for windowed statistics
pub struct StatsConfig {
    /// K-mer index file path
    pub index_path: PathBuf,

    /// Path to reference fastx file (optionally gzipped)
    pub sequences_path: PathBuf,

    /// Window size in bases; must exceed the index's k
    pub window_size: usize,

    /// Path to output TSV (None for stdout)
    pub output_path: Option<PathBuf>,

    /// Number of execution threads (0 = auto)
    pub threads: usize,

    /// Path to JSON summary file
    pub summary_path: Option<PathBuf>,

    /// Suppress progress reporting
    pub quiet: bool,
}

impl StatsConfig {
    /// Create a new stats configuration for an index and reference file
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(index_path: P, sequences_path: Q) -> Self {
        Self {
            index_path: index_path.as_ref().to_path_buf(),
            sequences_path: sequences_path.as_ref().to_path_buf(),
            window_size: DEFAULT_WINDOW_SIZE,
            output_path: None,
            threads: 0,
            summary_path: None,
            quiet: false,
        }
    }

    /// Set window size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set output path
    pub fn with_output<P: AsRef<Path>>(mut self, output_path: P) -> Self {
        self.output_path = Some(output_path.as_ref().to_path_buf());
        self
    }

    /// Set the num threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the summary path
    pub fn with_summary<P: AsRef<Path>>(mut self, summary_path: P) -> Self {
        self.summary_path = Some(summary_path.as_ref().to_path_buf());
        self
    }

    /// Set quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Execute the stats computation with this configuration
    pub fn execute(&self) -> Result<StatsSummary> {
        stats::run_stats(self)
    }
}

/// Configuration for per-base coverage mapping
pub struct MapConfig {
    /// K-mer index file path
    pub index_path: PathBuf,

    /// Path to reference fastx file (optionally gzipped)
    pub sequences_path: PathBuf,

    /// Path to output file (None for stdout)
    pub output_path: Option<PathBuf>,

    /// Number of execution threads (0 = auto)
    pub threads: usize,

    /// Suppress progress reporting
    pub quiet: bool,
}

impl MapConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(index_path: P, sequences_path: Q) -> Self {
        Self {
            index_path: index_path.as_ref().to_path_buf(),
            sequences_path: sequences_path.as_ref().to_path_buf(),
            output_path: None,
            threads: 0,
            quiet: false,
        }
    }

    pub fn with_output<P: AsRef<Path>>(mut self, output_path: P) -> Self {
        self.output_path = Some(output_path.as_ref().to_path_buf());
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn execute(&self) -> Result<()> {
        mapping::run_mapping(self)
    }
}

/// Configuration for counting the k-mers shared by two indexes
pub struct IntersectConfig {
    pub index_a_path: PathBuf,
    pub index_b_path: PathBuf,

    /// Suppress progress reporting
    pub quiet: bool,
}

impl IntersectConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(index_a_path: P, index_b_path: Q) -> Self {
        Self {
            index_a_path: index_a_path.as_ref().to_path_buf(),
            index_b_path: index_b_path.as_ref().to_path_buf(),
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print the number of shared k-mers to stdout and return it
    pub fn execute(&self) -> Result<u64> {
        intersect::run_intersect(self)
    }
}
