use crate::error::Result;
use crate::index::KmerIndex;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Summary of an index file
#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub format_version: u8,
    pub kmer_length: usize,
    pub distinct_kmers: usize,
    pub file_bytes: u64,
}

/// Load an index and describe it
pub fn describe<P: AsRef<Path>>(index_path: P) -> Result<IndexInfo> {
    let index = KmerIndex::load(&index_path)?;
    let file_bytes = std::fs::metadata(index_path.as_ref())?.len();
    Ok(IndexInfo {
        format_version: index.header().format_version,
        kmer_length: index.header().kmer_length(),
        distinct_kmers: index.len(),
        file_bytes,
    })
}

/// Show info about an index
pub fn info<P: AsRef<Path>>(index_path: P) -> Result<()> {
    let start_time = Instant::now();

    let info = describe(&index_path)?;

    eprintln!("Index information:");
    eprintln!("  Format version: {}", info.format_version);
    eprintln!("  K-mer length (k): {}", info.kmer_length);
    eprintln!("  Distinct k-mer count: {}", info.distinct_kmers);
    eprintln!("  File size: {} bytes", info.file_bytes);

    let total_time = start_time.elapsed();
    eprintln!("Retrieved index info in {:.2?}", total_time);

    Ok(())
}
