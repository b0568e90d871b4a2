use crate::error::{Error, Result};
use crate::index::{ensure_same_kmer_length, KmerIndex, KmerLister, KmerListing, KmerLookup};
use crate::index_format::IndexHeader;
use crate::IntersectConfig;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

fn index_file_size(path: &Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| Error::index(format!("Failed to stat index {:?}: {}", path, e)))
}

/// Order two index paths as (listing side, random-access side).
///
/// The smaller file is listed. Ties keep the argument order.
pub fn choose_sides<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> Result<(PathBuf, PathBuf)> {
    let (a, b) = (a.as_ref(), b.as_ref());
    if index_file_size(b)? < index_file_size(a)? {
        Ok((b.to_path_buf(), a.to_path_buf()))
    } else {
        Ok((a.to_path_buf(), b.to_path_buf()))
    }
}

/// Count the listed k-mers present in `lookup`
pub fn intersection_size<L, I>(listing: &mut L, lookup: &I) -> Result<u64>
where
    L: KmerListing + ?Sized,
    I: KmerLookup + ?Sized,
{
    ensure_same_kmer_length(listing.kmer_length(), lookup.kmer_length())?;
    listing.restart()?;
    let mut hits = 0u64;
    while let Some(code) = listing.next_kmer()? {
        if lookup.contains(code) {
            hits += 1;
        }
    }
    Ok(hits)
}

/// Intersection size of two index files.
///
/// Both headers are checked for a matching k before either index is loaded.
pub fn intersect_paths<P: AsRef<Path>, Q: AsRef<Path>>(a: P, b: Q) -> Result<u64> {
    let header_a = IndexHeader::read_from_path(&a)?;
    let header_b = IndexHeader::read_from_path(&b)?;
    ensure_same_kmer_length(header_a.kmer_length(), header_b.kmer_length())?;

    let (listing_path, lookup_path) = choose_sides(&a, &b)?;
    let mut listing = KmerLister::open(&listing_path)?;
    let lookup = KmerIndex::load(&lookup_path)?;
    intersection_size(&mut listing, &lookup)
}

pub fn run_intersect(config: &IntersectConfig) -> Result<u64> {
    let start_time = Instant::now();

    let shared = intersect_paths(&config.index_a_path, &config.index_b_path)?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", shared)?;
    stdout.flush()?;

    if !config.quiet {
        eprintln!(
            "Intersected {:?} and {:?} in {:.2?}",
            config.index_a_path,
            config.index_b_path,
            start_time.elapsed()
        );
    }

    Ok(shared)
}
