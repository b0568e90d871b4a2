use crate::error::Result;
use crate::fastx::{read_sequences, total_bases, SequenceRecord};
use crate::index::{KmerIndex, KmerLookup};
use crate::kmer::canonical_kmers;
use crate::output::{create_writer, format_bp};
use crate::tasks::TaskRunner;
use crate::window::{chunk_sequences, Window};
use crate::StatsConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

pub const STATS_HEADER: &str =
    "seqname\tstart\tend\ttotal_kmers\tobserved_kmers\tvariations\tkmer_distance";

/// Presence/absence statistics for one window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    pub sequence_id: String,
    pub start: usize,
    pub end: usize,
    pub total_kmers: u64,
    pub observed_kmers: u64,
    pub variations: u64,
    pub kmer_distance: u64,
}

impl WindowStats {
    fn close_gap(&mut self, gap: u64, kmer_length: usize) {
        self.variations += 1;
        self.kmer_distance += gap_contribution(gap, kmer_length);
    }
}

/// Distance contributed by one run of `gap` absent k-mers: `g - (k - 1)`,
/// or `|g - (k - 1) + 1|` when that is not positive
pub fn gap_contribution(gap: u64, kmer_length: usize) -> u64 {
    let contribution = gap as i64 - (kmer_length as i64 - 1);
    if contribution <= 0 {
        (contribution + 1).unsigned_abs()
    } else {
        contribution as u64
    }
}

/// Scan the window's canonical k-mers against the index, folding each
/// maximal run of absent k-mers into one variation
pub fn window_stats<I: KmerLookup + ?Sized>(window: &Window<'_>, index: &I) -> WindowStats {
    let kmer_length = index.kmer_length();
    let mut stats = WindowStats {
        sequence_id: window.sequence_id.to_string(),
        start: window.start,
        end: window.end,
        ..Default::default()
    };

    let kmers = canonical_kmers(window.bases, kmer_length);
    stats.total_kmers = kmers.len() as u64;

    let mut gap = 0u64;
    for code in kmers {
        if index.contains(code) {
            stats.observed_kmers += 1;
            if gap > 0 {
                stats.close_gap(gap, kmer_length);
                gap = 0;
            }
        } else {
            gap += 1;
        }
    }
    if gap > 0 {
        stats.close_gap(gap, kmer_length);
    }

    stats
}

/// Chunk every record into windows and compute their statistics in parallel.
/// Output follows record order, then window offset.
pub fn compute_window_stats<I: KmerLookup + ?Sized>(
    records: &[SequenceRecord],
    index: &I,
    window_size: usize,
    runner: &TaskRunner,
) -> Result<Vec<WindowStats>> {
    let windows = chunk_sequences(records, window_size, index.kmer_length())?;
    runner.run("Windows", &windows, |_, window| Ok(window_stats(window, index)))
}

/// Write statistics as TSV with a header row
pub fn write_stats_tsv<W: Write>(writer: &mut W, stats: &[WindowStats]) -> Result<()> {
    writeln!(writer, "{}", STATS_HEADER)?;
    for s in stats {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.sequence_id,
            s.start,
            s.end,
            s.total_kmers,
            s.observed_kmers,
            s.variations,
            s.kmer_distance
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Run totals for the stats mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub version: String,
    pub index: String,
    pub sequences: String,
    pub k: usize,
    pub window_size: usize,
    pub threads: usize,
    pub sequence_count: usize,
    pub sequence_bp: usize,
    pub windows: usize,
    pub total_kmers: u64,
    pub observed_kmers: u64,
    pub variations: u64,
    pub kmer_distance: u64,
    pub time: f64,
}

pub fn run_stats(config: &StatsConfig) -> Result<StatsSummary> {
    let start_time = Instant::now();
    let version = env!("CARGO_PKG_VERSION").to_string();

    if !config.quiet {
        eprintln!(
            "FastIBS v{}; mode: stats; options: w={}, threads={}",
            version, config.window_size, config.threads
        );
    }

    let index = KmerIndex::load(&config.index_path)?;
    let kmer_length = index.kmer_length();
    if !config.quiet {
        eprintln!(
            "Loaded index (k={}, {} k-mers) in {:.2?}",
            kmer_length,
            index.len(),
            start_time.elapsed()
        );
    }

    let records = read_sequences(&config.sequences_path)?;
    let sequence_bp = total_bases(&records);
    if !config.quiet {
        eprintln!(
            "Sequences: {} records, {}",
            records.len(),
            format_bp(sequence_bp)
        );
    }

    let runner = TaskRunner::new(config.threads)?.with_progress(!config.quiet);
    let stats = compute_window_stats(&records, &index, config.window_size, &runner)?;

    let mut writer = create_writer(config.output_path.as_deref())?;
    write_stats_tsv(&mut writer, &stats)?;

    let summary = StatsSummary {
        version: format!("fastibs {}", version),
        index: config.index_path.to_string_lossy().to_string(),
        sequences: config.sequences_path.to_string_lossy().to_string(),
        k: kmer_length,
        window_size: config.window_size,
        threads: runner.num_threads(),
        sequence_count: records.len(),
        sequence_bp,
        windows: stats.len(),
        total_kmers: stats.iter().map(|s| s.total_kmers).sum(),
        observed_kmers: stats.iter().map(|s| s.observed_kmers).sum(),
        variations: stats.iter().map(|s| s.variations).sum(),
        kmer_distance: stats.iter().map(|s| s.kmer_distance).sum(),
        time: start_time.elapsed().as_secs_f64(),
    };

    if !config.quiet {
        eprintln!(
            "Computed {} windows: {}/{} k-mers observed, {} variations in {:.2?}",
            summary.windows,
            summary.observed_kmers,
            summary.total_kmers,
            summary.variations,
            start_time.elapsed()
        );
    }

    if let Some(summary_path) = &config.summary_path {
        let file = File::create(summary_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)
            .map_err(std::io::Error::from)?;
        if !config.quiet {
            eprintln!("Summary saved to {:?}", summary_path);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(bases: &[u8]) -> Window<'_> {
        Window {
            sequence_id: "seq",
            start: 0,
            end: bases.len(),
            bases,
        }
    }

    #[test]
    fn test_gap_contribution() {
        // k = 4: runs shorter than k fold around zero
        assert_eq!(gap_contribution(1, 4), 1);
        assert_eq!(gap_contribution(2, 4), 0);
        assert_eq!(gap_contribution(3, 4), 1);
        assert_eq!(gap_contribution(4, 4), 1);
        assert_eq!(gap_contribution(10, 4), 7);
        assert_eq!(gap_contribution(16, 5), 12);
        assert_eq!(gap_contribution(31, 31), 1);
    }

    #[test]
    fn test_literal_fixture() {
        let index = KmerIndex::from_kmers(4, ["ACGT"]).unwrap();
        let stats = window_stats(&window(b"ACGTACGT"), &index);
        assert_eq!(stats.total_kmers, 5);
        assert_eq!(stats.observed_kmers, 2);
        assert_eq!(stats.variations, 1);
        assert_eq!(stats.kmer_distance, 1);
    }

    #[test]
    fn test_empty_index_single_gap() {
        let index = KmerIndex::from_codes(5, []).unwrap();
        let seq = b"ACGTTGCAAGGCTTACCGTA";
        assert_eq!(seq.len(), 20);
        let stats = window_stats(&window(seq), &index);
        assert_eq!(stats.total_kmers, 16);
        assert_eq!(stats.observed_kmers, 0);
        assert_eq!(stats.variations, 1);
        assert_eq!(stats.kmer_distance, 12);
    }

    #[test]
    fn test_full_index_no_variation() {
        let seq = b"GATTACAGATTACACCGT";
        let index = KmerIndex::from_codes(6, canonical_kmers(seq, 6)).unwrap();
        let stats = window_stats(&window(seq), &index);
        assert_eq!(stats.total_kmers, 13);
        assert_eq!(stats.observed_kmers, 13);
        assert_eq!(stats.variations, 0);
        assert_eq!(stats.kmer_distance, 0);
    }

    #[test]
    fn test_distance_accumulates_over_gaps() {
        // Absent runs at offsets 2..=9 (length 8) and 12..=21 (length 10)
        let index = KmerIndex::from_kmers(3, ["AAA"]).unwrap();
        let stats = window_stats(&window(b"AAAACGCGCGAAAACGCGCGCGAAA"), &index);
        assert_eq!(stats.total_kmers, 23);
        assert_eq!(stats.observed_kmers, 5);
        assert_eq!(stats.variations, 2);
        assert_eq!(stats.kmer_distance, 6 + 8);
    }

    #[test]
    fn test_ambiguous_bases_do_not_break_gap() {
        let index = KmerIndex::from_kmers(3, ["AAA"]).unwrap();
        // CCC NN GGG: the absent k-mers on both sides of the Ns form one run
        let stats = window_stats(&window(b"AAACCCNNGGGAAA"), &index);
        assert_eq!(stats.total_kmers, 8);
        assert_eq!(stats.observed_kmers, 2);
        assert_eq!(stats.variations, 1);
        assert_eq!(stats.kmer_distance, gap_contribution(6, 3));
    }

    #[test]
    fn test_short_window_has_no_kmers() {
        let index = KmerIndex::from_kmers(5, ["AAAAA"]).unwrap();
        let stats = window_stats(&window(b"ACG"), &index);
        assert_eq!(stats, WindowStats {
            sequence_id: "seq".to_string(),
            start: 0,
            end: 3,
            ..Default::default()
        });
    }

    #[test]
    fn test_write_tsv() {
        let stats = vec![WindowStats {
            sequence_id: "chr1".to_string(),
            start: 0,
            end: 100,
            total_kmers: 80,
            observed_kmers: 70,
            variations: 2,
            kmer_distance: 5,
        }];
        let mut out = Vec::new();
        write_stats_tsv(&mut out, &stats).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "seqname\tstart\tend\ttotal_kmers\tobserved_kmers\tvariations\tkmer_distance\nchr1\t0\t100\t80\t70\t2\t5\n"
        );
    }
}
