use crate::error::Result;
use crate::fastx::{read_sequences, total_bases, SequenceRecord};
use crate::index::{KmerIndex, KmerLookup};
use crate::kmer::CanonicalKmers;
use crate::output::{create_writer, format_bp};
use crate::tasks::TaskRunner;
use crate::MapConfig;
use std::io::Write;
use std::time::Instant;

/// Per-base coverage of one sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCoverage {
    pub id: String,
    pub coverage: Vec<u32>,
}

/// Count, for every base, how many indexed k-mers span it
pub fn coverage_array<I: KmerLookup + ?Sized>(bases: &[u8], index: &I) -> Vec<u32> {
    let kmer_length = index.kmer_length();
    let mut coverage = vec![0u32; bases.len()];
    for (offset, code) in CanonicalKmers::new(bases, kmer_length) {
        if index.contains(code) {
            for depth in &mut coverage[offset..offset + kmer_length] {
                *depth += 1;
            }
        }
    }
    coverage
}

/// One coverage array per record, in record order
pub fn compute_coverage<I: KmerLookup + ?Sized>(
    records: &[SequenceRecord],
    index: &I,
    runner: &TaskRunner,
) -> Result<Vec<SequenceCoverage>> {
    runner.run("Sequences", records, |_, record| {
        Ok(SequenceCoverage {
            id: record.id.clone(),
            coverage: coverage_array(&record.bases, index),
        })
    })
}

/// Two lines per sequence: the id, then comma-separated depths
pub fn write_coverage<W: Write>(writer: &mut W, coverages: &[SequenceCoverage]) -> Result<()> {
    for entry in coverages {
        writeln!(writer, "{}", entry.id)?;
        let mut first = true;
        for depth in &entry.coverage {
            if !first {
                writer.write_all(b",")?;
            }
            write!(writer, "{}", depth)?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run_mapping(config: &MapConfig) -> Result<()> {
    let start_time = Instant::now();

    if !config.quiet {
        eprintln!(
            "FastIBS v{}; mode: map; options: threads={}",
            env!("CARGO_PKG_VERSION"),
            config.threads
        );
    }

    let index = KmerIndex::load(&config.index_path)?;
    if !config.quiet {
        eprintln!(
            "Loaded index (k={}, {} k-mers) in {:.2?}",
            index.kmer_length(),
            index.len(),
            start_time.elapsed()
        );
    }

    let records = read_sequences(&config.sequences_path)?;
    if !config.quiet {
        eprintln!(
            "Sequences: {} records, {}",
            records.len(),
            format_bp(total_bases(&records))
        );
    }

    let runner = TaskRunner::new(config.threads)?.with_progress(!config.quiet);
    let coverages = compute_coverage(&records, &index, &runner)?;

    let mut writer = create_writer(config.output_path.as_deref())?;
    write_coverage(&mut writer, &coverages)?;

    if !config.quiet {
        let covered: usize = coverages
            .iter()
            .map(|c| c.coverage.iter().filter(|&&d| d > 0).count())
            .sum();
        eprintln!(
            "Mapped {} sequences ({} covered) in {:.2?}",
            coverages.len(),
            format_bp(covered),
            start_time.elapsed()
        );
    }

    Ok(())
}
