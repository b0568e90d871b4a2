use crate::error::{Error, Result};
use crate::fastx::SequenceRecord;

/// A bounded slice of one sequence over which statistics are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    pub sequence_id: &'a str,
    pub start: usize,
    pub end: usize,
    pub bases: &'a [u8],
}

impl Window<'_> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn validate_window_size(window_size: usize, kmer_length: usize) -> Result<()> {
    if window_size <= kmer_length {
        return Err(Error::config(format!(
            "Window size ({}) must exceed k-mer length ({})",
            window_size, kmer_length
        )));
    }
    Ok(())
}

/// Split one sequence into windows of `window_size` bases whose starts are
/// `window_size - kmer_length` apart, so every k-mer lies wholly inside at
/// least one window. The last window may be shorter.
pub fn chunk_sequence(
    record: &SequenceRecord,
    window_size: usize,
    kmer_length: usize,
) -> Result<Vec<Window<'_>>> {
    validate_window_size(window_size, kmer_length)?;
    let mut windows = Vec::with_capacity(record.len() / (window_size - kmer_length) + 1);
    push_windows(record, window_size, kmer_length, &mut windows);
    Ok(windows)
}

/// Windows for all records, in record order then offset order
pub fn chunk_sequences(
    records: &[SequenceRecord],
    window_size: usize,
    kmer_length: usize,
) -> Result<Vec<Window<'_>>> {
    validate_window_size(window_size, kmer_length)?;
    let step = window_size - kmer_length;
    let estimate: usize = records.iter().map(|r| r.len() / step + 1).sum();
    let mut windows = Vec::with_capacity(estimate);
    for record in records {
        push_windows(record, window_size, kmer_length, &mut windows);
    }
    Ok(windows)
}

fn push_windows<'a>(
    record: &'a SequenceRecord,
    window_size: usize,
    kmer_length: usize,
    windows: &mut Vec<Window<'a>>,
) {
    let len = record.len();
    let step = window_size - kmer_length;
    let mut offset = 0;
    while offset < len {
        let end = (offset + window_size).min(len);
        windows.push(Window {
            sequence_id: &record.id,
            start: offset,
            end,
            bases: &record.bases[offset..end],
        });
        offset += step;
    }
}
