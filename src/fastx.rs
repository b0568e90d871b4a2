use crate::error::{Error, Result};
use flate2::read::MultiGzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Sequence file format, detected from the first non-whitespace character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceFormat {
    Fasta,
    Fastq,
}

impl SequenceFormat {
    /// Detect the format of (decompressed) sequence text
    pub fn detect(data: &[u8]) -> Result<Self> {
        match data.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'>') => Ok(SequenceFormat::Fasta),
            Some(b'@') => Ok(SequenceFormat::Fastq),
            Some(&other) => Err(Error::parse(format!(
                "Unrecognised sequence format (leading character {:?})",
                other as char
            ))),
            None => Err(Error::parse("Empty sequence input")),
        }
    }

    fn header_marker(self) -> u8 {
        match self {
            SequenceFormat::Fasta => b'>',
            SequenceFormat::Fastq => b'@',
        }
    }
}

/// A named nucleotide sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub bases: Vec<u8>,
}

impl SequenceRecord {
    pub fn new<S: Into<String>, B: Into<Vec<u8>>>(id: S, bases: B) -> Self {
        Self {
            id: id.into(),
            bases: bases.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Read a FASTA or FASTQ file, decompressing gzip transparently
pub fn read_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>> {
    let raw = fs::read(path.as_ref())?;
    if raw.starts_with(&GZIP_MAGIC) {
        let mut data = Vec::with_capacity(raw.len() * 4);
        MultiGzDecoder::new(raw.as_slice()).read_to_end(&mut data)?;
        parse_sequences(&data)
    } else {
        parse_sequences(&raw)
    }
}

/// Parse FASTA or FASTQ text into records, preserving file order.
///
/// FASTQ parsing is lenient: the line after a `+` separator is discarded
/// as quality without checking its length against the sequence.
pub fn parse_sequences(data: &[u8]) -> Result<Vec<SequenceRecord>> {
    let format = SequenceFormat::detect(data)?;
    let marker = format.header_marker();

    let mut records = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_seq: Vec<u8> = Vec::new();
    let mut in_quality = false;

    for line in data.split(|&b| b == b'\n') {
        let line = line.trim_ascii();
        if line.is_empty() {
            continue;
        }

        if in_quality {
            in_quality = false;
            continue;
        }
        if format == SequenceFormat::Fastq && line[0] == b'+' {
            in_quality = true;
            continue;
        }

        if line[0] == marker {
            flush_record(&mut records, current_id.take(), &mut current_seq);
            current_id = Some(String::from_utf8_lossy(&line[1..]).into_owned());
        } else {
            current_seq.extend_from_slice(line);
        }
    }
    flush_record(&mut records, current_id, &mut current_seq);

    Ok(records)
}

// Records without sequence are dropped
fn flush_record(records: &mut Vec<SequenceRecord>, id: Option<String>, seq: &mut Vec<u8>) {
    if seq.is_empty() {
        return;
    }
    records.push(SequenceRecord {
        id: id.unwrap_or_default(),
        bases: std::mem::take(seq),
    });
}

/// Total number of bases across records
pub fn total_bases(records: &[SequenceRecord]) -> usize {
    records.iter().map(|r| r.len()).sum()
}
