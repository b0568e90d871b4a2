use crate::error::{Error, Result};
use crate::kmer::MAX_KMER_LENGTH;
use bincode::serde::decode_from_std_read;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Current on-disk index format version
pub const FORMAT_VERSION: u8 = 1;

/// Serializable header for the index file.
///
/// An index file is this header followed by a `usize` count and `count`
/// packed canonical k-mer codes, all bincode-encoded with the standard config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    pub format_version: u8,
    pub kmer_length: u8,
}

impl IndexHeader {
    pub fn new(kmer_length: usize) -> Self {
        IndexHeader {
            format_version: FORMAT_VERSION,
            kmer_length: kmer_length as u8,
        }
    }

    /// Validate header
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(Error::index(format!(
                "Unsupported index format version: {}",
                self.format_version
            )));
        }
        if self.kmer_length == 0 || self.kmer_length as usize > MAX_KMER_LENGTH {
            return Err(Error::index(format!(
                "Invalid k-mer length in index header: {} (expected 1-{})",
                self.kmer_length, MAX_KMER_LENGTH
            )));
        }
        Ok(())
    }

    /// Get k
    pub fn kmer_length(&self) -> usize {
        self.kmer_length as usize
    }

    /// Decode and validate a header from the start of a stream
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let header: IndexHeader = decode_from_std_read(reader, bincode::config::standard())
            .map_err(|e| Error::index(format!("Failed to deserialize index header: {}", e)))?;
        header.validate()?;
        Ok(header)
    }

    /// Read only the header of an index file, without touching its k-mers
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = open_index_file(path.as_ref())?;
        Self::read_from(&mut reader)
    }
}

/// Open an index file for buffered reading, mapping failures to index errors
pub(crate) fn open_index_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| Error::index(format!("Failed to open index file {:?}: {}", path, e)))?;
    Ok(BufReader::new(file))
}

/// Decode the k-mer count that follows the header
pub(crate) fn read_count<R: Read>(reader: &mut R) -> Result<usize> {
    decode_from_std_read(reader, bincode::config::standard())
        .map_err(|e| Error::index(format!("Failed to deserialize k-mer count: {}", e)))
}

/// Decode one k-mer code and check it fits in `2k` bits
pub(crate) fn read_code<R: Read>(reader: &mut R, kmer_length: usize) -> Result<u64> {
    let code: u64 = decode_from_std_read(reader, bincode::config::standard())
        .map_err(|e| Error::index(format!("Failed to deserialize k-mer: {}", e)))?;
    if code & !crate::kmer::kmer_mask(kmer_length) != 0 {
        return Err(Error::index(format!(
            "K-mer code {:#x} does not fit k={}",
            code, kmer_length
        )));
    }
    Ok(code)
}
