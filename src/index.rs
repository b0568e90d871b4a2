use crate::error::{Error, Result};
use crate::index_format::{open_index_file, read_code, read_count, IndexHeader};
use crate::kmer::{encode_canonical, MAX_KMER_LENGTH};
use bincode::serde::encode_into_std_write;
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

// Re-export index operations
pub use crate::index_info::info;

const MAX_PREALLOCATED_KMERS: usize = 1 << 26;

/// Random-access membership queries.
///
/// Queries take `&self`, so one index can be shared by every worker thread.
pub trait KmerLookup: Sync {
    fn kmer_length(&self) -> usize;

    /// Whether the packed canonical k-mer is in the index
    fn contains(&self, code: u64) -> bool;
}

/// Single-cursor, forward-only enumeration of an index.
///
/// Advancing the cursor takes `&mut self`, so a cursor can never be shared
/// between concurrent consumers.
pub trait KmerListing {
    fn kmer_length(&self) -> usize;

    /// Next k-mer in the listing, or `None` once the listing is exhausted
    fn next_kmer(&mut self) -> Result<Option<u64>>;

    /// Rewind to the first k-mer
    fn restart(&mut self) -> Result<()>;
}

/// Fully loaded, read-only k-mer set
#[derive(Debug, Clone)]
pub struct KmerIndex {
    header: IndexHeader,
    kmers: FxHashSet<u64>,
}

impl KmerIndex {
    /// Load the index without spiking memory usage with an extra vec
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = open_index_file(path)?;
        let header = IndexHeader::read_from(&mut reader)?;
        let count = read_count(&mut reader)?;

        // Pre-allocate, but don't trust a corrupt count with the whole allocation
        let capacity = count.min(MAX_PREALLOCATED_KMERS);
        let mut kmers = FxHashSet::with_capacity_and_hasher(capacity, Default::default());
        for _ in 0..count {
            kmers.insert(read_code(&mut reader, header.kmer_length())?);
        }
        if kmers.len() != count {
            return Err(Error::index(format!(
                "Index {:?} repeats k-mers ({} distinct of {})",
                path,
                kmers.len(),
                count
            )));
        }

        Ok(Self { header, kmers })
    }

    /// Build an in-memory index from packed canonical codes
    pub fn from_codes<I: IntoIterator<Item = u64>>(kmer_length: usize, codes: I) -> Result<Self> {
        if !(1..=MAX_KMER_LENGTH).contains(&kmer_length) {
            return Err(Error::config(format!(
                "K-mer length must be in 1-{}, got {}",
                MAX_KMER_LENGTH, kmer_length
            )));
        }
        Ok(Self {
            header: IndexHeader::new(kmer_length),
            kmers: codes.into_iter().collect(),
        })
    }

    /// Build an in-memory index from k-mer strings, canonicalising each.
    /// Ambiguous k-mers or k-mers of the wrong length are rejected.
    pub fn from_kmers<I, S>(kmer_length: usize, kmers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut codes = Vec::new();
        for kmer in kmers {
            let kmer = kmer.as_ref();
            let code = (kmer.len() == kmer_length)
                .then(|| encode_canonical(kmer))
                .flatten()
                .ok_or_else(|| {
                    Error::config(format!(
                        "Invalid {}-mer: {}",
                        kmer_length,
                        String::from_utf8_lossy(kmer)
                    ))
                })?;
            codes.push(code);
        }
        Self::from_codes(kmer_length, codes)
    }

    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// Number of distinct k-mers
    pub fn len(&self) -> usize {
        self.kmers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kmers.is_empty()
    }

    /// Whether the (unpacked) k-mer string, canonicalised, is in the index
    pub fn contains_kmer(&self, kmer: &[u8]) -> bool {
        kmer.len() == self.header.kmer_length()
            && encode_canonical(kmer).is_some_and(|code| self.kmers.contains(&code))
    }

    /// Codes in ascending order
    pub fn sorted_codes(&self) -> Vec<u64> {
        let mut codes: Vec<u64> = self.kmers.iter().copied().collect();
        codes.sort_unstable();
        codes
    }
}

impl KmerLookup for KmerIndex {
    fn kmer_length(&self) -> usize {
        self.header.kmer_length()
    }

    #[inline]
    fn contains(&self, code: u64) -> bool {
        self.kmers.contains(&code)
    }
}

/// Streaming listing over an index file; never holds the whole set in memory.
/// Fails with an index error unless codes are strictly ascending.
pub struct KmerLister {
    path: PathBuf,
    reader: BufReader<File>,
    header: IndexHeader,
    count: usize,
    remaining: usize,
    last: Option<u64>,
}

impl KmerLister {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = open_index_file(&path)?;
        let header = IndexHeader::read_from(&mut reader)?;
        let count = read_count(&mut reader)?;
        Ok(Self {
            path,
            reader,
            header,
            count,
            remaining: count,
            last: None,
        })
    }

    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// Number of k-mers declared by the index
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl KmerListing for KmerLister {
    fn kmer_length(&self) -> usize {
        self.header.kmer_length()
    }

    fn next_kmer(&mut self) -> Result<Option<u64>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let code = read_code(&mut self.reader, self.header.kmer_length())?;
        // Codes are stored strictly ascending
        if self.last.is_some_and(|last| code <= last) {
            return Err(Error::index(format!(
                "K-mer codes out of order or repeated in {:?}",
                self.path
            )));
        }
        self.last = Some(code);
        self.remaining -= 1;
        Ok(Some(code))
    }

    fn restart(&mut self) -> Result<()> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::index(format!("Failed to rewind {:?}: {}", self.path, e)))?;
        let header = IndexHeader::read_from(&mut self.reader)?;
        if header != self.header {
            return Err(Error::index(format!(
                "Index header changed while listing {:?}",
                self.path
            )));
        }
        self.count = read_count(&mut self.reader)?;
        self.remaining = self.count;
        self.last = None;
        Ok(())
    }
}

/// Serialize a k-mer set in the index file format (codes written in ascending order)
pub fn write_kmers<P: AsRef<Path>>(index: &KmerIndex, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    let config = bincode::config::standard();
    let encode_err = |e: bincode::error::EncodeError| {
        Error::index(format!("Failed to serialize index: {}", e))
    };

    encode_into_std_write(index.header(), &mut writer, config).map_err(encode_err)?;
    encode_into_std_write(index.len(), &mut writer, config).map_err(encode_err)?;
    for code in index.sorted_codes() {
        encode_into_std_write(code, &mut writer, config).map_err(encode_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Fail with a configuration error unless both k-mer lengths agree
pub fn ensure_same_kmer_length(first: usize, second: usize) -> Result<()> {
    if first != second {
        return Err(Error::config(format!(
            "K-mer lengths do not match: {} vs {}",
            first, second
        )));
    }
    Ok(())
}
