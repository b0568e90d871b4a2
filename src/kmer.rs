//! Canonical k-mer extraction.
//!
//! A k-mer and its reverse complement are represented by whichever of the two
//! is lexicographically smaller. Canonical k-mers are packed two bits per base,
//! first base in the most significant position (A=0, C=1, G=2, T=3). This
//! packing preserves order, so the numeric minimum of the forward and reverse
//! codes is exactly the lexicographic minimum of the two strings.

/// Longest k-mer that fits in a packed `u64`
pub const MAX_KMER_LENGTH: usize = 32;

/// ASCII to 2-bit code, 0xFF for anything outside ACGT (case insensitive)
static BASE_LUT: [u8; 256] = {
    let mut t = [0xFF; 256];
    t[b'A' as usize] = 0;
    t[b'a' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'g' as usize] = 2;
    t[b'T' as usize] = 3;
    t[b't' as usize] = 3;
    t
};

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

#[inline]
fn base_code(nucleotide: u8) -> Option<u64> {
    let v = BASE_LUT[nucleotide as usize];
    (v <= 3).then_some(v as u64)
}

/// Check if nucleotide is ACGT (case insensitive)
#[inline]
pub fn is_acgt(nucleotide: u8) -> bool {
    BASE_LUT[nucleotide as usize] <= 3
}

/// Mask covering the low `2k` bits
#[inline]
pub fn kmer_mask(k: usize) -> u64 {
    if k >= MAX_KMER_LENGTH {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    }
}

/// Reverse complement of an uppercase or lowercase ACGT string.
/// Other characters are passed through unchanged.
pub fn reverse_complement(kmer: &[u8]) -> Vec<u8> {
    kmer.iter()
        .rev()
        .map(|&b| match b.to_ascii_uppercase() {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            b'T' => b'A',
            other => other,
        })
        .collect()
}

/// Canonical (uppercase) form of a k-mer, or `None` if it contains a non-ACGT base
pub fn canonical(kmer: &[u8]) -> Option<Vec<u8>> {
    if !kmer.iter().all(|&b| is_acgt(b)) {
        return None;
    }
    let forward = kmer.to_ascii_uppercase();
    let reverse = reverse_complement(&forward);
    Some(if reverse < forward { reverse } else { forward })
}

/// Pack a k-mer (k <= 32) into a `u64`. `None` if ambiguous, empty or too long.
pub fn encode_kmer(kmer: &[u8]) -> Option<u64> {
    if kmer.is_empty() || kmer.len() > MAX_KMER_LENGTH {
        return None;
    }
    kmer.iter()
        .try_fold(0u64, |code, &b| Some((code << 2) | base_code(b)?))
}

/// Packed code of the canonical form of `kmer`
pub fn encode_canonical(kmer: &[u8]) -> Option<u64> {
    encode_kmer(&canonical(kmer)?)
}

/// Unpack a code produced by [`encode_kmer`]
pub fn decode_kmer(code: u64, k: usize) -> String {
    (0..k)
        .map(|i| BASES[((code >> (2 * (k - 1 - i))) & 0b11) as usize] as char)
        .collect()
}

/// Rolling iterator over the canonical k-mers of a sequence.
///
/// Yields `(offset, code)` for every offset whose k bases are all ACGT, in
/// increasing offset order. Offsets whose span contains any other character
/// are skipped.
pub struct CanonicalKmers<'a> {
    seq: &'a [u8],
    k: usize,
    mask: u64,
    rc_shift: usize,
    pos: usize,
    valid_run: usize,
    forward: u64,
    reverse: u64,
}

impl<'a> CanonicalKmers<'a> {
    /// # Panics
    ///
    /// Panics if `k` is not in `1..=32`.
    pub fn new(seq: &'a [u8], k: usize) -> Self {
        assert!(
            (1..=MAX_KMER_LENGTH).contains(&k),
            "k-mer length must be in 1..={}, got {}",
            MAX_KMER_LENGTH,
            k
        );
        Self {
            seq,
            k,
            mask: kmer_mask(k),
            rc_shift: 2 * (k - 1),
            pos: 0,
            valid_run: 0,
            forward: 0,
            reverse: 0,
        }
    }
}

impl Iterator for CanonicalKmers<'_> {
    type Item = (usize, u64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.seq.len() {
            let i = self.pos;
            self.pos += 1;

            let Some(v) = base_code(self.seq[i]) else {
                self.valid_run = 0;
                continue;
            };
            self.forward = ((self.forward << 2) | v) & self.mask;
            self.reverse = (self.reverse >> 2) | ((v ^ 0b11) << self.rc_shift);
            self.valid_run += 1;

            if self.valid_run >= self.k {
                return Some((i + 1 - self.k, self.forward.min(self.reverse)));
            }
        }
        None
    }
}

/// Canonical k-mer codes of a sequence, in offset order
///
/// # Panics
///
/// Panics if `k` is not in `1..=32`.
pub fn canonical_kmers(seq: &[u8], k: usize) -> Vec<u64> {
    CanonicalKmers::new(seq, k).map(|(_, code)| code).collect()
}
