use fastibs::kmer::{
    canonical, encode_canonical, encode_kmer, is_acgt, reverse_complement, CanonicalKmers,
};
use fastibs::window::chunk_sequence;
use fastibs::SequenceRecord;
use proptest::prelude::*;

fn dna(min: usize, max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ACGTNacgt".to_vec()), min..max)
}

proptest! {
    #[test]
    fn prop_rolling_codes_match_direct_encoding(k in 1usize..=32, seq in dna(0, 200)) {
        for (offset, code) in CanonicalKmers::new(&seq, k) {
            let kmer = &seq[offset..offset + k];
            let direct = canonical(kmer).and_then(|c| encode_kmer(&c));
            prop_assert_eq!(Some(code), direct);
            prop_assert_eq!(Some(code), encode_canonical(kmer));
        }
    }

    #[test]
    fn prop_valid_position_count(k in 1usize..=16, seq in dna(0, 120)) {
        let expected = if seq.len() < k {
            0
        } else {
            seq.windows(k).filter(|w| w.iter().all(|&b| is_acgt(b))).count()
        };
        prop_assert_eq!(CanonicalKmers::new(&seq, k).count(), expected);
    }

    #[test]
    fn prop_canonical_strand_independent(
        kmer in prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 1..=32)
    ) {
        prop_assert_eq!(canonical(&kmer), canonical(&reverse_complement(&kmer)));
        prop_assert_eq!(encode_canonical(&kmer), encode_canonical(&reverse_complement(&kmer)));
    }

    #[test]
    fn prop_windows_tile_sequence(
        len in 0usize..500,
        k in 1usize..=31,
        extra in 1usize..100,
    ) {
        let window_size = k + extra;
        let record = SequenceRecord::new("s", vec![b'A'; len]);
        let windows = chunk_sequence(&record, window_size, k).unwrap();

        if len == 0 {
            prop_assert!(windows.is_empty());
        } else {
            prop_assert_eq!(windows[0].start, 0);
            prop_assert_eq!(windows.last().unwrap().end, len);
        }
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[1].start - pair[0].start, window_size - k);
            prop_assert!(pair[1].start < pair[0].end);
            prop_assert_eq!(pair[0].end, (pair[0].start + window_size).min(len));
        }
        // Every k-mer position lies wholly within some window
        for i in 0..len.saturating_sub(k - 1) {
            prop_assert!(windows.iter().any(|w| w.start <= i && i + k <= w.end));
        }
    }
}
