//! End-to-end pipeline scenarios exercising the full build-artifact shape
//! (two bins, mismatched-bin routing, one tolerated substitution) rather
//! than a single bin in isolation.

use fpgalign_core::bloom::InterleavedBloomFilter;
use fpgalign_core::config::Config;
use fpgalign_core::fmindex::build as build_fmindex;
use fpgalign_core::minimizer::{minimizer_set, MinimizerParams};
use fpgalign_core::model::{QueryRecord, ReferenceCorpus};
use fpgalign_core::persistence::{write_fmindex, ArtifactPaths};
use fpgalign_core::pipeline::run_search;
use fpgalign_core::reference::to_two_bit_ranks;
use std::path::PathBuf;

fn ranks_of(seq: &str) -> Vec<u8> {
    seq.bytes()
        .map(|b| match b {
            b'A' => 1,
            b'C' => 2,
            b'G' => 3,
            b'T' => 4,
            _ => unreachable!(),
        })
        .collect()
}

#[test]
fn prefilter_routes_only_the_matching_bin() {
    // Bin 0: reference A ("GGGGGGGGGGGG"); bin 1: reference B ("ACGTACGTACGT").
    // A query that only matches B must produce SAM rows with ref_id from
    // bin 1 and none from bin 0.
    let ref_a = ranks_of("GGGGGGGGGGGG");
    let ref_b = ranks_of("ACGTACGTACGT");
    let params = MinimizerParams::new(3, 3).unwrap();

    let mut filter = InterleavedBloomFilter::new(2, 2, 4096).unwrap();
    for h in minimizer_set(&to_two_bit_ranks(&ref_a), params) {
        filter.insert(0, h);
    }
    for h in minimizer_set(&to_two_bit_ranks(&ref_b), params) {
        filter.insert(1, h);
    }
    let ibf = filter.into_image();

    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactPaths::new(dir.path().join("idx"));
    write_fmindex(&artifacts.fmindex(0), &build_fmindex(&[ref_a.clone()])).unwrap();
    write_fmindex(&artifacts.fmindex(1), &build_fmindex(&[ref_b.clone()])).unwrap();

    let corpus = ReferenceCorpus {
        ref_ids: vec![vec!["refA".to_string()], vec!["refB".to_string()]],
        refs: vec![vec![ref_a], vec![ref_b]],
    };
    let queries = vec![QueryRecord {
        id: "read0".to_string(),
        ranks: ranks_of("ACGT"),
    }];

    let config = Config {
        kmer_size: 3,
        window_size: 3,
        hash_count: 2,
        fpr: 0.01,
        errors: 0,
        threads: 2,
        queue_capacity: 4,
        input: PathBuf::new(),
        output: PathBuf::new(),
        query: None,
    };

    let mut out = Vec::new();
    let written = run_search(&config, &artifacts, &ibf, &corpus, &queries, &mut out).unwrap();
    assert!(written >= 1);

    let text = String::from_utf8(out).unwrap();
    for line in text.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[2], "refB", "no record should come from bin 0 (refA)");
    }
}

#[test]
fn single_substitution_tolerated_with_errors_1() {
    // Reference "ACGTACGTACGT"; query identical to a window but with one
    // substitution. errors=1 must still locate and align it, with exactly
    // one mismatch in the CIGAR and mapq = 59.
    let refseq = ranks_of("ACGTACGTACGT");
    let params = MinimizerParams::new(3, 4).unwrap();

    let mut filter = InterleavedBloomFilter::new(1, 2, 4096).unwrap();
    for h in minimizer_set(&to_two_bit_ranks(&refseq), params) {
        filter.insert(0, h);
    }
    let ibf = filter.into_image();

    let dir = tempfile::tempdir().unwrap();
    let artifacts = ArtifactPaths::new(dir.path().join("idx"));
    write_fmindex(&artifacts.fmindex(0), &build_fmindex(&[refseq.clone()])).unwrap();

    let corpus = ReferenceCorpus {
        ref_ids: vec![vec!["chr1".to_string()]],
        refs: vec![vec![refseq]],
    };
    // "ACTT" vs reference window "ACGT": one substitution (G -> T).
    let queries = vec![QueryRecord {
        id: "read0".to_string(),
        ranks: ranks_of("ACTT"),
    }];

    let config = Config {
        kmer_size: 3,
        window_size: 4,
        hash_count: 2,
        fpr: 0.01,
        errors: 1,
        threads: 1,
        queue_capacity: 4,
        input: PathBuf::new(),
        output: PathBuf::new(),
        query: None,
    };

    let mut out = Vec::new();
    let written = run_search(&config, &artifacts, &ibf, &corpus, &queries, &mut out).unwrap();
    assert!(written >= 1);

    let text = String::from_utf8(out).unwrap();
    assert!(
        text.lines().any(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            fields[4] == "59" && fields[5] == "4M"
        }),
        "expected at least one record with mapq 59 and CIGAR 4M, got:\n{text}"
    );
}
