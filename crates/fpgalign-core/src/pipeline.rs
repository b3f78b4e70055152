//! Pipeline driver: wires the prefilter, locator, and aligner stages
//! together through two [`CartQueue`] instances and runs them to
//! completion in one call.

use std::io::Write;

use crate::aligner_stage;
use crate::bloom::IbfImage;
use crate::config::Config;
use crate::error::Result;
use crate::locator::{self, LocatorConfig};
use crate::minimizer::MinimizerParams;
use crate::model::{LocateRecord, QueryRecord, ReferenceCorpus};
use crate::persistence::ArtifactPaths;
use crate::prefilter::{self, PrefilterConfig};
use crate::queue::CartQueue;

/// Runs the full search pipeline and returns the number of SAM records
/// written. Joins in reverse topological order: the prefilter and locator
/// run on background threads, the aligner runs on the calling thread, and
/// this function only returns once all three have finished.
pub fn run_search(
    config: &Config,
    artifacts: &ArtifactPaths,
    ibf: &IbfImage,
    corpus: &ReferenceCorpus,
    queries: &[QueryRecord],
    out: &mut impl Write,
) -> Result<u64> {
    tracing::debug!(
        bins = ibf.number_of_bins,
        queries = queries.len(),
        threads = config.threads,
        "starting search pipeline"
    );

    let q1: CartQueue<u64> = CartQueue::new(
        ibf.number_of_bins as usize,
        ibf.number_of_bins as usize,
        config.queue_capacity,
    )?;
    let q2: CartQueue<LocateRecord> = CartQueue::new(1, 1, 1)?;

    let prefilter_config = PrefilterConfig {
        threads: config.threads,
        errors: config.errors,
        minimizer_params: MinimizerParams::new(config.kmer_size, config.window_size)?,
    };
    let locator_config = LocatorConfig {
        threads: config.threads,
        errors: config.errors,
    };

    let written = crossbeam_utils::thread::scope(|scope| -> Result<u64> {
        let prefilter_handle = scope.spawn(|_| prefilter::run(queries, ibf, &prefilter_config, &q1));
        let locator_handle =
            scope.spawn(|_| locator::run(artifacts, queries, &locator_config, &q1, &q2));

        let written = aligner_stage::run(corpus, queries, &q2, out)?;

        prefilter_handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
        locator_handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;

        Ok(written)
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;

    tracing::debug!(written, "search pipeline finished");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::InterleavedBloomFilter;
    use crate::fmindex::build;
    use crate::minimizer::minimizer_set;
    use crate::persistence::write_fmindex;
    use crate::reference::to_two_bit_ranks;
    use std::path::PathBuf;

    #[test]
    fn end_to_end_single_bin_exact_match() {
        // Single bin, reference "ACGTACGTACGT", query "ACGT", k=3 w=3 errors=0.
        let refseq: Vec<u8> = vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]; // ACGTACGTACGT
        let params = MinimizerParams::new(3, 3).unwrap();

        let mut filter = InterleavedBloomFilter::new(1, 2, 4096).unwrap();
        let two_bit = to_two_bit_ranks(&refseq);
        for h in minimizer_set(&two_bit, params) {
            filter.insert(0, h);
        }
        let ibf = filter.into_image();

        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactPaths::new(dir.path().join("idx"));
        let fmimage = build(&[refseq.clone()]);
        write_fmindex(&artifacts.fmindex(0), &fmimage).unwrap();

        let corpus = ReferenceCorpus {
            ref_ids: vec![vec!["chr1".to_string()]],
            refs: vec![vec![refseq]],
        };
        let queries = vec![QueryRecord {
            id: "read0".to_string(),
            ranks: vec![1, 2, 3, 4], // ACGT
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
        assert!(text.contains("4M"));
        for line in text.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            let pos: u64 = fields[3].parse().unwrap();
            assert!([1, 5, 9].contains(&pos));
            assert_eq!(fields[4], "60");
        }
    }
}
