//! Prefilter stage: hashes every query to its minimizer set, asks the
//! interleaved Bloom filter which bins look like plausible matches, and
//! enqueues `(bin, query_index)` work into Q1.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bloom::{IbfImage, MembershipAgent};
use crate::error::Result;
use crate::minimizer::{minimizer_set, MinimizerParams};
use crate::model::QueryRecord;
use crate::queue::CartQueue;
use crate::reference::to_two_bit_ranks;
use crate::rng::shuffled_indices;
use crate::threshold::ThresholdOracle;

pub struct PrefilterConfig {
    pub threads: usize,
    pub errors: u8,
    pub minimizer_params: MinimizerParams,
}

/// Runs the prefilter stage to completion, closing `q1` once every query
/// has been processed by every worker.
///
/// Each worker owns its own [`MembershipAgent`] and [`ThresholdOracle`] (no
/// sharing); the Bloom filter image is read-only shared across threads.
pub fn run(
    queries: &[QueryRecord],
    ibf: &IbfImage,
    config: &PrefilterConfig,
    q1: &CartQueue<u64>,
) -> Result<()> {
    let order = shuffled_indices(queries.len());
    let cursor = AtomicUsize::new(0);

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..config.threads.max(1) {
            scope.spawn(|_| worker_loop(queries, &order, &cursor, ibf, config, q1));
        }
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

    q1.close();
    Ok(())
}

fn worker_loop(
    queries: &[QueryRecord],
    order: &[usize],
    cursor: &AtomicUsize,
    ibf: &IbfImage,
    config: &PrefilterConfig,
    q1: &CartQueue<u64>,
) {
    let mut agent = MembershipAgent::new(ibf);
    let mut oracle = ThresholdOracle::new(config.errors, config.minimizer_params.w);

    loop {
        let idx = cursor.fetch_add(1, Ordering::Relaxed);
        if idx >= order.len() {
            break;
        }
        let query_index = order[idx];
        let query = &queries[query_index];

        let two_bit = to_two_bit_ranks(&query.ranks);
        let hashes = minimizer_set(&two_bit, config.minimizer_params);
        if hashes.is_empty() {
            continue;
        }
        let threshold = oracle.threshold(hashes.len() as u32);
        let bins = agent.count_bins(&hashes, threshold);

        for bin in bins {
            // Producers retry on a transient error only if the queue isn't
            // closed; in this stage the queue is never closed until every
            // worker returns, so a single attempt always succeeds.
            let _ = q1.enqueue(bin, query_index as u64);
        }
    }
}
