//! Locator stage: dequeues per-bin carts from Q1, loads that bin's FM-index
//! once per cart, runs bounded approximate search for every query in the
//! cart, and pushes located hits into Q2.

use crate::error::Result;
use crate::fmindex::FmIndex;
use crate::model::{LocateRecord, QueryRecord};
use crate::persistence::ArtifactPaths;
use crate::queue::CartQueue;
use crate::reference::to_two_bit_ranks;

pub struct LocatorConfig {
    pub threads: usize,
    pub errors: u8,
}

/// Runs the locator stage to completion, closing `q2` once every worker has
/// drained Q1 (observed an invalid handle).
pub fn run(
    artifacts: &ArtifactPaths,
    queries: &[QueryRecord],
    config: &LocatorConfig,
    q1: &CartQueue<u64>,
    q2: &CartQueue<LocateRecord>,
) -> Result<()> {
    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..config.threads.max(1) {
            scope.spawn(|_| worker_loop(artifacts, queries, config, q1, q2));
        }
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));

    q2.close();
    Ok(())
}

fn worker_loop(
    artifacts: &ArtifactPaths,
    queries: &[QueryRecord],
    config: &LocatorConfig,
    q1: &CartQueue<u64>,
    q2: &CartQueue<LocateRecord>,
) {
    loop {
        let handle = q1.dequeue();
        if !handle.is_valid() {
            break;
        }
        let bin = handle.slot();
        // Amortized once per dequeued cart, across every query it holds.
        let image = match crate::persistence::read_fmindex(&artifacts.fmindex(bin)) {
            Ok(image) => image,
            Err(_) => continue,
        };
        let index = FmIndex::from_image(image);

        for &query_index in handle.items() {
            let query = &queries[query_index as usize];
            let pattern = to_patterns(&query.ranks);
            for &(lo, hi) in &index.approximate_search(&pattern, config.errors) {
                for occurrence in index.occurrences_in_range(lo, hi) {
                    let record = LocateRecord {
                        bin,
                        ref_seq: occurrence.local_ref_seq,
                        ref_pos: occurrence.position_in_ref,
                        query_index,
                    };
                    let _ = q2.enqueue(0, record);
                }
            }
        }
    }
}

/// The FM-index is built over rank+1-encoded sequences (`1..=4`); queries
/// are already loaded in that same encoding (`crate::reference`), so no
/// conversion is needed beyond returning the slice as owned data for the
/// search call.
fn to_patterns(ranks: &[u8]) -> Vec<u8> {
    ranks.to_vec()
}
