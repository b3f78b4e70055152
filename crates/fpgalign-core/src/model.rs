//! Shared in-memory data model types: queries and the per-bin reference
//! corpus, loaded once and shared by reference across every pipeline
//! stage.

/// One loaded query record: its id and rank+1-encoded sequence (`1..=4`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub id: String,
    pub ranks: Vec<u8>,
}

/// The full reference corpus, partitioned by bin.
///
/// `refs[bin][local_ref]` is the sentinel-free, rank+1-encoded sequence;
/// `ref_ids[bin][local_ref]` is its human-readable id. Both are indexed
/// the same way, per the §3 invariant that the Bloom filter row and the
/// FM-index for a bin were built from the same sequences in the same
/// order as `ref_ids[bin]`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    pub ref_ids: Vec<Vec<String>>,
    pub refs: Vec<Vec<Vec<u8>>>,
}

impl ReferenceCorpus {
    pub fn number_of_bins(&self) -> u32 {
        self.refs.len() as u32
    }
}

/// A candidate alignment anchor produced by the locator stage (C5) and
/// consumed by the aligner stage (C6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateRecord {
    pub bin: u32,
    pub ref_seq: u32,
    pub ref_pos: u64,
    pub query_index: u64,
}
