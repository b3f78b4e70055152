use std::path::PathBuf;

use crate::error::{FpgAlignError, Result};

/// Build-time and search-time parameters, immutable once parsed.
///
/// `kmer_size∈[1,32]`, `window_size≥kmer_size`, `hash_count∈[1,5]`,
/// `fpr∈(0,1)`, `errors∈[0,5]`, `threads≥1`, `queue_capacity≥1`.
#[derive(Debug, Clone)]
pub struct Config {
    pub kmer_size: u8,
    pub window_size: u8,
    pub hash_count: u8,
    pub fpr: f64,
    pub errors: u8,
    pub threads: usize,
    pub queue_capacity: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    pub query: Option<PathBuf>,
}

impl Config {
    /// Validates the parameter ranges above, returning
    /// [`FpgAlignError::InvalidConfig`] on the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.kmer_size == 0 || self.kmer_size > 32 {
            return Err(FpgAlignError::InvalidConfig(format!(
                "kmer_size must be in [1, 32], got {}",
                self.kmer_size
            )));
        }
        if self.window_size < self.kmer_size {
            return Err(FpgAlignError::InvalidConfig(format!(
                "window_size ({}) must be >= kmer_size ({})",
                self.window_size, self.kmer_size
            )));
        }
        if self.hash_count == 0 || self.hash_count > 5 {
            return Err(FpgAlignError::InvalidConfig(format!(
                "hash_count must be in [1, 5], got {}",
                self.hash_count
            )));
        }
        if !(self.fpr > 0.0 && self.fpr < 1.0) {
            return Err(FpgAlignError::InvalidConfig(format!(
                "fpr must be in (0, 1), got {}",
                self.fpr
            )));
        }
        if self.errors > 5 {
            return Err(FpgAlignError::InvalidConfig(format!(
                "errors must be in [0, 5], got {}",
                self.errors
            )));
        }
        if self.threads == 0 {
            return Err(FpgAlignError::InvalidConfig(
                "threads must be >= 1".to_string(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(FpgAlignError::InvalidConfig(
                "queue_capacity must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build metadata persisted alongside the per-bin indices (`P.meta`).
///
/// Field order is the wire contract: it is derived in declaration order by
/// `bincode` and must not be reordered without a format version bump.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Meta {
    pub kmer_size: u8,
    pub window_size: u8,
    pub number_of_bins: u32,
    pub ref_ids: Vec<Vec<String>>,
}

impl Meta {
    /// Checks that an on-disk index's bin count agrees with this meta,
    /// returning [`FpgAlignError::ConsistencyError`] on mismatch.
    pub fn check_consistent_bins(&self, observed_bins: u32) -> Result<()> {
        if observed_bins != self.number_of_bins {
            return Err(FpgAlignError::ConsistencyError(format!(
                "meta declares {} bins but index has {}",
                self.number_of_bins, observed_bins
            )));
        }
        Ok(())
    }
}
