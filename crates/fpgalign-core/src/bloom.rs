//! The interleaved Bloom filter prefilter.
//!
//! `number_of_bins` equal-length Bloom filter rows are interleaved bit by
//! bit: for a given hash position, every bin's bit lives in the same
//! contiguous span of `number_of_bins` bits, so probing all bins for one
//! hash touches one cache line (or a small handful for large bin counts)
//! instead of `number_of_bins` scattered ones.

use crate::error::{FpgAlignError, Result};

/// Distinct odometer constants mixed into the k-mer hash per probe, so the
/// `hash_count` probes for one value land at independent bit positions.
const HASH_SEEDS: [u64; 5] = [
    0x9E3779B97F4A7C15,
    0xC2B2AE3D27D4EB4F,
    0x165667B19E3779F9,
    0x27D4EB2F165667C5,
    0x85EBCA6B9E3779B9,
];

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

fn probe(kmer_hash: u64, probe_index: u8) -> u64 {
    splitmix64(kmer_hash ^ HASH_SEEDS[probe_index as usize])
}

#[inline]
fn get_bit(bits: &[u64], idx: usize) -> bool {
    (bits[idx / 64] >> (idx % 64)) & 1 == 1
}

#[inline]
fn set_bit(bits: &mut [u64], idx: usize) {
    bits[idx / 64] |= 1 << (idx % 64);
}

/// The on-disk image persisted as `P.ibf`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IbfImage {
    pub number_of_bins: u32,
    pub hash_count: u8,
    pub bits_per_bin: u64,
    pub bits: Vec<u64>,
}

/// Chooses `bits_per_bin` from the standard optimal-Bloom-filter formula,
/// given the expected number of distinct elements inserted into a single
/// bin and the configured target false positive rate.
pub fn bits_per_bin_for(expected_elements: u64, fpr: f64) -> u64 {
    if expected_elements == 0 {
        return 64;
    }
    let n = expected_elements as f64;
    let m = -(n * fpr.ln()) / std::f64::consts::LN_2.powi(2);
    (m.ceil() as u64).max(64)
}

/// Build-time interleaved Bloom filter.
pub struct InterleavedBloomFilter {
    number_of_bins: u32,
    hash_count: u8,
    bits_per_bin: u64,
    bits: Vec<u64>,
}

impl InterleavedBloomFilter {
    pub fn new(number_of_bins: u32, hash_count: u8, bits_per_bin: u64) -> Result<Self> {
        if number_of_bins == 0 {
            return Err(FpgAlignError::InvalidConfig(
                "number_of_bins must be >= 1".to_string(),
            ));
        }
        if hash_count == 0 || hash_count > 5 {
            return Err(FpgAlignError::InvalidConfig(format!(
                "hash_count must be in [1, 5], got {hash_count}"
            )));
        }
        if bits_per_bin == 0 {
            return Err(FpgAlignError::InvalidConfig(
                "bits_per_bin must be >= 1".to_string(),
            ));
        }
        let total_bits = bits_per_bin * u64::from(number_of_bins);
        let words = total_bits.div_ceil(64) as usize;
        Ok(Self {
            number_of_bins,
            hash_count,
            bits_per_bin,
            bits: vec![0u64; words],
        })
    }

    fn bit_index(&self, hash_slot: u64, bin: u32) -> usize {
        (hash_slot * u64::from(self.number_of_bins) + u64::from(bin)) as usize
    }

    /// Sets the `hash_count` bits this k-mer hash maps to within `bin`.
    pub fn insert(&mut self, bin: u32, kmer_hash: u64) {
        debug_assert!(bin < self.number_of_bins);
        for p in 0..self.hash_count {
            let slot = probe(kmer_hash, p) % self.bits_per_bin;
            let idx = self.bit_index(slot, bin);
            set_bit(&mut self.bits, idx);
        }
    }

    pub fn into_image(self) -> IbfImage {
        IbfImage {
            number_of_bins: self.number_of_bins,
            hash_count: self.hash_count,
            bits_per_bin: self.bits_per_bin,
            bits: self.bits,
        }
    }
}

/// A per-worker, reusable membership query agent.
///
/// Search workers each own one of these (never shared), so repeated queries
/// against the read-only [`IbfImage`] allocate nothing beyond the one-time
/// `counts` buffer.
pub struct MembershipAgent<'a> {
    image: &'a IbfImage,
    counts: Vec<u32>,
}

impl<'a> MembershipAgent<'a> {
    pub fn new(image: &'a IbfImage) -> Self {
        Self {
            image,
            counts: vec![0u32; image.number_of_bins as usize],
        }
    }

    fn bit_index(&self, hash_slot: u64, bin: u32) -> usize {
        (hash_slot * u64::from(self.image.number_of_bins) + u64::from(bin)) as usize
    }

    /// For each bin, whether every probed bit for `kmer_hash` is set.
    fn bin_hit(&self, kmer_hash: u64, bin: u32) -> bool {
        (0..self.image.hash_count).all(|p| {
            let slot = probe(kmer_hash, p) % self.image.bits_per_bin;
            get_bit(&self.image.bits, self.bit_index(slot, bin))
        })
    }

    /// Accumulates, for every hash in `hashes`, the bins where it hits, then
    /// returns the bins whose accumulated count reaches `threshold`.
    pub fn count_bins(&mut self, hashes: &[u64], threshold: u32) -> Vec<u32> {
        self.counts.iter_mut().for_each(|c| *c = 0);
        for &hash in hashes {
            for bin in 0..self.image.number_of_bins {
                if self.bin_hit(hash, bin) {
                    self.counts[bin as usize] += 1;
                }
            }
        }
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count >= threshold)
            .map(|(bin, _)| bin as u32)
            .collect()
    }
}
