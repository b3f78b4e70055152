//! Build-time orchestration: reads the bin manifest, hashes every reference
//! into the interleaved Bloom filter, constructs each bin's FM-index, and
//! persists `P.ibf` / `P.meta` / `P.i.fmindex` / `P.i.ref`.
//!
//! This is the build-side mirror of [`crate::pipeline::run_search`]: where
//! that function wires the three search stages together, this one wires
//! the loader, the Bloom filter, and the FM-index builder together for the
//! one-shot, non-streaming build path.

use std::path::Path;

use crate::bloom::{bits_per_bin_for, InterleavedBloomFilter};
use crate::config::Meta;
use crate::error::{FpgAlignError, Result};
use crate::fmindex::build as build_fmindex;
use crate::minimizer::{minimizer_set, MinimizerParams};
use crate::persistence::{write_fmindex, write_ibf, write_meta, write_ref_store, ArtifactPaths};
use crate::reference::{read_bin_manifest, read_fasta, to_two_bit_ranks};

pub struct BuildConfig {
    pub kmer_size: u8,
    pub window_size: u8,
    pub hash_count: u8,
    pub fpr: f64,
}

/// Runs `build --input F --output P`, writing the Bloom filter, meta, and
/// every per-bin FM-index/reference-store artifact under `output`. Returns
/// the bin count written.
pub fn run_build(manifest: &Path, output: &Path, config: &BuildConfig) -> Result<u32> {
    if !(config.fpr > 0.0 && config.fpr < 1.0) {
        return Err(FpgAlignError::InvalidConfig(format!(
            "fpr must be in (0, 1), got {}",
            config.fpr
        )));
    }
    let params = MinimizerParams::new(config.kmer_size, config.window_size)?;
    let bins = read_bin_manifest(manifest)?;

    let mut ref_ids: Vec<Vec<String>> = Vec::with_capacity(bins.len());
    let mut bin_hashes: Vec<Vec<u64>> = Vec::with_capacity(bins.len());
    let mut bin_refs: Vec<Vec<Vec<u8>>> = Vec::with_capacity(bins.len());

    for fasta_paths in &bins {
        let mut ids = Vec::new();
        let mut hashes = Vec::new();
        let mut refs = Vec::new();
        for path in fasta_paths {
            for record in read_fasta(path)? {
                if (record.ranks.len() as u32) < u32::from(config.window_size) {
                    crate::diagnostics::warn_user(&format!(
                        "reference '{}' ({} bases) is shorter than window_size ({}) and contributes no minimizers",
                        record.id,
                        record.ranks.len(),
                        config.window_size
                    ));
                }
                let two_bit = to_two_bit_ranks(&record.ranks);
                hashes.extend(minimizer_set(&two_bit, params));
                ids.push(record.id);
                refs.push(record.ranks);
            }
        }
        ref_ids.push(ids);
        bin_hashes.push(hashes);
        bin_refs.push(refs);
    }

    let number_of_bins = bins.len() as u32;
    let expected_elements = bin_hashes
        .iter()
        .map(|h| h.len() as u64)
        .max()
        .unwrap_or(0);
    let bits_per_bin = bits_per_bin_for(expected_elements, config.fpr);

    let mut filter =
        InterleavedBloomFilter::new(number_of_bins.max(1), config.hash_count, bits_per_bin)?;
    for (bin, hashes) in bin_hashes.iter().enumerate() {
        for &h in hashes {
            filter.insert(bin as u32, h);
        }
    }
    let ibf_image = filter.into_image();

    let artifacts = ArtifactPaths::new(output);
    write_ibf(&artifacts.ibf(), &ibf_image)?;
    write_meta(
        &artifacts.meta(),
        &Meta {
            kmer_size: config.kmer_size,
            window_size: config.window_size,
            number_of_bins,
            ref_ids,
        },
    )?;

    for (bin, refs) in bin_refs.iter().enumerate() {
        tracing::debug!(bin, references = refs.len(), "building FM-index for bin");
        let fmindex_image = build_fmindex(refs);
        write_fmindex(&artifacts.fmindex(bin as u32), &fmindex_image)?;
        write_ref_store(&artifacts.ref_store(bin as u32), refs)?;
    }

    Ok(number_of_bins)
}
