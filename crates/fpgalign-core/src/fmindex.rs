//! Per-bin FM-index: construction, exact backward search, and error-bounded
//! approximate search.
//!
//! The alphabet is `{0, 1, 2, 3, 4, 5}`: `0` is the single whole-text
//! terminator appended once after every reference has been concatenated (it
//! gives the suffix array a well-defined total order and is never produced
//! by [`crate::reference`] or matched against a query); `1..=4` are
//! `A/C/G/T`; `5` is the inter-reference sentinel inserted once after each
//! reference in the concatenated build text (never stored in the
//! persisted per-reference vectors — see [`crate::persistence`]). `Occ`/`C`
//! only track `1..=4` plus the sentinel `5`, since queries never contain
//! the terminator.

use std::collections::HashSet;

const SENTINEL: u8 = 5;
const TERMINATOR: u8 = 0;
const ALPHABET: usize = 5; // symbols 1..=5

fn symbol_index(symbol: u8) -> usize {
    debug_assert!((1..=5).contains(&symbol));
    (symbol - 1) as usize
}

/// The on-disk image persisted as `P.i.fmindex`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FmIndexImage {
    pub sa: Vec<u64>,
    pub bwt: Vec<u8>,
    pub occ: Vec<[u32; ALPHABET]>,
    pub c_table: [u64; ALPHABET],
    pub ref_bounds: Vec<(u32, u64, u64)>,
}

/// Builds the FM-index for one bin from its (sentinel-free) reference
/// sequences, each already rank+1 encoded (`1..=4`).
pub fn build(refs: &[Vec<u8>]) -> FmIndexImage {
    let mut text = Vec::new();
    let mut ref_bounds = Vec::with_capacity(refs.len());
    for (idx, r) in refs.iter().enumerate() {
        let start = text.len() as u64;
        text.extend_from_slice(r);
        let end = text.len() as u64;
        ref_bounds.push((idx as u32, start, end));
        text.push(SENTINEL);
    }
    text.push(TERMINATOR);

    let sa = build_suffix_array(&text);
    let n = text.len();

    let mut bwt = vec![0u8; n];
    for (i, &sa_pos) in sa.iter().enumerate() {
        bwt[i] = if sa_pos == 0 {
            text[n - 1]
        } else {
            text[sa_pos as usize - 1]
        };
    }

    let mut occ = vec![[0u32; ALPHABET]; n + 1];
    for i in 0..n {
        occ[i + 1] = occ[i];
        if bwt[i] != TERMINATOR {
            occ[i + 1][symbol_index(bwt[i])] += 1;
        }
    }

    let total_counts = occ[n];
    let mut c_table = [0u64; ALPHABET];
    let mut running = 1u64; // the one TERMINATOR occurrence sorts before everything
    for sym_idx in 0..ALPHABET {
        c_table[sym_idx] = running;
        running += u64::from(total_counts[sym_idx]);
    }

    FmIndexImage {
        sa,
        bwt,
        occ,
        c_table,
        ref_bounds,
    }
}

/// Suffix array via prefix-doubling rank sort. Treats positions beyond the
/// text's end as carrying rank `-1`, the smallest possible, so shorter
/// suffixes always sort before longer ones that share a prefix.
fn build_suffix_array(text: &[u8]) -> Vec<u64> {
    let n = text.len();
    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<i64> = text.iter().map(|&b| i64::from(b)).collect();
    let mut tmp = vec![0i64; n];
    let mut k = 1usize;

    let pair_at = |rank: &[i64], i: usize, k: usize| -> (i64, i64) {
        let r2 = if i + k < n { rank[i + k] } else { -1 };
        (rank[i], r2)
    };

    loop {
        sa.sort_unstable_by(|&a, &b| pair_at(&rank, a, k).cmp(&pair_at(&rank, b, k)));
        tmp[sa[0]] = 0;
        for i in 1..n {
            let prev = pair_at(&rank, sa[i - 1], k);
            let cur = pair_at(&rank, sa[i], k);
            tmp[sa[i]] = tmp[sa[i - 1]] + i64::from(prev < cur);
        }
        rank.copy_from_slice(&tmp);
        if rank[sa[n - 1]] as usize == n - 1 || k >= n {
            break;
        }
        k *= 2;
    }
    sa.into_iter().map(|x| x as u64).collect()
}

/// The loaded, query-ready form of a bin's FM-index.
pub struct FmIndex {
    image: FmIndexImage,
}

/// A resolved occurrence: which reference it falls in, and the 0-based
/// offset within that reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub local_ref_seq: u32,
    pub position_in_ref: u64,
}

impl FmIndex {
    pub fn from_image(image: FmIndexImage) -> Self {
        Self { image }
    }

    pub fn into_image(self) -> FmIndexImage {
        self.image
    }

    fn occ_count(&self, row: u64, sym_idx: usize) -> u64 {
        u64::from(self.image.occ[row as usize][sym_idx])
    }

    fn backward_step(&self, symbol: u8, lo: u64, hi: u64) -> (u64, u64) {
        let sym_idx = symbol_index(symbol);
        let base = self.image.c_table[sym_idx];
        (
            base + self.occ_count(lo, sym_idx),
            base + self.occ_count(hi, sym_idx),
        )
    }

    /// Approximate search bounded by `errors` edits (substitutions,
    /// insertions, and deletions), backtracking over the pattern from its
    /// last symbol toward its first. `errors = 0` degenerates to exact
    /// backward search. Returns the distinct suffix-array ranges `[lo, hi)`
    /// that match within budget; pruning beyond the remaining edit budget
    /// is the only cutoff applied (no tighter per-position lower bound is
    /// computed, since the backtracking tree is already bounded by
    /// `errors` and query lengths are short reads).
    pub fn approximate_search(&self, pattern: &[u8], errors: u8) -> Vec<(u64, u64)> {
        let mut hits = HashSet::new();
        if pattern.is_empty() {
            return Vec::new();
        }
        self.extend(pattern, pattern.len() as isize - 1, 0, self.image.sa.len() as u64, errors, &mut hits);
        hits.into_iter().collect()
    }

    fn extend(
        &self,
        pattern: &[u8],
        i: isize,
        lo: u64,
        hi: u64,
        errors_left: u8,
        hits: &mut HashSet<(u64, u64)>,
    ) {
        if lo >= hi {
            return;
        }
        if i < 0 {
            hits.insert((lo, hi));
            return;
        }

        let want = pattern[i as usize];
        let (nlo, nhi) = self.backward_step(want, lo, hi);
        if nlo < nhi {
            self.extend(pattern, i - 1, nlo, nhi, errors_left, hits);
        }

        if errors_left == 0 {
            return;
        }

        // Insertion: pattern has an extra symbol absent from the text.
        self.extend(pattern, i - 1, lo, hi, errors_left - 1, hits);

        for c in 1u8..=4 {
            // Substitution: the text holds a different real base here.
            if c != want {
                let (slo, shi) = self.backward_step(c, lo, hi);
                if slo < shi {
                    self.extend(pattern, i - 1, slo, shi, errors_left - 1, hits);
                }
            }
            // Deletion: the text holds an extra base absent from the pattern.
            let (dlo, dhi) = self.backward_step(c, lo, hi);
            if dlo < dhi {
                self.extend(pattern, i, dlo, dhi, errors_left - 1, hits);
            }
        }
    }

    /// Resolves a suffix-array row to the reference and in-reference offset
    /// it falls in, via binary search over `ref_bounds`.
    pub fn resolve(&self, sa_row: u64) -> Option<Occurrence> {
        let pos = self.image.sa[sa_row as usize];
        let idx = self
            .image
            .ref_bounds
            .partition_point(|&(_, _, end)| end <= pos);
        let (ref_idx, start, end) = *self.image.ref_bounds.get(idx)?;
        if pos < start || pos >= end {
            return None;
        }
        Some(Occurrence {
            local_ref_seq: ref_idx,
            position_in_ref: pos - start,
        })
    }

    /// All suffix-array rows in `[lo, hi)`, as an iterator over resolved occurrences.
    pub fn occurrences_in_range(&self, lo: u64, hi: u64) -> impl Iterator<Item = Occurrence> + '_ {
        (lo..hi).filter_map(move |row| self.resolve(row))
    }
}
