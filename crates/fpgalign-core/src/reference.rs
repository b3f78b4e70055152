//! Reference and query loading: a hand-rolled, minimal FASTA reader. This
//! is peripheral I/O plumbing, not a dependency-worthy concern, so it
//! stays stdlib-only by design.

use std::io::BufRead;
use std::path::Path;

use crate::error::{FpgAlignError, Result};

/// One parsed FASTA record: its id (the text after `>` up to the first
/// whitespace) and its rank+1-encoded sequence (`1..=4`, `A/C/G/T`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub ranks: Vec<u8>,
}

fn rank_plus_one(base: u8) -> Option<u8> {
    match base.to_ascii_uppercase() {
        b'A' => Some(1),
        b'C' => Some(2),
        b'G' => Some(3),
        b'T' => Some(4),
        _ => None,
    }
}

/// Parses a FASTA file, warning once per file the first time an IUPAC
/// ambiguity code (or any other non-`ACGT` byte) is substituted with the
/// placeholder rank `1` ("A").
pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut records = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_ranks: Vec<u8> = Vec::new();
    let mut warned = false;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                records.push(FastaRecord {
                    id,
                    ranks: std::mem::take(&mut current_ranks),
                });
            }
            let id = header.split_whitespace().next().unwrap_or("").to_string();
            current_id = Some(id);
            continue;
        }
        if current_id.is_none() {
            return Err(FpgAlignError::InvalidConfig(format!(
                "{}: sequence data before any '>' header",
                path.display()
            )));
        }
        for base in line.bytes() {
            match rank_plus_one(base) {
                Some(r) => current_ranks.push(r),
                None => {
                    if !warned {
                        crate::diagnostics::warn_user(&format!(
                            "{}: non-ACGT symbol '{}' substituted with placeholder rank",
                            path.display(),
                            base as char
                        ));
                        warned = true;
                    }
                    current_ranks.push(1);
                }
            }
        }
    }
    if let Some(id) = current_id.take() {
        records.push(FastaRecord {
            id,
            ranks: current_ranks,
        });
    }
    Ok(records)
}

/// Parses `build --input`'s manifest: one line per bin, whitespace
/// separating one or more FASTA paths contributing to that bin.
pub fn read_bin_manifest(path: &Path) -> Result<Vec<Vec<std::path::PathBuf>>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut bins = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let paths = line
            .split_whitespace()
            .map(std::path::PathBuf::from)
            .collect();
        bins.push(paths);
    }
    Ok(bins)
}

/// Converts a rank+1-encoded sequence (`1..=4`) to the 2-bit ranks
/// (`0..=3`) the minimizer hasher expects.
pub fn to_two_bit_ranks(ranks: &[u8]) -> Vec<u8> {
    ranks.iter().map(|&r| r - 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parses_multi_record_fasta() {
        let f = write_temp(">seq1 desc\nACGT\nACGT\n>seq2\nTTTT\n");
        let records = read_fasta(f.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "seq1");
        assert_eq!(records[0].ranks, vec![1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(records[1].id, "seq2");
        assert_eq!(records[1].ranks, vec![4, 4, 4, 4]);
    }

    #[test]
    fn ambiguity_code_becomes_placeholder() {
        let f = write_temp(">seq1\nACNGT\n");
        let records = read_fasta(f.path()).unwrap();
        assert_eq!(records[0].ranks, vec![1, 2, 1, 3, 4]);
    }

    #[test]
    fn two_bit_conversion_matches_rank_minus_one() {
        assert_eq!(to_two_bit_ranks(&[1, 2, 3, 4]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn manifest_splits_multiple_paths_per_bin() {
        let f = write_temp("a.fa b.fa\nc.fa\n");
        let bins = read_bin_manifest(f.path()).unwrap();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].len(), 2);
        assert_eq!(bins[1].len(), 1);
    }
}
