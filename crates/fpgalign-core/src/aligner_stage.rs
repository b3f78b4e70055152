//! Aligner stage: drains Q2, aligns each candidate against a reference
//! slice, and writes SAM records. Runs single-threaded by design — the
//! SAM writer is a single producer.

use std::io::Write;

use crate::alignment::{align, cigar_to_string, mapq_from_score};
use crate::error::Result;
use crate::model::{LocateRecord, QueryRecord, ReferenceCorpus};
use crate::queue::CartQueue;

/// Drains `q2` to completion, writing one SAM record per successful
/// alignment to `out`. Returns the number of records written.
pub fn run(
    corpus: &ReferenceCorpus,
    queries: &[QueryRecord],
    q2: &CartQueue<LocateRecord>,
    out: &mut impl Write,
) -> Result<u64> {
    let mut written = 0u64;
    loop {
        let handle = q2.dequeue();
        if !handle.is_valid() {
            break;
        }
        for record in handle.items() {
            if let Some(line) = align_one(corpus, queries, *record) {
                writeln!(out, "{line}")?;
                written += 1;
            }
        }
    }
    Ok(written)
}

fn align_one(corpus: &ReferenceCorpus, queries: &[QueryRecord], record: LocateRecord) -> Option<String> {
    let query = queries.get(record.query_index as usize)?;
    let refseq = corpus
        .refs
        .get(record.bin as usize)?
        .get(record.ref_seq as usize)?;

    let start = (record.ref_pos.saturating_sub(1) as usize).min(refseq.len());
    let slice_len = (query.ranks.len() + 1).min(refseq.len() - start);
    let slice = &refseq[start..start + slice_len];

    let alignment = align(slice, &query.ranks)?;
    let ref_offset = start + alignment.begin_on_ref + 1;
    let ref_id = corpus
        .ref_ids
        .get(record.bin as usize)?
        .get(record.ref_seq as usize)?;
    let mapq = mapq_from_score(alignment.score);
    let cigar = cigar_to_string(&alignment.cigar);

    Some(format!(
        "{}\t0\t{}\t{}\t{}\t{}\t*\t0\t0\t{}\t*",
        query.id,
        ref_id,
        ref_offset,
        mapq,
        cigar,
        sequence_string(&query.ranks),
    ))
}

fn sequence_string(ranks: &[u8]) -> String {
    ranks
        .iter()
        .map(|&r| match r {
            1 => 'A',
            2 => 'C',
            3 => 'G',
            4 => 'T',
            _ => 'N',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_and_formats_a_sam_line() {
        let corpus = ReferenceCorpus {
            ref_ids: vec![vec!["chr1".to_string()]],
            refs: vec![vec![vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]]], // ACGTACGTACGT
        };
        let queries = vec![QueryRecord {
            id: "read0".to_string(),
            ranks: vec![1, 2, 3, 4], // ACGT
        }];
        let record = LocateRecord {
            bin: 0,
            ref_seq: 0,
            ref_pos: 1,
            query_index: 0,
        };
        let line = align_one(&corpus, &queries, record).unwrap();
        assert!(line.starts_with("read0\t0\tchr1\t"));
        assert!(line.contains("4M"));
    }

    #[test]
    fn writes_one_line_per_dequeued_record() {
        let corpus = ReferenceCorpus {
            ref_ids: vec![vec!["chr1".to_string()]],
            refs: vec![vec![vec![1, 2, 3, 4, 1, 2, 3, 4]]],
        };
        let queries = vec![QueryRecord {
            id: "read0".to_string(),
            ranks: vec![1, 2, 3, 4],
        }];

        let q2 = CartQueue::<LocateRecord>::new(1, 1, 4).unwrap();
        q2.enqueue(
            0,
            LocateRecord {
                bin: 0,
                ref_seq: 0,
                ref_pos: 1,
                query_index: 0,
            },
        )
        .unwrap();
        q2.close();

        let mut out = Vec::new();
        let written = run(&corpus, &queries, &q2, &mut out).unwrap();
        assert_eq!(written, 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
