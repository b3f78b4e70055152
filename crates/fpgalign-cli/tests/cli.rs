//! End-to-end CLI tests driving the compiled `fpgalign` binary, covering
//! the build/search round trip and the cases that are only observable
//! through the CLI surface (exit codes, file I/O, the `[Warning]` stderr
//! contract).

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_fasta(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn build_then_search_exact_match_scenario_1() {
    let dir = tempfile::tempdir().unwrap();
    let refseq = write_fasta(dir.path(), "ref.fa", ">chr1\nACGTACGTACGT\n");
    let manifest = dir.path().join("manifest.txt");
    std::fs::write(&manifest, format!("{}\n", refseq.display())).unwrap();
    let index_prefix = dir.path().join("idx");

    Command::cargo_bin("fpgalign")
        .unwrap()
        .args([
            "build",
            "--input",
            manifest.to_str().unwrap(),
            "--output",
            index_prefix.to_str().unwrap(),
            "--kmer",
            "3",
            "--window",
            "3",
        ])
        .assert()
        .success();

    let query = write_fasta(dir.path(), "query.fa", ">read0\nACGT\n");
    let sam_out = dir.path().join("out.sam");

    Command::cargo_bin("fpgalign")
        .unwrap()
        .args([
            "search",
            "--input",
            index_prefix.to_str().unwrap(),
            "--query",
            query.to_str().unwrap(),
            "--output",
            sam_out.to_str().unwrap(),
            "--errors",
            "0",
        ])
        .assert()
        .success();

    let sam = std::fs::read_to_string(&sam_out).unwrap();
    assert!(sam.contains("4M"));
    let fields: Vec<&str> = sam.lines().next().unwrap().split('\t').collect();
    assert_eq!(fields[2], "chr1");
    let pos: u32 = fields[3].parse().unwrap();
    assert!([1, 5, 9].contains(&pos));
    assert_eq!(fields[4], "60");
}

#[test]
fn short_reference_warns_and_produces_no_matches() {
    // k=4, w=8, reference length 7 -> [Warning], exit 0, no SAM rows.
    let dir = tempfile::tempdir().unwrap();
    let refseq = write_fasta(dir.path(), "ref.fa", ">tiny\nACGTACG\n");
    let manifest = dir.path().join("manifest.txt");
    std::fs::write(&manifest, format!("{}\n", refseq.display())).unwrap();
    let index_prefix = dir.path().join("idx");

    Command::cargo_bin("fpgalign")
        .unwrap()
        .args([
            "build",
            "--input",
            manifest.to_str().unwrap(),
            "--output",
            index_prefix.to_str().unwrap(),
            "--kmer",
            "4",
            "--window",
            "8",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("[Warning]"));

    let query = write_fasta(dir.path(), "query.fa", ">read0\nACGT\n");
    let sam_out = dir.path().join("out.sam");

    Command::cargo_bin("fpgalign")
        .unwrap()
        .args([
            "search",
            "--input",
            index_prefix.to_str().unwrap(),
            "--query",
            query.to_str().unwrap(),
            "--output",
            sam_out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let sam = std::fs::read_to_string(&sam_out).unwrap();
    assert!(sam.is_empty());
}

#[test]
fn missing_input_manifest_is_a_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("fpgalign")
        .unwrap()
        .args([
            "build",
            "--input",
            dir.path().join("does-not-exist.txt").to_str().unwrap(),
            "--output",
            dir.path().join("idx").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[Error]"));
}
