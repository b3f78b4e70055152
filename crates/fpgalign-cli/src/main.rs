//! `fpgalign` CLI entry point: parses `build`/`search`, wires
//! `tracing-subscriber` for structured progress output, and maps any
//! uncaught [`fpgalign_core::FpgAlignError`] to a colored `[Error] ` stderr
//! line with a nonzero exit code.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use fpgalign_core::build::{run_build, BuildConfig};
use fpgalign_core::config::Config;
use fpgalign_core::diagnostics::print_error;
use fpgalign_core::model::{QueryRecord, ReferenceCorpus};
use fpgalign_core::persistence::{read_fmindex, read_ibf, read_meta, read_ref_store, ArtifactPaths};
use fpgalign_core::pipeline::run_search;
use fpgalign_core::reference::read_fasta;
use fpgalign_core::Result;

use cli::{Cli, Command};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build {
            input,
            output,
            threads: _,
            kmer_size,
            window_size,
            fpr,
            hash_count,
        } => run_build_command(&input, &output, kmer_size, window_size, fpr, hash_count),
        Command::Search {
            input,
            query,
            output,
            threads,
            errors,
            queue_capacity,
        } => run_search_command(&input, &query, &output, threads, errors, queue_capacity),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error(&err.to_string());
            ExitCode::from(255)
        }
    }
}

fn run_build_command(
    input: &std::path::Path,
    output: &std::path::Path,
    kmer_size: u8,
    window_size: u8,
    fpr: f64,
    hash_count: u8,
) -> Result<()> {
    let config = BuildConfig {
        kmer_size,
        window_size,
        hash_count,
        fpr,
    };
    let bins = run_build(input, output, &config)?;
    tracing::info!(bins, "build complete");
    Ok(())
}

fn run_search_command(
    input: &std::path::Path,
    query: &std::path::Path,
    output: &std::path::Path,
    threads: usize,
    errors: u8,
    queue_capacity: usize,
) -> Result<()> {
    let artifacts = ArtifactPaths::new(input);
    let meta = read_meta(&artifacts.meta())?;
    let ibf = read_ibf(&artifacts.ibf())?;
    meta.check_consistent_bins(ibf.number_of_bins)?;

    let mut refs = Vec::with_capacity(meta.number_of_bins as usize);
    for bin in 0..meta.number_of_bins {
        refs.push(read_ref_store(&artifacts.ref_store(bin))?);
        // Touch the fmindex artifact here too, so a missing/corrupt bin
        // index surfaces as a fatal Io error before the pipeline starts
        // rather than partway through a background worker.
        let _ = read_fmindex(&artifacts.fmindex(bin))?;
    }
    let corpus = ReferenceCorpus {
        ref_ids: meta.ref_ids.clone(),
        refs,
    };

    let query_records: Vec<QueryRecord> = read_fasta(query)?
        .into_iter()
        .map(|r| QueryRecord {
            id: r.id,
            ranks: r.ranks,
        })
        .collect();

    let config = Config {
        kmer_size: meta.kmer_size,
        window_size: meta.window_size,
        hash_count: ibf.hash_count,
        fpr: 0.05, // not re-used at search time beyond build; kept for Config's shape
        errors,
        threads,
        queue_capacity,
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        query: Some(query.to_path_buf()),
    };
    config.validate()?;

    let out_file = std::fs::File::create(output)?;
    let mut writer = std::io::BufWriter::new(out_file);
    let written = run_search(&config, &artifacts, &ibf, &corpus, &query_records, &mut writer)?;
    tracing::info!(written, "search complete");
    Ok(())
}
