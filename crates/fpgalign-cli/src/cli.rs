//! Argument parsing: the `build` and `search` subcommands via `clap`'s
//! derive API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fpgalign", about = "Streaming approximate read-mapping pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Precompute per-bin Bloom filter and FM-index artifacts from a FASTA manifest.
    Build {
        /// One line per bin, whitespace-separating one or more FASTA paths.
        #[arg(long)]
        input: PathBuf,

        /// Output prefix; writes `P.ibf`, `P.meta`, `P.i.fmindex`, `P.i.ref`.
        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value_t = 1)]
        threads: usize,

        #[arg(long = "kmer", default_value_t = 20)]
        kmer_size: u8,

        #[arg(long = "window", default_value_t = 60)]
        window_size: u8,

        #[arg(long = "fpr", default_value_t = 0.05)]
        fpr: f64,

        #[arg(long = "hash", default_value_t = 2)]
        hash_count: u8,
    },

    /// Search a query FASTA against a built index, producing SAM output.
    Search {
        /// Index prefix produced by `build --output`.
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        query: PathBuf,

        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value_t = 1)]
        threads: usize,

        #[arg(long, default_value_t = 0)]
        errors: u8,

        #[arg(long = "queue-capacity", default_value_t = 64)]
        queue_capacity: usize,
    },
}
