//! Command-line interface for the `pwalign` crate.
//!
//! Subcommands are implemented in separate files (modules) under `src/bin/pwalign/`:
//! - `pair_cmd.rs` (`nt2nt`, `aa2aa`, `nt2aa`)
//! - `splice_cmd.rs`
//! - `backtrans_cmd.rs`
//!
//! Pairs are read in lockstep from two FASTA files; each pair prints a header
//! line `>name1 len1 start1 end1 name2 len2 start2 end2 score` (tab
//! separated), the alignment rows and a `//` terminator.
use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use pwalign::AlnParam;

#[derive(Debug, Parser)]
#[command(name="pwalign", version=env!("CARGO_PKG_VERSION"), about="PairWise ALIGNment: banded, frame-shift and spliced dynamic programming", disable_help_subcommand=true)]
struct Cli {
    /// Log debug messages (per-alignment summaries, band widening).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Nucleotide vs nucleotide (IUPAC matrix, banded).
    Nt2nt(pair_cmd::PairCmd),
    /// Protein vs protein (BLOSUM62, banded).
    Aa2aa(pair_cmd::PairCmd),
    /// Nucleotide (first file) vs protein (second file), frame-shift aware.
    Nt2aa(pair_cmd::PairCmd),
    /// Genomic DNA (first file) vs spliced transcript (second file).
    Splice(splice_cmd::SpliceCmd),
    /// Map an aligned protein FASTA onto its coding sequences.
    Backtrans(backtrans_cmd::BacktransCmd),
}

#[path = "pwalign/pair_cmd.rs"] mod pair_cmd;
#[path = "pwalign/splice_cmd.rs"] mod splice_cmd;
#[path = "pwalign/backtrans_cmd.rs"] mod backtrans_cmd;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut logger = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Command::Nt2nt(cmd) => pair_cmd::run(cmd, AlnParam::nt2nt()),
        Command::Aa2aa(cmd) => pair_cmd::run(cmd, AlnParam::aa2aa()),
        Command::Nt2aa(cmd) => pair_cmd::run(cmd, AlnParam::aa2nt()),
        Command::Splice(cmd) => splice_cmd::run(cmd),
        Command::Backtrans(cmd) => backtrans_cmd::run(cmd),
    }
}
