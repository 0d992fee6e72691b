use std::collections::HashMap;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use log::warn;
use pwalign::*;

use crate::pair_cmd::read_fasta;

/// Options for the `backtrans` subcommand.
#[derive(Debug, Args)]
pub struct BacktransCmd {
    /// Aligned protein FASTA (gapped rows).
    #[arg(value_name = "ALIGNMENT")]
    pub alignment: PathBuf,
    /// Coding sequences, matched to the rows by identifier.
    #[arg(value_name = "CDS")]
    pub cds: PathBuf,
    /// Frame-shift penalty.
    #[arg(short = 's', long, value_name = "NUM")]
    pub frame_shift: Option<i32>,
}

fn flaw_names(f: &Flaws) -> Vec<&'static str> {
    [
        (f.insertion, "insertion"),
        (f.deletion, "deletion"),
        (f.frame_shift, "frame_shift"),
        (f.no_head, "no_head"),
        (f.no_tail, "no_tail"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect()
}

pub fn run(cmd: BacktransCmd) -> Result<()> {
    let mut ap = AlnParam::aa2nt();
    if let Some(v) = cmd.frame_shift {
        ap.frame_shift = Some(v);
    }
    let rows = read_fasta(&cmd.alignment)?;
    let cds: HashMap<String, String> = read_fasta(&cmd.cds)?.into_iter().map(|r| (r.id, r.seq)).collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &rows {
        let nt = cds.get(&row.id).ok_or_else(|| anyhow!("no coding sequence for {}", row.id))?;
        let bt = back_translate(&row.seq, nt, &ap)?;
        if !bt.flaws.is_clean() {
            warn!("{}: {} (identity {}%)", row.id, flaw_names(&bt.flaws).join(","), bt.identity);
        }
        writeln!(out, ">{}\n{}", row.id, bt.aligned_nt)?;
    }
    out.flush()?;
    Ok(())
}
