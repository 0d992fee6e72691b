use anyhow::Result;
use clap::Args;
use pwalign::*;

use crate::pair_cmd::{self, PairCmd};

/// Options for the `splice` subcommand.
#[derive(Debug, Args)]
pub struct SpliceCmd {
    #[command(flatten)]
    pub pair: PairCmd,
    /// Use the plain splice preset (cheaper gaps and introns) instead of the strict one.
    #[arg(short = 'a', long)]
    pub plain: bool,
    /// Only report the boundaries of the best local block.
    #[arg(short = 'd', long)]
    pub bounds: bool,
    /// Cost of a canonical GT..AG intron.
    #[arg(short = 'g', long, value_name = "NUM")]
    pub good_splice: Option<i32>,
    /// Cost of an intron with non-canonical boundaries.
    #[arg(short = 'b', long, value_name = "NUM")]
    pub bad_splice: Option<i32>,
}

pub fn run(cmd: SpliceCmd) -> Result<()> {
    let preset = if cmd.plain { AlnParam::splice() } else { AlnParam::splice_strict() };
    let mut ap = cmd.pair.params(preset);
    if let Some(v) = cmd.good_splice {
        ap.good_splice = Some(v);
    }
    if let Some(v) = cmd.bad_splice {
        ap.bad_splice = Some(v);
    }
    let mode = if cmd.bounds { AlignMode::Bounds } else { cmd.pair.mode() };
    pair_cmd::run_with(&cmd.pair, &ap, mode)
}
