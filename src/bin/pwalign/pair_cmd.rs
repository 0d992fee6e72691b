use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::warn;
use pwalign::*;

/// Options shared by the aligning subcommands.
#[derive(Debug, Args)]
pub struct PairCmd {
    /// FASTA file with the first sequence of every pair.
    #[arg(value_name = "SEQ1")]
    pub seq1: PathBuf,
    /// FASTA file with the second sequence of every pair.
    #[arg(value_name = "SEQ2")]
    pub seq2: PathBuf,
    /// Generate a full (global) alignment instead of a local one.
    #[arg(short = 'f', long)]
    pub full: bool,
    /// Gap open penalty.
    #[arg(short = 'o', long, value_name = "NUM")]
    pub gap_open: Option<i32>,
    /// Gap extension penalty.
    #[arg(short = 'e', long, value_name = "NUM")]
    pub gap_extend: Option<i32>,
    /// Per-residue penalty of end gaps (nt2nt, aa2aa).
    #[arg(short = 'n', long, value_name = "NUM")]
    pub gap_end: Option<i32>,
    /// Frame-shift penalty (nt2aa).
    #[arg(short = 's', long, value_name = "NUM")]
    pub frame_shift: Option<i32>,
    /// Band width.
    #[arg(short = 'w', long, value_name = "NUM")]
    pub band_width: Option<usize>,
    /// Print coding segments between frame shifts (nt2aa).
    #[arg(short = 'm', long)]
    pub misc: bool,
}

impl PairCmd {
    /// Apply the command-line overrides to a preset.
    pub fn params(&self, mut ap: AlnParam) -> AlnParam {
        if let Some(v) = self.gap_open {
            ap.gap_open = v;
        }
        if let Some(v) = self.gap_extend {
            ap.gap_extend = v;
        }
        if let Some(v) = self.gap_end {
            ap.gap_end = Some(v);
        }
        if let Some(v) = self.frame_shift {
            ap.frame_shift = Some(v);
        }
        if let Some(v) = self.band_width {
            ap.band_width = v;
        }
        ap
    }

    pub fn mode(&self) -> AlignMode {
        if self.full { AlignMode::Global } else { AlignMode::Local }
    }
}

pub fn read_fasta(path: &Path) -> Result<Vec<FastaRecord>> {
    let text = fs::read_to_string(path).with_context(|| format!("open FASTA: {}", path.display()))?;
    Ok(parse_fasta(&text))
}

pub fn run(cmd: PairCmd, preset: AlnParam) -> Result<()> {
    let ap = cmd.params(preset);
    let mode = cmd.mode();
    run_with(&cmd, &ap, mode)
}

/// Align the records of both files pairwise and print them to stdout.
pub fn run_with(cmd: &PairCmd, ap: &AlnParam, mode: AlignMode) -> Result<()> {
    ap.validate()?;
    let core = select_core(ap)?;
    let recs1 = read_fasta(&cmd.seq1)?;
    let recs2 = read_fasta(&cmd.seq2)?;
    if recs1.len() != recs2.len() {
        warn!("{} and {} records; extra records are ignored", recs1.len(), recs2.len());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (r1, r2) in recs1.iter().zip(&recs2) {
        let res = match align(&r1.seq, &r2.seq, ap, mode) {
            Ok(res) => res,
            Err(AlignError::NoAlignment) => {
                warn!("{} vs {}: nothing to align", r1.id, r2.id);
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("aligning {} against {}", r1.id, r2.id)),
        };
        write_header(&mut out, r1, r2, &res)?;
        match (core, res.bounds) {
            (_, Some(_)) => {}
            (Core::Splice, None) => {
                let (gen, est) = (Alphabet::Nt4.encode(&r1.seq), Alphabet::Nt4.encode(&r2.seq));
                let blocks = render_exons(&res.alignment, &res.exons, &gen, &est);
                if !blocks.is_empty() {
                    writeln!(out, "{blocks}")?;
                }
            }
            _ => writeln!(out, "{}", res.rendered)?,
        }
        if res.bounds.is_none() {
            writeln!(out, "//")?;
        }
        if cmd.misc && core == Core::FrameShift {
            write_segments(&mut out, r1, r2, &res.alignment)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn write_header(out: &mut impl Write, r1: &FastaRecord, r2: &FastaRecord, res: &PairAlignment) -> io::Result<()> {
    let ((si, sj), (ei, ej)) = match res.bounds {
        Some(b) => ((b.gen_start, b.est_start), (b.gen_stop, b.est_stop)),
        None => (res.alignment.start(), res.alignment.end()),
    };
    writeln!(
        out,
        ">{}\t{}\t{si}\t{ei}\t{}\t{}\t{sj}\t{ej}\t{}",
        r1.id,
        r1.seq.len(),
        r2.id,
        r2.seq.len(),
        res.alignment.score
    )
}

/// `NT`/`PT` line pairs, one per run between frame shifts.
fn write_segments(out: &mut impl Write, nt: &FastaRecord, prot: &FastaRecord, aln: &Alignment) -> io::Result<()> {
    let letters = |seq: &str, a: Alphabet| -> Vec<char> { seq.chars().filter(|&c| a.code(c).is_some()).collect() };
    let (nt_chars, aa_chars) = (letters(&nt.seq, Alphabet::Nt4), letters(&prot.seq, Alphabet::Amino));
    let span = |chars: &[char], start: usize, end: usize| -> String {
        chars.get(start.saturating_sub(1)..end.min(chars.len())).map(|s| s.iter().collect()).unwrap_or_default()
    };
    for seg in coding_segments(aln) {
        let nt_seq = span(&nt_chars, seg.nt_start, seg.nt_end);
        let aa_seq = span(&aa_chars, seg.prot_start, seg.prot_end);
        writeln!(out, "NT {}\t{}\t{}\t{nt_seq}", nt.id, seg.nt_start, seg.nt_end)?;
        writeln!(out, "PT {}\t{}\t{}\t{aa_seq}", prot.id, seg.prot_start, seg.prot_end)?;
    }
    Ok(())
}
