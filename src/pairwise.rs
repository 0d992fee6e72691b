//! Text-level entry point: encode, pick a core, align, render.
//!
//! The core is a pure function of the parameters:
//!
//! 1. splice penalties set: the splice core (`seq1` genomic, `seq2` transcript);
//! 2. a nucleotide matrix: the banded core;
//! 3. a protein matrix with a frame-shift penalty: the frame-shift core
//!    (`seq1` nucleotide, `seq2` protein);
//! 4. otherwise the banded core over proteins.
//!
//! ### Example
//! ```
//! use pwalign::{align, AlignMode, AlnParam};
//! let res = align("MAIVMGR", "MAIVLGR", &AlnParam::aa2aa(), AlignMode::Global).unwrap();
//! assert_eq!(res.rendered.markers, "||||+||");
//! ```

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::banded;
use crate::common::AlignError;
use crate::frameshift;
use crate::param::AlnParam;
use crate::path::Alignment;
use crate::render::{self, Rendered};
use crate::splice::{self, Exon, SpliceBounds};

/// Which part of the DP matrix is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlignMode {
    /// Best-scoring sub-alignment.
    #[default]
    Local,
    /// End-to-end alignment.
    Global,
    /// Coordinates of the best local block only (splice core).
    Bounds,
}

/// Alignment engine chosen for a parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Core {
    Banded,
    FrameShift,
    Splice,
}

/// Pick the core that handles `ap`.
pub fn select_core(ap: &AlnParam) -> Result<Core, AlignError> {
    if ap.is_splice() {
        return Ok(Core::Splice);
    }
    let alphabet = ap.alphabet()?;
    if alphabet.is_nucleotide() {
        return Ok(Core::Banded);
    }
    Ok(match ap.frame_shift {
        Some(fs) if fs > 0 => Core::FrameShift,
        _ => Core::Banded,
    })
}

/// Everything one call of [`align`] produces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairAlignment {
    pub alignment: Alignment,
    pub rendered: Rendered,
    /// Intron-free runs; splice core only.
    pub exons: Vec<Exon>,
    /// Set in [`AlignMode::Bounds`].
    pub bounds: Option<SpliceBounds>,
}

/// Align two text sequences under `ap`.
pub fn align(seq1: &str, seq2: &str, ap: &AlnParam, mode: AlignMode) -> Result<PairAlignment, AlignError> {
    let core = select_core(ap)?;
    debug!("aligning {} x {} with {core:?} core, mode {mode:?}", seq1.len(), seq2.len());
    if mode == AlignMode::Bounds && core != Core::Splice {
        return Err(AlignError::InvalidParam("boundary-only alignment needs splice penalties"));
    }
    match core {
        Core::Splice => {
            let (gen, est) = (Alphabet::Nt4.encode(seq1), Alphabet::Nt4.encode(seq2));
            let alignment = match mode {
                AlignMode::Bounds => {
                    let b = splice::bound_core(&gen, &est, ap)?;
                    return Ok(PairAlignment {
                        alignment: Alignment::new(Vec::new(), b.score),
                        bounds: Some(b),
                        ..Default::default()
                    });
                }
                AlignMode::Global => splice::global_core(&gen, &est, ap)?,
                AlignMode::Local => splice::local_core(&gen, &est, ap)?,
            };
            let rendered = render::render_splice(&alignment, &gen, &est);
            let exons = splice::extract_exons(&alignment);
            Ok(PairAlignment { alignment, rendered, exons, bounds: None })
        }
        Core::FrameShift => {
            let (nt, protein) = (Alphabet::Nt4.encode(seq1), Alphabet::Amino.encode(seq2));
            let alignment = match mode {
                AlignMode::Global => frameshift::global_core(&nt, &protein, ap)?,
                _ => frameshift::local_core(&nt, &protein, ap)?,
            };
            let rendered = render::render_frame(&alignment, &nt, &protein, &ap.matrix);
            Ok(PairAlignment { alignment, rendered, ..Default::default() })
        }
        Core::Banded => {
            let alphabet = ap.alphabet()?;
            let (s1, s2) = (alphabet.encode(seq1), alphabet.encode(seq2));
            let alignment = match mode {
                AlignMode::Global => banded::global_core(&s1, &s2, ap)?,
                _ => banded::local_core(&s1, &s2, ap)?,
            };
            let rendered = render::render_banded(&alignment, &s1, &s2, alphabet, &ap.matrix);
            Ok(PairAlignment { alignment, rendered, ..Default::default() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::EditOp;

    #[test]
    fn dispatch() {
        assert_eq!(select_core(&AlnParam::nt2nt()).unwrap(), Core::Banded);
        assert_eq!(select_core(&AlnParam::aa2aa()).unwrap(), Core::Banded);
        assert_eq!(select_core(&AlnParam::aa2nt()).unwrap(), Core::FrameShift);
        assert_eq!(select_core(&AlnParam::aa2nt().with_frame_shift(Some(0))).unwrap(), Core::Banded);
        assert_eq!(select_core(&AlnParam::splice()).unwrap(), Core::Splice);
        // a frame-shift penalty means nothing to nucleotide matrices
        assert_eq!(select_core(&AlnParam::nt2nt().with_frame_shift(Some(20))).unwrap(), Core::Banded);
    }

    #[test]
    fn nucleotide_local() {
        let res = align("TTTTACGTACGTTTTT", "GGACGTACGGG", &AlnParam::nt2nt(), AlignMode::Local).unwrap();
        assert_eq!(res.alignment.start(), (5, 3));
        assert_eq!(res.alignment.end(), (11, 9));
        assert_eq!(res.alignment.score, 35);
        assert_eq!(res.rendered.top, "ACGTACG");
        assert_eq!(res.rendered.markers, "|||||||");
        assert!(res.exons.is_empty());
    }

    #[test]
    fn frame_shift_text() {
        let res = align("ATGGCCATTGTAATGGGCCGC", "MAIVMGR", &AlnParam::aa2nt(), AlignMode::Global).unwrap();
        assert_eq!(res.rendered.top, "ATGGCCATTGTAATGGGCCGC");
        assert_eq!(res.rendered.bottom, "..M..A..I..V..M..G..R");
        assert_eq!(res.alignment.count(EditOp::Match), 7);
    }

    #[test]
    fn bounds_need_splice() {
        let err = align("ACGTACGT", "ACGT", &AlnParam::nt2nt(), AlignMode::Bounds).unwrap_err();
        assert!(matches!(err, AlignError::InvalidParam(_)));
        let res = align("TTTTTACGTACGTTTTT", "ACGTACGT", &AlnParam::splice(), AlignMode::Bounds).unwrap();
        let b = res.bounds.unwrap();
        assert_eq!((b.gen_start, b.gen_stop, b.est_start, b.est_stop), (6, 13, 1, 8));
        assert!(res.alignment.is_empty());
        assert_eq!(res.alignment.score, b.score);
    }
}
