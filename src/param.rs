//! Alignment parameters shared by every core.
//!
//! [`AlnParam`] is a plain value: build it from one of the named presets and
//! override single fields with the `with_*` builders. Cores only read it, so
//! one value may be shared by any number of concurrent alignments.
//!
//! | preset            | open | ext | end | frame shift | splice good/bad | matrix   | band |
//! |-------------------|------|-----|-----|-------------|-----------------|----------|------|
//! | `nt2nt`           | 10   | 2   | 2   | -           | -               | nt16 5/-4 | 75  |
//! | `aa2aa`           | 12   | 2   | 2   | -           | -               | BLOSUM62 | 50   |
//! | `aa2nt`           | 12   | 2   | 2   | 20          | -               | BLOSUM62 | 50   |
//! | `splice`          | 500  | 50  | 50  | -           | 1500 / 2200     | nt4 hs   | -    |
//! | `splice_strict`   | 900  | 50  | 50  | -           | 1900 / 2900     | nt4 hs   | -    |
//!
//! ### Example
//! ```
//! use pwalign::AlnParam;
//! let ap = AlnParam::aa2aa().with_gap_open(11).with_band_width(20);
//! assert!(ap.validate().is_ok());
//! assert_eq!(ap.gap_extend, 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::common::AlignError;
use crate::matrix::ScoreMatrix;

/// Default ceiling for the band-doubling search of the local banded core.
pub const DEFAULT_MAX_BAND_WIDTH: usize = 1000;

/// Immutable configuration consumed by the alignment cores.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlnParam {
    /// Cost of opening a gap (first gapped residue included).
    pub gap_open: i32,
    /// Cost of each further gapped residue.
    pub gap_extend: i32,
    /// Per-residue cost of gaps touching either sequence end. `None` charges
    /// end gaps like interior ones.
    pub gap_end: Option<i32>,
    /// Cost of a one- or two-nucleotide frame shift (protein vs nucleotide).
    pub frame_shift: Option<i32>,
    /// Cost of a canonical `GT...AG` intron.
    pub good_splice: Option<i32>,
    /// Cost of a non-canonical intron boundary.
    pub bad_splice: Option<i32>,
    /// Mean matrix score of the splice presets; see [`AlnParam::apply_matrix_mean`].
    pub matrix_mean: Option<i32>,
    /// Substitution matrix; its size fixes the alphabet.
    pub matrix: ScoreMatrix,
    /// Half-width of the diagonal band added to the length difference.
    pub band_width: usize,
    /// Largest band width tried when the local core re-aligns its window.
    pub max_band_width: usize,
}

impl Default for AlnParam {
    fn default() -> Self {
        Self::nt2nt()
    }
}

impl AlnParam {
    /// Nucleotide vs nucleotide over the IUPAC alphabet.
    pub fn nt2nt() -> Self {
        Self {
            gap_open: 10,
            gap_extend: 2,
            gap_end: Some(2),
            frame_shift: None,
            good_splice: None,
            bad_splice: None,
            matrix_mean: None,
            matrix: ScoreMatrix::nt16(5, -4),
            band_width: 75,
            max_band_width: DEFAULT_MAX_BAND_WIDTH,
        }
    }

    /// Protein vs protein with BLOSUM62.
    pub fn aa2aa() -> Self {
        Self {
            gap_open: 12,
            gap_extend: 2,
            gap_end: Some(2),
            frame_shift: None,
            good_splice: None,
            bad_splice: None,
            matrix_mean: None,
            matrix: ScoreMatrix::blosum62(),
            band_width: 50,
            max_band_width: DEFAULT_MAX_BAND_WIDTH,
        }
    }

    /// Protein vs (translated) nucleotide with frame-shift penalty 20.
    pub fn aa2nt() -> Self {
        Self { frame_shift: Some(20), ..Self::aa2aa() }
    }

    /// Genomic DNA vs spliced transcript.
    pub fn splice() -> Self {
        Self {
            gap_open: 500,
            gap_extend: 50,
            gap_end: Some(50),
            frame_shift: None,
            good_splice: Some(1500),
            bad_splice: Some(2200),
            matrix_mean: Some(-43),
            matrix: ScoreMatrix::nt4_hs(),
            band_width: 75,
            max_band_width: DEFAULT_MAX_BAND_WIDTH,
        }
    }

    /// Like [`AlnParam::splice`] with dearer gaps and introns; fewer spurious
    /// short introns.
    pub fn splice_strict() -> Self {
        Self { gap_open: 900, good_splice: Some(1900), bad_splice: Some(2900), ..Self::splice() }
    }

    pub fn with_gap_open(mut self, v: i32) -> Self {
        self.gap_open = v;
        self
    }

    pub fn with_gap_extend(mut self, v: i32) -> Self {
        self.gap_extend = v;
        self
    }

    pub fn with_gap_end(mut self, v: Option<i32>) -> Self {
        self.gap_end = v;
        self
    }

    pub fn with_frame_shift(mut self, v: Option<i32>) -> Self {
        self.frame_shift = v;
        self
    }

    /// Set both splice costs.
    pub fn with_splice(mut self, good: i32, bad: i32) -> Self {
        self.good_splice = Some(good);
        self.bad_splice = Some(bad);
        self
    }

    pub fn with_matrix(mut self, m: ScoreMatrix) -> Self {
        self.matrix = m;
        self
    }

    pub fn with_band_width(mut self, v: usize) -> Self {
        self.band_width = v;
        self
    }

    pub fn with_max_band_width(mut self, v: usize) -> Self {
        self.max_band_width = v;
        self
    }

    /// Alphabet implied by the matrix size.
    pub fn alphabet(&self) -> Result<Alphabet, AlignError> {
        Alphabet::from_size(self.matrix.size)
            .ok_or(AlignError::InvalidParam("matrix size does not match any alphabet"))
    }

    /// Subtract [`AlnParam::matrix_mean`] from the matrix, if set.
    pub fn apply_matrix_mean(&mut self) {
        if let Some(mean) = self.matrix_mean {
            self.matrix.shift_mean(mean);
        }
    }

    /// Check the invariants every core relies on.
    pub fn validate(&self) -> Result<(), AlignError> {
        if self.gap_open < 0 || self.gap_extend < 0 {
            return Err(AlignError::InvalidParam("gap penalties must be non-negative"));
        }
        if self.gap_extend > self.gap_open {
            return Err(AlignError::InvalidParam("gap_extend must not exceed gap_open"));
        }
        if matches!(self.gap_end, Some(e) if e < 0) {
            return Err(AlignError::InvalidParam("gap_end must be non-negative"));
        }
        if matches!(self.frame_shift, Some(f) if f < 0) {
            return Err(AlignError::InvalidParam("frame-shift penalty must be non-negative"));
        }
        if matches!(self.good_splice, Some(g) if g < 0) || matches!(self.bad_splice, Some(b) if b < 0) {
            return Err(AlignError::InvalidParam("splice penalties must be non-negative"));
        }
        if self.band_width == 0 || self.max_band_width == 0 {
            return Err(AlignError::InvalidParam("band width must be positive"));
        }
        if self.matrix.scores.len() != self.matrix.size * self.matrix.size {
            return Err(AlignError::InvalidParam("matrix is not square"));
        }
        self.alphabet().map(|_| ())
    }

    /// Frame-shift penalty, required by the protein-vs-nucleotide cores.
    pub fn frame_shift_penalty(&self) -> Result<i32, AlignError> {
        self.frame_shift.ok_or(AlignError::InvalidParam("frame-shift penalty is not set"))
    }

    /// `(good, bad)` splice costs, required by the splice cores.
    pub fn splice_penalties(&self) -> Result<(i32, i32), AlignError> {
        match (self.good_splice, self.bad_splice) {
            (Some(g), Some(b)) => Ok((g, b)),
            _ => Err(AlignError::InvalidParam("splice penalties are not set")),
        }
    }

    /// Whether the splice core should handle this configuration.
    pub fn is_splice(&self) -> bool {
        matches!(self.good_splice, Some(g) if g > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for ap in [AlnParam::nt2nt(), AlnParam::aa2aa(), AlnParam::aa2nt(), AlnParam::splice(), AlnParam::splice_strict()] {
            assert!(ap.validate().is_ok(), "{ap:?}");
        }
        assert_eq!(AlnParam::default(), AlnParam::nt2nt());
    }

    #[test]
    fn preset_alphabets() {
        assert_eq!(AlnParam::nt2nt().alphabet(), Ok(Alphabet::Nt16));
        assert_eq!(AlnParam::aa2nt().alphabet(), Ok(Alphabet::Amino));
        assert_eq!(AlnParam::splice().alphabet(), Ok(Alphabet::Nt4));
        assert!(AlnParam::splice().is_splice());
        assert!(!AlnParam::aa2nt().is_splice());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AlnParam::nt2nt().with_band_width(0).validate().is_err());
        assert!(AlnParam::nt2nt().with_gap_extend(20).validate().is_err());
        assert!(AlnParam::nt2nt().with_gap_end(Some(-1)).validate().is_err());
        let odd = ScoreMatrix::from_scores(3, vec![0; 9]).unwrap();
        assert!(AlnParam::nt2nt().with_matrix(odd).validate().is_err());
    }

    #[test]
    fn required_penalties() {
        assert_eq!(AlnParam::aa2nt().frame_shift_penalty(), Ok(20));
        assert!(AlnParam::aa2aa().frame_shift_penalty().is_err());
        assert_eq!(AlnParam::splice_strict().splice_penalties(), Ok((1900, 2900)));
        assert!(AlnParam::nt2nt().splice_penalties().is_err());
    }

    #[test]
    fn matrix_mean_shift() {
        let mut ap = AlnParam::splice();
        let before = ap.matrix.score(0, 0);
        ap.apply_matrix_mean();
        assert_eq!(ap.matrix.score(0, 0), before + 43);
    }
}
