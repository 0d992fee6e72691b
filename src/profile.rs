//! Query score profiles.
//!
//! For a reference sequence `seq` and matrix `m`, the profile row of residue
//! `c` is `[m(c, seq[0]), m(c, seq[1]), ...]`. Inner DP loops walk one row
//! while the other sequence's residue stays fixed, turning the substitution
//! lookup into a sequential array read.

use crate::common::AlignError;
use crate::matrix::ScoreMatrix;

/// Dense `size x len` table of substitution scores against one sequence.
#[derive(Clone, Debug)]
pub struct ScoreProfile {
    size: usize,
    len: usize,
    scores: Vec<i32>,
}

impl ScoreProfile {
    /// Build the profile of `seq`. Fails if a code does not index `matrix`.
    pub fn new(seq: &[u8], matrix: &ScoreMatrix) -> Result<Self, AlignError> {
        check_codes(seq, matrix.size)?;
        let (size, len) = (matrix.size, seq.len());
        let mut scores = Vec::with_capacity(size * len);
        for c in 0..size {
            let row = matrix.row(c as u8);
            scores.extend(seq.iter().map(|&s| row[s as usize]));
        }
        Ok(Self { size, len, scores })
    }

    /// Scores of residue `c` against every position of the profiled sequence.
    #[inline]
    pub fn row(&self, c: u8) -> &[i32] {
        let start = c as usize * self.len;
        &self.scores[start..start + self.len]
    }

    /// Length of the profiled sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn alphabet_size(&self) -> usize {
        self.size
    }
}

/// Reject residue codes that do not index a `size x size` matrix.
pub(crate) fn check_codes(seq: &[u8], size: usize) -> Result<(), AlignError> {
    match seq.iter().find(|&&c| c as usize >= size) {
        Some(&code) => Err(AlignError::InvalidCode { code, size }),
        None => Ok(()),
    }
}
