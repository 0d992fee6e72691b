//! Substitution matrices over the integer codes of [`crate::Alphabet`].
//!
//! A [`ScoreMatrix`] is a dense, row-major `size x size` table. Built-ins:
//!
//! - [`ScoreMatrix::blosum62`] for proteins, extended with rows for `*` and `X`;
//! - [`ScoreMatrix::nt4_hs`], a human/mouse style nucleotide table used by the
//!   splice presets;
//! - [`ScoreMatrix::nt16`] and [`ScoreMatrix::nt4_simple`], plain
//!   match/mismatch schemes;
//! - [`ScoreMatrix::nt4_from_model`], derived from a two-parameter
//!   substitution model.
//!
//! ### Example
//! ```
//! use pwalign::{Alphabet, ScoreMatrix};
//! let m = ScoreMatrix::blosum62();
//! let w = Alphabet::Amino.code('W').unwrap();
//! assert_eq!(m.score(w, w), 11);
//! assert!(m.is_symmetric());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;

/// Square substitution matrix indexed by residue codes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreMatrix {
    /// Number of rows (and columns); equals the alphabet size.
    pub size: usize,
    /// Row-major scores, `size * size` entries.
    pub scores: Vec<i32>,
}

// A,R,N,D,C,Q,E,G,H,I,L,K,M,F,P,S,T,W,Y,V
const BLOSUM62: [[i32; 20]; 20] = [
    [ 4,-1,-2,-2, 0,-1,-1, 0,-2,-1,-1,-1,-1,-2,-1, 1, 0,-3,-2, 0], // A
    [-1, 5, 0,-2,-3, 1, 0,-2, 0,-3,-2, 2,-1,-3,-2,-1,-1,-3,-2,-3], // R
    [-2, 0, 6, 1,-3, 0, 0, 0, 1,-3,-3, 0,-2,-3,-2, 1, 0,-4,-2,-3], // N
    [-2,-2, 1, 6,-3, 0, 2,-1,-1,-3,-4,-1,-3,-3,-1, 0,-1,-4,-3,-3], // D
    [ 0,-3,-3,-3, 9,-3,-4,-3,-3,-1,-1,-3,-1,-2,-3,-1,-1,-2,-2,-1], // C
    [-1, 1, 0, 0,-3, 5, 2,-2, 0,-3,-2, 1, 0,-3,-1, 0,-1,-2,-1,-2], // Q
    [-1, 0, 0, 2,-4, 2, 5,-2, 0,-3,-3, 1,-2,-3,-1, 0,-1,-3,-2,-2], // E
    [ 0,-2, 0,-1,-3,-2,-2, 6,-2,-4,-4,-2,-3,-3,-2, 0,-2,-2,-3,-3], // G
    [-2, 0, 1,-1,-3, 0, 0,-2, 8,-3,-3,-1,-2,-1,-2,-1,-2,-2, 2,-3], // H
    [-1,-3,-3,-3,-1,-3,-3,-4,-3, 4, 2,-3, 1, 0,-3,-2,-1,-3,-1, 3], // I
    [-1,-2,-3,-4,-1,-2,-3,-4,-3, 2, 4,-2, 2, 0,-3,-2,-1,-2,-1, 1], // L
    [-1, 2, 0,-1,-3, 1, 1,-2,-1,-3,-2, 5,-1,-3,-1, 0,-1,-3,-2,-2], // K
    [-1,-1,-2,-3,-1, 0,-2,-3,-2, 1, 2,-1, 5, 0,-2,-1,-1,-1,-1, 1], // M
    [-2,-3,-3,-3,-2,-3,-3,-3,-1, 0, 0,-3, 0, 6,-4,-2,-2, 1, 3,-1], // F
    [-1,-2,-2,-1,-3,-1,-1,-2,-2,-3,-3,-1,-2,-4, 7,-1,-1,-4,-3,-2], // P
    [ 1,-1, 1, 0,-1, 0, 0, 0,-1,-2,-2, 0,-1,-2,-1, 4, 1,-3,-2,-2], // S
    [ 0,-1, 0,-1,-1,-1,-1,-2,-2,-1,-1,-1,-1,-2,-1, 1, 5,-2,-2, 0], // T
    [-3,-3,-4,-4,-2,-2,-3,-2,-2,-3,-2,-3,-1, 1,-4,-3,-2,11, 2,-3], // W
    [-2,-2,-2,-3,-2,-1,-2,-3, 2,-1,-1,-2,-1, 3,-3,-2,-2, 2, 7,-1], // Y
    [ 0,-3,-3,-3,-1,-2,-2,-3,-3, 3, 1,-2, 1,-1,-2,-2, 0,-3,-1, 4], // V
];

// X against A..V
const BLOSUM62_X: [i32; 20] = [0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2, 0, 0, -2, -1, -1];

// A,G,C,T
const NT4_HS: [[i32; 4]; 4] = [
    [  91,  -31, -114, -123],
    [ -31,  100, -125, -114],
    [-114, -125,  100,  -31],
    [-123, -114,  -31,   91],
];

impl ScoreMatrix {
    /// Build from a row-major score vector. `None` if it is not square.
    pub fn from_scores(size: usize, scores: Vec<i32>) -> Option<Self> {
        (scores.len() == size * size).then_some(Self { size, scores })
    }

    /// BLOSUM62 over `ARNDCQEGHILKMFPSTWYV*X`.
    pub fn blosum62() -> Self {
        let n = Alphabet::Amino.size();
        let mut scores = vec![0; n * n];
        for (a, row) in BLOSUM62.iter().enumerate() {
            scores[a * n..a * n + 20].copy_from_slice(row);
        }
        let (stop, x) = (20, 21);
        for a in 0..n {
            scores[a * n + stop] = -4;
            scores[stop * n + a] = -4;
        }
        scores[stop * n + stop] = 1;
        for (a, &s) in BLOSUM62_X.iter().enumerate() {
            scores[a * n + x] = s;
            scores[x * n + a] = s;
        }
        scores[x * n + x] = -1;
        Self { size: n, scores }
    }

    /// Human/mouse nucleotide table over `AGCTN`; `N` scores -100 everywhere.
    pub fn nt4_hs() -> Self {
        let n = Alphabet::Nt4.size();
        let mut scores = vec![-100; n * n];
        for (a, row) in NT4_HS.iter().enumerate() {
            scores[a * n..a * n + 4].copy_from_slice(row);
        }
        Self { size: n, scores }
    }

    /// Match/mismatch over `AGCT`; any pair involving `N` scores `mismatch`.
    pub fn nt4_simple(match_score: i32, mismatch: i32) -> Self {
        let n = Alphabet::Nt4.size();
        let mut scores = vec![mismatch; n * n];
        for a in 0..4 {
            scores[a * n + a] = match_score;
        }
        Self { size: n, scores }
    }

    /// IUPAC matrix: every pair of classes scores the rounded average of
    /// match/mismatch over the concrete bases they stand for.
    pub fn nt16(match_score: i32, mismatch: i32) -> Self {
        let n = Alphabet::Nt16.size();
        let mut scores = vec![mismatch; n * n];
        for a in 1..n {
            for b in 1..n {
                let (mut sum, mut cnt) = (0i32, 0i32);
                for x in (0..4).filter(|&k| (a >> k) & 1 == 1) {
                    for y in (0..4).filter(|&k| (b >> k) & 1 == 1) {
                        sum += if x == y { match_score } else { mismatch };
                        cnt += 1;
                    }
                }
                scores[a * n + b] = (sum as f64 / cnt as f64).round() as i32;
            }
        }
        Self { size: n, scores }
    }

    /// nt4 matrix from a strand-symmetric substitution model.
    ///
    /// `t` is the divergence time, `gc` the equilibrium GC content, `r` the
    /// transition/transversion ratio and `beta` the transversion rate. Scores
    /// are log-odds scaled so that the largest one is 100. Also returns the
    /// expected fraction of identical sites.
    pub fn nt4_from_model(t: f64, gc: f64, r: f64, beta: f64) -> (Self, f64) {
        let (theta1, theta2) = (gc, 1.0 - gc);
        let alpha = 2.0 * beta * r;
        let freq = [theta2 / 2.0, theta1 / 2.0, theta1 / 2.0, theta2 / 2.0];
        let u = 0.5 * (1.0 + (-2.0 * beta * t).exp() - 2.0 * (-(alpha + beta) * t).exp());
        let v = 0.5 * (1.0 - (-2.0 * beta * t).exp());
        let x = (1.0 - u * theta1 - v) / theta2;
        let y = (1.0 - u * theta2 - v) / theta1;
        let ident = x * theta2 * theta2 + y * theta1 * theta1;

        let mut mat = [(2.0 * v).ln(); 25];
        mat[0] = (2.0 * x).ln();
        mat[3 * 5 + 3] = mat[0];
        mat[5 + 1] = (2.0 * y).ln();
        mat[2 * 5 + 2] = mat[5 + 1];
        let ts = (2.0 * u).ln();
        for (a, b) in [(0, 1), (1, 0), (2, 3), (3, 2)] {
            mat[a * 5 + b] = ts;
        }
        for a in 0..4 {
            let expect: f64 = (0..4).map(|b| mat[a * 5 + b] * freq[b]).sum();
            mat[a * 5 + 4] = expect;
            mat[4 * 5 + a] = expect;
        }
        mat[24] = (0..4).map(|b| mat[4 * 5 + b] * freq[b]).sum();

        let top = mat.iter().copied().fold(0.0f64, f64::max);
        let scores = mat.iter().map(|&s| (s / top * 100.0 + 0.5) as i32).collect();
        (Self { size: 5, scores }, ident)
    }

    /// Score of residue `a` against residue `b`. Both must be `< size`.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.scores[a as usize * self.size + b as usize]
    }

    /// One row of the matrix.
    #[inline]
    pub fn row(&self, a: u8) -> &[i32] {
        let start = a as usize * self.size;
        &self.scores[start..start + self.size]
    }

    /// Largest entry.
    pub fn max_score(&self) -> i32 {
        self.scores.iter().copied().max().unwrap_or(0)
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|a| (0..a).all(|b| self.scores[a * self.size + b] == self.scores[b * self.size + a]))
    }

    /// Subtract `mean` from every entry, moving the expected score of random
    /// pairs towards zero.
    pub fn shift_mean(&mut self, mean: i32) {
        for s in self.scores.iter_mut() {
            *s -= mean;
        }
    }

    /// Alphabet implied by the matrix dimension.
    pub fn alphabet(&self) -> Option<Alphabet> {
        Alphabet::from_size(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blosum62_extended_rows() {
        let m = ScoreMatrix::blosum62();
        assert_eq!(m.size, 22);
        assert!(m.is_symmetric());
        assert_eq!(m.score(20, 20), 1);
        assert_eq!(m.score(0, 20), -4);
        assert_eq!(m.score(21, 0), 0);
        assert_eq!(m.score(21, 21), -1);
        assert_eq!(m.max_score(), 11);
    }

    #[test]
    fn hs_table() {
        let m = ScoreMatrix::nt4_hs();
        assert!(m.is_symmetric());
        assert_eq!(m.score(1, 1), 100);
        assert_eq!(m.score(4, 0), -100);
        assert_eq!(m.alphabet(), Some(Alphabet::Nt4));
    }

    #[test]
    fn nt16_averages_classes() {
        let m = ScoreMatrix::nt16(5, -4);
        let a = Alphabet::Nt16.code('A').unwrap();
        let r = Alphabet::Nt16.code('R').unwrap();
        let n = Alphabet::Nt16.code('N').unwrap();
        assert_eq!(m.score(a, a), 5);
        // A vs {A,G}: (5 - 4) / 2
        assert_eq!(m.score(a, r), 1);
        // A vs {A,C,G,T}: (5 - 12) / 4
        assert_eq!(m.score(a, n), -2);
        assert!(m.is_symmetric());
    }

    #[test]
    fn model_matrix_scaled_to_100() {
        let (m, ident) = ScoreMatrix::nt4_from_model(1.0, 0.52, 1.5, 0.18);
        assert_eq!(m.max_score(), 100);
        assert!(m.is_symmetric());
        assert!(ident > 0.5 && ident < 1.0);
        // transitions beat transversions
        assert!(m.score(0, 1) > m.score(0, 2));
    }

    #[test]
    fn shift_mean_moves_all() {
        let mut m = ScoreMatrix::nt4_simple(1, -1);
        m.shift_mean(-2);
        assert_eq!(m.score(0, 0), 3);
        assert_eq!(m.score(0, 4), 1);
    }

    #[test]
    fn from_scores_requires_square() {
        assert!(ScoreMatrix::from_scores(2, vec![1, 0, 0]).is_none());
        assert!(ScoreMatrix::from_scores(2, vec![1, 0, 0, 1]).is_some());
    }
}
