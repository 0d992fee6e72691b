//! Character-to-code translation for the three residue alphabets.
//!
//! Every alignment core works on small integer codes rather than letters.
//! An alphabet of size `n` uses codes `0..n` for residues (the last one being
//! the ambiguity code) and reserves `n` itself as the gap code, so a gap can
//! never index the `n x n` substitution matrix.
//!
//! | alphabet | size | residues                   | ambiguous |
//! |----------|------|----------------------------|-----------|
//! | `Nt4`    | 5    | `A G C T N`                | `N` (4)   |
//! | `Nt16`   | 16   | IUPAC bit mask, A=1 C=2 G=4 T=8 | `N` (15) |
//! | `Amino`  | 22   | `ARNDCQEGHILKMFPSTWYV*X`   | `X` (21)  |
//!
//! The nt4 order keeps purines (`A`, `G`) with bit 1 clear and pyrimidines
//! (`C`, `T`) with bit 1 set; transitions are therefore pairs whose codes
//! agree on `code & 2`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NT4_LETTERS: &[u8; 5] = b"AGCTN";
const NT16_LETTERS: &[u8; 16] = b"-ACMGRSVTWYHKDBN";
const AMINO_LETTERS: &[u8; 22] = b"ARNDCQEGHILKMFPSTWYV*X";

/// Standard genetic code, codons enumerated in nt4 order (`AAA`, `AAG`, ...).
const CODON_TABLE: &[u8; 64] = b"KKNNRRSSTTTTIMIIEEDDGGGGAAAAVVVVQQHHRRRRPPPPLLLL**YY*WCCSSSSLLFF";

/// nt4 code of adenine.
pub const NT4_A: u8 = 0;
/// nt4 code of guanine.
pub const NT4_G: u8 = 1;
/// nt4 code of cytosine.
pub const NT4_C: u8 = 2;
/// nt4 code of thymine.
pub const NT4_T: u8 = 3;
/// nt4 code of an unknown base.
pub const NT4_N: u8 = 4;
/// Amino code of the translation stop `*`.
pub const AMINO_STOP: u8 = 20;
/// Amino code of an unknown residue `X`.
pub const AMINO_X: u8 = 21;

/// Residue alphabet of an encoded sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Alphabet {
    /// Four nucleotides plus `N`.
    Nt4,
    /// Sixteen IUPAC nucleotide classes.
    Nt16,
    /// Twenty amino acids plus stop and `X`.
    Amino,
}

impl Alphabet {
    /// Pick the alphabet whose size matches a substitution matrix.
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            5 => Some(Alphabet::Nt4),
            16 => Some(Alphabet::Nt16),
            22 => Some(Alphabet::Amino),
            _ => None,
        }
    }

    /// Number of residue codes (the matrix dimension).
    pub fn size(self) -> usize {
        match self {
            Alphabet::Nt4 => 5,
            Alphabet::Nt16 => 16,
            Alphabet::Amino => 22,
        }
    }

    /// Reserved code for a gap; one past the last residue.
    pub fn gap_code(self) -> u8 {
        self.size() as u8
    }

    /// Code used for letters the alphabet does not know.
    pub fn ambiguous_code(self) -> u8 {
        match self {
            Alphabet::Nt4 => NT4_N,
            Alphabet::Nt16 => 15,
            Alphabet::Amino => AMINO_X,
        }
    }

    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Alphabet::Nt4 => "nt4",
            Alphabet::Nt16 => "nt16",
            Alphabet::Amino => "amino",
        }
    }

    /// Whether the alphabet describes nucleotides.
    pub fn is_nucleotide(self) -> bool {
        !matches!(self, Alphabet::Amino)
    }

    /// Code of a single character, or `None` for gap characters (`-`, `.`).
    pub fn code(self, c: char) -> Option<u8> {
        if c == '-' || c == '.' {
            return None;
        }
        let u = c.to_ascii_uppercase();
        let code = match self {
            Alphabet::Nt4 => match u {
                'A' => NT4_A,
                'G' => NT4_G,
                'C' => NT4_C,
                'T' | 'U' => NT4_T,
                _ => NT4_N,
            },
            Alphabet::Nt16 => match u {
                'A' => 1,
                'C' => 2,
                'M' => 3,
                'G' => 4,
                'R' => 5,
                'S' => 6,
                'V' => 7,
                'T' | 'U' => 8,
                'W' => 9,
                'Y' => 10,
                'H' => 11,
                'K' => 12,
                'D' => 13,
                'B' => 14,
                _ => 15,
            },
            Alphabet::Amino => AMINO_LETTERS
                .iter()
                .position(|&l| l as char == u)
                .map(|p| p as u8)
                .unwrap_or(AMINO_X),
        };
        Some(code)
    }

    /// Encode a text sequence. Gap characters are dropped; unknown letters
    /// become the ambiguity code.
    pub fn encode(self, seq: &str) -> Vec<u8> {
        seq.chars().filter_map(|c| self.code(c)).collect()
    }

    /// Letter of a code; the gap code and anything beyond decode to `-`.
    pub fn decode(self, code: u8) -> char {
        let letters: &[u8] = match self {
            Alphabet::Nt4 => NT4_LETTERS,
            Alphabet::Nt16 => NT16_LETTERS,
            Alphabet::Amino => AMINO_LETTERS,
        };
        letters.get(code as usize).map(|&b| b as char).unwrap_or('-')
    }

    /// Decode a whole code slice.
    pub fn decode_all(self, codes: &[u8]) -> String {
        codes.iter().map(|&c| self.decode(c)).collect()
    }
}

/// Translate one nt4 codon; any `N` yields `X`.
pub fn translate_codon(a: u8, b: u8, c: u8) -> u8 {
    if a > NT4_T || b > NT4_T || c > NT4_T {
        return AMINO_X;
    }
    let aa = CODON_TABLE[((a as usize) << 4) | ((b as usize) << 2) | c as usize];
    Alphabet::Amino.code(aa as char).unwrap_or(AMINO_X)
}

/// Sliding-codon translation of an nt4 sequence.
///
/// Element `k` holds the amino-acid code of the codon *ending* at nucleotide
/// `k` (`nt[k-2..=k]`). The first two elements have no complete codon and
/// are `X`.
pub fn translate_codons(nt: &[u8]) -> Vec<u8> {
    let mut out = vec![AMINO_X; nt.len()];
    for k in 2..nt.len() {
        out[k] = translate_codon(nt[k - 2], nt[k - 1], nt[k]);
    }
    out
}

/// Reverse-complement an nt4 sequence in place. `N` stays `N`.
pub fn reverse_complement_nt4(seq: &mut [u8]) {
    seq.reverse();
    for c in seq.iter_mut() {
        if *c <= NT4_T {
            *c = NT4_T - *c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nt4_roundtrip_and_gaps() {
        let codes = Alphabet::Nt4.encode("ac-gTn.u");
        assert_eq!(codes, vec![NT4_A, NT4_C, NT4_G, NT4_T, NT4_N, NT4_T]);
        assert_eq!(Alphabet::Nt4.decode_all(&codes), "ACGTNT");
        assert_eq!(Alphabet::Nt4.decode(Alphabet::Nt4.gap_code()), '-');
    }

    #[test]
    fn nt4_transition_bit() {
        // purines and pyrimidines split on bit 1
        assert_eq!(NT4_A & 2, NT4_G & 2);
        assert_eq!(NT4_C & 2, NT4_T & 2);
        assert_ne!(NT4_A & 2, NT4_C & 2);
    }

    #[test]
    fn nt16_is_bitmask() {
        let a = Alphabet::Nt16.code('A').unwrap();
        let g = Alphabet::Nt16.code('G').unwrap();
        let r = Alphabet::Nt16.code('R').unwrap();
        assert_eq!(a | g, r);
        assert_eq!(Alphabet::Nt16.code('x'), Some(15));
        assert_eq!(Alphabet::Nt16.decode(r), 'R');
    }

    #[test]
    fn amino_codes() {
        assert_eq!(Alphabet::Amino.code('a'), Some(0));
        assert_eq!(Alphabet::Amino.code('*'), Some(AMINO_STOP));
        assert_eq!(Alphabet::Amino.code('B'), Some(AMINO_X));
        assert_eq!(Alphabet::Amino.gap_code(), 22);
    }

    #[test]
    fn codon_translation() {
        let nt = Alphabet::Nt4.encode("ATGTAANGG");
        let tr = translate_codons(&nt);
        assert_eq!(tr.len(), 9);
        assert_eq!(Alphabet::Amino.decode(tr[2]), 'M');
        assert_eq!(Alphabet::Amino.decode(tr[5]), '*');
        assert_eq!(tr[8], AMINO_X);
        assert_eq!(tr[0], AMINO_X);
    }

    #[test]
    fn reverse_complement() {
        let mut s = Alphabet::Nt4.encode("AACGN");
        reverse_complement_nt4(&mut s);
        assert_eq!(Alphabet::Nt4.decode_all(&s), "NCGTT");
    }

    #[test]
    fn alphabet_from_matrix_size() {
        assert_eq!(Alphabet::from_size(5), Some(Alphabet::Nt4));
        assert_eq!(Alphabet::from_size(22), Some(Alphabet::Amino));
        assert_eq!(Alphabet::from_size(7), None);
    }
}
