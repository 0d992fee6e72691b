//! Back-translation of an aligned protein row onto its coding sequence.
//!
//! Given one gapped protein row of a multiple alignment and the nucleotide
//! sequence that encodes it, produce the matching codon-aligned nucleotide
//! row: every residue becomes its three bases, every gap character becomes
//! three copies of itself. Codons are located with the local frame-shift
//! core, so sequencing errors in the nucleotide sequence are tolerated and
//! reported as flaws rather than breaking the row.
//!
//! ### Example
//! ```
//! use pwalign::{back_translate, AlnParam};
//! let bt = back_translate("MA-IV", "ATGGCCATTGTA", &AlnParam::aa2nt()).unwrap();
//! assert_eq!(bt.aligned_nt, "ATGGCC---ATTGTA");
//! assert!(bt.flaws.is_clean());
//! assert_eq!(bt.identity, 100);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::{translate_codon, Alphabet};
use crate::common::AlignError;
use crate::frameshift;
use crate::param::AlnParam;
use crate::path::EditOp;

/// Placeholder codon for residues with no nucleotide counterpart.
const UNKNOWN_CODON: &[u8; 3] = b"XXX";

/// Problems met while mapping residues to codons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flaws {
    /// A residue has no codon (filled with `XXX`).
    pub insertion: bool,
    /// Codons were skipped between residues.
    pub deletion: bool,
    /// The reading frame slipped.
    pub frame_shift: bool,
    /// Leading residues are not covered by the nucleotide sequence.
    pub no_head: bool,
    /// Trailing residues are not covered by the nucleotide sequence.
    pub no_tail: bool,
}

impl Flaws {
    pub fn is_clean(&self) -> bool {
        *self == Flaws::default()
    }
}

/// Result of [`back_translate`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BackTranslation {
    /// Nucleotide row, three columns per protein column.
    pub aligned_nt: String,
    pub flaws: Flaws,
    /// Percentage of residues whose codon translates back to them, rounded.
    pub identity: u32,
}

/// Map `aligned_protein` onto codons of `nucleotide`.
///
/// Only alphabetic characters count as residues; anything else in the
/// protein row is a gap and is tripled verbatim. Non-alphabetic characters
/// in the nucleotide sequence are ignored.
pub fn back_translate(aligned_protein: &str, nucleotide: &str, ap: &AlnParam) -> Result<BackTranslation, AlignError> {
    let residues: String = aligned_protein.chars().filter(char::is_ascii_alphabetic).collect();
    let bases: Vec<u8> = nucleotide.bytes().filter(u8::is_ascii_alphabetic).collect();
    let protein = Alphabet::Amino.encode(&residues);
    let nt: Vec<u8> = bases.iter().filter_map(|&b| Alphabet::Nt4.code(b as char)).collect();

    let aln = match frameshift::local_core(&nt, &protein, ap) {
        Ok(aln) => aln,
        Err(AlignError::NoAlignment) => Default::default(),
        Err(e) => return Err(e),
    };

    let mut flaws = Flaws::default();
    let mut codons: Vec<u8> = Vec::with_capacity(3 * protein.len());
    let (mut identical, mut total) = (0usize, 0usize);

    let head = aln.path.first().map_or(0, |s| match s.op {
        EditOp::Match | EditOp::Insert => s.j - 1,
        _ => s.j,
    });
    if head > 0 {
        flaws.no_head = true;
        codons.extend(UNKNOWN_CODON.repeat(head));
        total += head;
    }
    for s in &aln.path {
        match s.op {
            EditOp::Match => {
                codons.extend_from_slice(&bases[s.i - 3..s.i]);
                if translate_codon(nt[s.i - 3], nt[s.i - 2], nt[s.i - 1]) == protein[s.j - 1] {
                    identical += 1;
                }
            }
            EditOp::Insert => {
                codons.extend_from_slice(UNKNOWN_CODON);
                flaws.insertion = true;
            }
            EditOp::Delete => flaws.deletion = true,
            EditOp::FrameShift1 | EditOp::FrameShift2 => flaws.frame_shift = true,
            EditOp::IntronSkip => {}
        }
    }
    total += aln.len();
    let covered = aln.end().1;
    if covered != protein.len() {
        flaws.no_tail = true;
        codons.extend(UNKNOWN_CODON.repeat(protein.len() - covered));
        total += protein.len() - covered;
    }

    let mut next = codons.chunks(3);
    let mut aligned_nt = String::with_capacity(3 * aligned_protein.len());
    for c in aligned_protein.chars() {
        if c.is_ascii_alphabetic() {
            let codon = next.next().unwrap_or(&UNKNOWN_CODON[..]);
            aligned_nt.extend(codon.iter().map(|&b| b as char));
        } else {
            aligned_nt.extend([c, c, c]);
        }
    }
    let identity = if total == 0 { 0 } else { ((100 * identical) as f64 / total as f64).round() as u32 };
    Ok(BackTranslation { aligned_nt, flaws, identity })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_row() {
        let bt = back_translate("MA-IV--MGR", "atggccattgtaatgggccgc", &AlnParam::aa2nt()).unwrap();
        assert_eq!(bt.aligned_nt, "atggcc---attgta------atgggccgc");
        assert!(bt.flaws.is_clean());
        assert_eq!(bt.identity, 100);
    }

    #[test]
    fn missing_head_is_padded() {
        // nucleotides cover only AIVMGR
        let bt = back_translate("WWMAIVMGR", "GCCATTGTAATGGGCCGC", &AlnParam::aa2nt()).unwrap();
        assert!(bt.flaws.no_head);
        assert!(!bt.flaws.no_tail);
        assert!(bt.aligned_nt.starts_with("XXXXXXXXX"));
        assert!(bt.aligned_nt.ends_with("GCCATTGTAATGGGCCGC"));
        // 6 of 9 residues recovered
        assert_eq!(bt.identity, 67);
    }

    #[test]
    fn slip_is_flagged() {
        let bt = back_translate(
            "WWWWMVWWWWK",
            "TGGTGGTGGTGGATGGATGGTGGTGGTGGAAA",
            &AlnParam::aa2nt(),
        )
        .unwrap();
        assert!(bt.flaws.frame_shift);
        assert_eq!(bt.aligned_nt.len(), 33);
    }

    #[test]
    fn nothing_alignable() {
        let bt = back_translate("W-W", "CCCCCC", &AlnParam::aa2nt()).unwrap();
        assert_eq!(bt.aligned_nt, "XXX---XXX");
        assert!(bt.flaws.no_tail);
        assert_eq!(bt.identity, 0);
    }
}
