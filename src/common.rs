//! Common helpers shared by the alignment cores: the crate error type, the
//! "minus infinity" sentinel used by every recurrence, and a minimal FASTA
//! parser for the command-line front end.
//!
//! ## Sentinel arithmetic
//! Unreachable DP states hold [`NEG_INF`]. The value sits far enough above
//! `i32::MIN` that subtracting any realistic penalty from it cannot wrap, and
//! [`floor_inf`] clamps results back onto the sentinel so repeated
//! subtraction never drifts towards overflow.
//!
//! ## FASTA
//! The parser is intentionally permissive and suitable for small/medium files
//! and tests. It supports multi-record inputs and keeps all symbols as-is
//! (conversion to uppercase only).
//!
//! ## Examples
//! ```rust
//! use pwalign::parse_fasta;
//! let recs = parse_fasta(">seq\nACGT\n>p\nPAWHEAE\n");
//! assert_eq!(recs.len(), 2);
//! assert_eq!(recs[0].seq, "ACGT");
//! ```

/// Score of an unreachable state. Never produced by legitimate accumulation.
pub const NEG_INF: i32 = -1_073_741_823;

/// Clamp a score onto [`NEG_INF`] from below.
#[inline]
pub(crate) fn floor_inf(x: i32) -> i32 {
    if x < NEG_INF { NEG_INF } else { x }
}

/// Add a substitution score; unreachable stays unreachable.
#[inline]
pub(crate) fn add_score(x: i32, s: i32) -> i32 {
    if x <= NEG_INF { NEG_INF } else { floor_inf(x + s) }
}

/// Errors that can be returned by the alignment cores.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// A local core was given an empty sequence; there is nothing to report.
    #[error("no alignment: one of the sequences is empty")]
    NoAlignment,
    /// The encoded sequences do not belong to the alphabet this core needs.
    #[error("unsupported alphabet: expected {expected}, found {found}")]
    UnsupportedAlphabet { expected: &'static str, found: &'static str },
    /// The sequence is shorter than the minimum the core can handle.
    #[error("sequence too short: length {len}, need at least {min}")]
    SequenceTooShort { len: usize, min: usize },
    /// Parameters violate an invariant of [`crate::AlnParam`].
    #[error("invalid alignment parameters: {0}")]
    InvalidParam(&'static str),
    /// A residue code does not index the substitution matrix.
    #[error("residue code {code} is outside the {size}x{size} matrix")]
    InvalidCode { code: u8, size: usize },
    /// The local re-alignment could not reproduce the two-pass score before
    /// reaching the band-width ceiling.
    #[error(
        "band width search exhausted at {max_band_width}: forward={score_forward}, \
         reverse={score_reverse}, global={score_global}"
    )]
    BandExhausted {
        score_forward: i32,
        score_reverse: i32,
        score_global: i32,
        max_band_width: usize,
    },
    /// Traceback tried to step outside the matrix.
    #[error("traceback left the matrix at cell ({i}, {j})")]
    BrokenTraceback { i: usize, j: usize },
}

/// A single FASTA sequence (identifier and uppercase sequence letters).
#[derive(Clone, Debug)]
pub struct FastaRecord {
    /// Identifier from the FASTA header (text after '>').
    pub id: String,
    /// Raw sequence (uppercase). Gap and ambiguity symbols are kept as-is.
    pub seq: String,
}

/// Parse a minimal FASTA string into a vector of [`FastaRecord`].
///
/// *Lines starting with `>` start a new record.* All other lines are appended
/// (without spaces) to the current sequence. Sequences are uppercased.
pub fn parse_fasta(text: &str) -> Vec<FastaRecord> {
    let mut out: Vec<FastaRecord> = vec![];
    let mut id = String::new();
    let mut seq = String::new();
    let mut open = false;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix('>') {
            if open {
                out.push(FastaRecord { id: std::mem::take(&mut id), seq: seq.to_ascii_uppercase() });
                seq.clear();
            }
            id = rest.split_whitespace().next().unwrap_or("").to_string();
            open = true;
        } else if open {
            seq.extend(line.chars().filter(|c| !c.is_whitespace()));
        }
    }
    if open {
        out.push(FastaRecord { id, seq: seq.to_ascii_uppercase() });
    }
    out
}

/// Index of the first maximum in `vals`; earlier entries win ties.
#[inline]
pub(crate) fn argmax<const N: usize>(vals: [i32; N]) -> (usize, i32) {
    let mut best = 0;
    for k in 1..N {
        if vals[k] > vals[best] {
            best = k;
        }
    }
    (best, vals[best])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fasta_multi_record() {
        let recs = parse_fasta(">a desc\nac\ngt\n>b\n\nmk\n");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "a");
        assert_eq!(recs[0].seq, "ACGT");
        assert_eq!(recs[1].seq, "MK");
    }

    #[test]
    fn fasta_empty_header_kept() {
        let recs = parse_fasta(">\nAC\n");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "");
    }

    #[test]
    fn argmax_prefers_first() {
        assert_eq!(argmax([3, 5, 5, 1]), (1, 5));
        assert_eq!(argmax([NEG_INF, NEG_INF]), (0, NEG_INF));
    }

    #[test]
    fn floor_keeps_sentinel() {
        assert_eq!(floor_inf(NEG_INF - 500), NEG_INF);
        assert_eq!(floor_inf(-3), -3);
        assert_eq!(add_score(NEG_INF, 11), NEG_INF);
        assert_eq!(add_score(4, -6), -2);
    }
}
