//! Three-row text rendering of alignment paths.
//!
//! Each renderer walks a path in forward order and emits one column group per
//! step: the first sequence on top, the second at the bottom and a marker row
//! in between. Marker conventions:
//!
//! | core        | exact | similar               | frame shift |
//! |-------------|-------|-----------------------|-------------|
//! | banded      | `\|`  | `+` (positive score)  | -           |
//! | frame shift | `\|`  | `+` (positive score)  | `!`         |
//! | splice      | `\|`  | `.` (transition)      | -           |
//!
//! Frame-shift columns are three characters wide per codon: the protein
//! residue is printed as `..R` under its codon. Introns render as lowercase
//! genomic bases over `.`.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::{translate_codon, Alphabet, NT4_T};
use crate::matrix::ScoreMatrix;
use crate::path::{Alignment, EditOp};
use crate::splice::Exon;

/// Top, marker and bottom rows of a rendered alignment, all the same length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rendered {
    pub top: String,
    pub markers: String,
    pub bottom: String,
}

impl Rendered {
    fn with_capacity(n: usize) -> Self {
        Self { top: String::with_capacity(n), markers: String::with_capacity(n), bottom: String::with_capacity(n) }
    }

    fn push(&mut self, top: char, mark: char, bottom: char) {
        self.top.push(top);
        self.markers.push(mark);
        self.bottom.push(bottom);
    }

    fn push_str(&mut self, top: &str, mark: &str, bottom: &str) {
        self.top.push_str(top);
        self.markers.push_str(mark);
        self.bottom.push_str(bottom);
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// Width in columns.
    pub fn len(&self) -> usize {
        self.top.chars().count()
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}", self.top, self.markers, self.bottom)
    }
}

/// Letter of 1-based position `k`, `-` when out of range.
fn letter(alphabet: Alphabet, seq: &[u8], k: usize) -> char {
    k.checked_sub(1).and_then(|x| seq.get(x)).map_or('-', |&c| alphabet.decode(c))
}

/// Render a banded-core path; `seq1` on top.
pub fn render_banded(aln: &Alignment, seq1: &[u8], seq2: &[u8], alphabet: Alphabet, matrix: &ScoreMatrix) -> Rendered {
    let mut r = Rendered::with_capacity(aln.len());
    let gap = alphabet.gap_code();
    for s in &aln.path {
        match s.op {
            EditOp::Match => {
                let (a, b) = (seq1[s.i - 1], seq2[s.j - 1]);
                let mark = if a == b && a != gap {
                    '|'
                } else if matrix.score(b, a) > 0 {
                    '+'
                } else {
                    ' '
                };
                r.push(alphabet.decode(a), mark, alphabet.decode(b));
            }
            EditOp::Insert => r.push('-', ' ', letter(alphabet, seq2, s.j)),
            EditOp::Delete => r.push(letter(alphabet, seq1, s.i), ' ', '-'),
            _ => {}
        }
    }
    r
}

/// Render a frame-shift path: nucleotides on top, protein at the bottom.
pub fn render_frame(aln: &Alignment, nt: &[u8], protein: &[u8], matrix: &ScoreMatrix) -> Rendered {
    let mut r = Rendered::with_capacity(3 * aln.len());
    let codon = |i: usize| -> String { (i - 2..=i).map(|k| letter(Alphabet::Nt4, nt, k)).collect() };
    for s in &aln.path {
        match s.op {
            EditOp::Match => {
                let aa = protein[s.j - 1];
                let tr = translate_codon(nt[s.i - 3], nt[s.i - 2], nt[s.i - 1]);
                let mark = if tr == aa {
                    "  |"
                } else if matrix.score(aa, tr) > 0 {
                    "  +"
                } else {
                    "   "
                };
                r.push_str(&codon(s.i), mark, &format!("..{}", Alphabet::Amino.decode(aa)));
            }
            EditOp::Insert => {
                r.push_str("---", "   ", &format!("..{}", letter(Alphabet::Amino, protein, s.j)));
            }
            EditOp::Delete => r.push_str(&codon(s.i), "   ", "..-"),
            EditOp::FrameShift1 => r.push(letter(Alphabet::Nt4, nt, s.i), '!', '!'),
            EditOp::FrameShift2 => {
                let two: String = (s.i - 1..=s.i).map(|k| letter(Alphabet::Nt4, nt, k)).collect();
                r.push_str(&two, "!!", "!!");
            }
            EditOp::IntronSkip => {}
        }
    }
    r
}

fn splice_mark(g: u8, e: u8) -> char {
    if g == e {
        '|'
    } else if g <= NT4_T && (g & 2) == (e & 2) {
        '.'
    } else {
        ' '
    }
}

fn render_splice_steps(aln: &Alignment, steps: std::ops::Range<usize>, gen: &[u8], est: &[u8]) -> Rendered {
    let nt = Alphabet::Nt4;
    let mut r = Rendered::with_capacity(steps.len());
    // genomic position reached before the first rendered step
    let mut prev_i = match steps.start.checked_sub(1) {
        Some(k) => aln.path[k].i,
        None => aln.path.first().map_or(0, |f| match f.op {
            EditOp::Match | EditOp::Delete => f.i - 1,
            EditOp::Insert => f.i,
            _ => 0,
        }),
    };
    for s in &aln.path[steps] {
        match s.op {
            EditOp::Match => {
                let (g, e) = (gen[s.i - 1], est[s.j - 1]);
                r.push(nt.decode(g), splice_mark(g, e), nt.decode(e));
            }
            EditOp::Insert => r.push('-', ' ', letter(nt, est, s.j)),
            EditOp::Delete => r.push(letter(nt, gen, s.i), ' ', '-'),
            EditOp::IntronSkip => {
                for k in prev_i + 1..=s.i {
                    r.push(letter(nt, gen, k).to_ascii_lowercase(), ' ', '.');
                }
            }
            _ => {}
        }
        prev_i = s.i;
    }
    r
}

/// Render a whole spliced path, introns included; genomic on top.
pub fn render_splice(aln: &Alignment, gen: &[u8], est: &[u8]) -> Rendered {
    render_splice_steps(aln, 0..aln.len(), gen, est)
}

/// Per-exon blocks: a tab-separated header
/// `gen_start gen_end est_start est_end before after` followed by the three
/// rows of the exon. `before` is the dinucleotide ending just ahead of the
/// exon (the acceptor side), `after` the one right behind it (the donor
/// side); `--` where the genomic sequence ends.
pub fn render_exons(aln: &Alignment, exons: &[Exon], gen: &[u8], est: &[u8]) -> String {
    let nt = Alphabet::Nt4;
    let mut blocks = Vec::with_capacity(exons.len());
    for ex in exons {
        let before = if ex.gen_start > 2 {
            format!("{}{}", letter(nt, gen, ex.gen_start - 2), letter(nt, gen, ex.gen_start - 1))
        } else {
            "--".to_string()
        };
        let after = if ex.gen_end + 2 <= gen.len() {
            format!("{}{}", letter(nt, gen, ex.gen_end + 1), letter(nt, gen, ex.gen_end + 2))
        } else {
            "--".to_string()
        };
        let rows = render_splice_steps(aln, ex.steps.clone(), gen, est);
        blocks.push(format!(
            "{}\t{}\t{}\t{}\t{before}\t{after}\n{rows}",
            ex.gen_start, ex.gen_end, ex.est_start, ex.est_end
        ));
    }
    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathStep;

    fn path(steps: &[(usize, usize, EditOp)]) -> Alignment {
        Alignment::new(steps.iter().map(|&(i, j, op)| PathStep::new(i, j, op)).collect(), 0)
    }

    #[test]
    fn banded_markers() {
        let a = Alphabet::Amino;
        let (s1, s2) = (a.encode("WKA"), a.encode("WRCA"));
        let aln = path(&[
            (1, 1, EditOp::Match),
            (2, 2, EditOp::Match),
            (2, 3, EditOp::Insert),
            (3, 4, EditOp::Match),
        ]);
        let r = render_banded(&aln, &s1, &s2, a, &ScoreMatrix::blosum62());
        assert_eq!(r.top, "WK-A");
        assert_eq!(r.markers, "|+ |");
        assert_eq!(r.bottom, "WRCA");
        assert_eq!(r.to_string(), "WK-A\n|+ |\nWRCA");
    }

    #[test]
    fn frame_rows() {
        let nt = Alphabet::Nt4.encode("ATGGCCAT");
        let aa = Alphabet::Amino.encode("MAS");
        let aln = path(&[
            (3, 1, EditOp::Match),
            (6, 2, EditOp::Match),
            (8, 2, EditOp::FrameShift2),
            (8, 3, EditOp::Insert),
        ]);
        let r = render_frame(&aln, &nt, &aa, &ScoreMatrix::blosum62());
        assert_eq!(r.top, "ATGGCCAT---");
        assert_eq!(r.markers, "  |  |!!   ");
        assert_eq!(r.bottom, "..M..A!!..S");
    }

    #[test]
    fn splice_rows_and_exons() {
        let nt = Alphabet::Nt4;
        let gen = nt.encode("ACGTAAAGTC");
        let est = nt.encode("ACGTC");
        let aln = path(&[
            (1, 1, EditOp::Match),
            (2, 2, EditOp::Match),
            (3, 3, EditOp::Match),
            (8, 3, EditOp::IntronSkip),
            (9, 4, EditOp::Match),
            (10, 5, EditOp::Match),
        ]);
        let r = render_splice(&aln, &gen, &est);
        assert_eq!(r.top, "ACGtaaagTC");
        assert_eq!(r.markers, "|||     ||");
        assert_eq!(r.bottom, "ACG.....TC");
        let exons = crate::splice::extract_exons(&aln);
        let text = render_exons(&aln, &exons, &gen, &est);
        assert_eq!(text, "1\t3\t1\t3\t--\tTA\nACG\n|||\nACG\n9\t10\t4\t5\tAG\t--\nTC\n||\nTC");
    }

    #[test]
    fn transitions_are_dotted() {
        let nt = Alphabet::Nt4;
        // A/G purines, C/T pyrimidines
        assert_eq!(splice_mark(nt.code('A').unwrap(), nt.code('G').unwrap()), '.');
        assert_eq!(splice_mark(nt.code('C').unwrap(), nt.code('T').unwrap()), '.');
        assert_eq!(splice_mark(nt.code('A').unwrap(), nt.code('T').unwrap()), ' ');
        assert_eq!(splice_mark(nt.code('N').unwrap(), nt.code('C').unwrap()), ' ');
    }
}
