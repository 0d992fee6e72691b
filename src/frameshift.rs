//! Protein against nucleotide alignment that tolerates frame shifts.
//!
//! The nucleotide sequence is translated codon by codon at every offset, so
//! position `i` carries the amino acid of the codon ending at nucleotide `i`.
//! `i` walks the nucleotides and `j` the protein. Five states per cell:
//!
//! ```text
//! M(i,j) = max{M, I, D, O, T}(i-3, j-1) + S(aa[j], codon(i))
//! I(i,j) = max{M(i, j-1) - open, I(i, j-1) - extend, O(i, j-1), T(i, j-1)}
//! D(i,j) = max{M(i-3, j) - open, D(i-3, j) - extend, O(i-3, j), T(i-3, j)}
//! O(i,j) = max{M, I, D}(i-1, j) - frame_shift
//! T(i,j) = max{M, I, D}(i-2, j) - frame_shift
//! ```
//!
//! `O` swallows one stray nucleotide and `T` two, so a single inserted or
//! deleted base costs one `frame_shift` instead of breaking the whole
//! downstream alignment. The local variant folds the five states into a
//! zero-floored `G` per cell and stops its traceback where `G` restarted.
//!
//! Both variants fill the full matrix; there is no band.

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::{translate_codons, Alphabet};
use crate::common::{add_score, argmax, floor_inf, AlignError, NEG_INF};
use crate::param::AlnParam;
use crate::path::{Alignment, EditOp, PathBuilder};
use crate::profile::{check_codes, ScoreProfile};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    /// Local restart; also the hub state `G` during local traceback.
    #[default]
    Start,
    M,
    I,
    D,
    O,
    T,
}

impl State {
    fn op(self) -> Option<EditOp> {
        match self {
            State::M => Some(EditOp::Match),
            State::I => Some(EditOp::Insert),
            State::D => Some(EditOp::Delete),
            State::O => Some(EditOp::FrameShift1),
            State::T => Some(EditOp::FrameShift2),
            State::Start => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Scores {
    m: i32,
    i: i32,
    d: i32,
    o: i32,
    t: i32,
}

const UNREACHABLE: Scores = Scores { m: NEG_INF, i: NEG_INF, d: NEG_INF, o: NEG_INF, t: NEG_INF };

impl Scores {
    /// Best of all five states, ties resolved M > I > D > O > T.
    fn best(&self) -> (State, i32) {
        let (k, v) = argmax([self.m, self.i, self.d, self.o, self.t]);
        ([State::M, State::I, State::D, State::O, State::T][k], v)
    }

    /// Best of the codon-aligned states, the only ones a slip may follow.
    fn best_in_frame(&self) -> (State, i32) {
        let (k, v) = argmax([self.m, self.i, self.d]);
        ([State::M, State::I, State::D][k], v)
    }
}

/// Predecessor tags for the global core.
#[derive(Clone, Copy, Debug, Default)]
struct Tags {
    m: State,
    i: State,
    d: State,
    o: State,
    t: State,
}

/// `max(affine, slip_o, slip_t)` where the affine pair comes first and the
/// slips must be strictly better to win.
#[inline]
fn with_slips(affine: (i32, State), o: i32, t: i32) -> (i32, State) {
    let mut best = affine;
    if o > best.0 {
        best = (o, State::O);
    }
    if t > best.0 {
        best = (t, State::T);
    }
    best
}

/// Gap open-or-extend; ties go to extension.
#[inline]
fn affine(from_open: i32, open: i32, from_ext: i32, extend: i32, open_state: State, ext_state: State) -> (i32, State) {
    let (a, b) = (from_open - open, from_ext - extend);
    if a > b { (floor_inf(a), open_state) } else { (floor_inf(b), ext_state) }
}

/// Validate and prepare: returns the profile over the translated nucleotide
/// sequence and the frame-shift penalty.
fn prepare(nt: &[u8], protein: &[u8], ap: &AlnParam) -> Result<(ScoreProfile, i32), AlignError> {
    ap.validate()?;
    let alphabet = ap.alphabet()?;
    if alphabet != Alphabet::Amino {
        return Err(AlignError::UnsupportedAlphabet { expected: Alphabet::Amino.name(), found: alphabet.name() });
    }
    let fs = ap.frame_shift_penalty()?;
    check_codes(nt, Alphabet::Nt4.size())?;
    check_codes(protein, ap.matrix.size)?;
    let prof = ScoreProfile::new(&translate_codons(nt), &ap.matrix)?;
    Ok((prof, fs))
}

/// Global alignment of an nt4-encoded `nt` against an amino-encoded
/// `protein`. Path coordinates are `(nucleotide, protein)`.
pub fn global_core(nt: &[u8], protein: &[u8], ap: &AlnParam) -> Result<Alignment, AlignError> {
    let (prof, fs) = prepare(nt, protein, ap)?;
    let (n, p) = (nt.len(), protein.len());
    if n == 0 || p == 0 {
        return Ok(Alignment::default());
    }
    let (go, ge) = (ap.gap_open, ap.gap_extend);
    let w = n + 1;
    let mut tags = vec![Tags::default(); (p + 1) * w];
    let mut last = vec![UNREACHABLE; w];
    let mut curr = vec![UNREACHABLE; w];

    for j in 0..=p {
        let sc = if j > 0 { Some(prof.row(protein[j - 1])) } else { None };
        for i in 0..=n {
            let mut s = UNREACHABLE;
            let mut t = Tags::default();
            if i == 0 && j == 0 {
                s.m = 0;
            }
            if let Some(sc) = sc {
                if i >= 3 {
                    let (bt, bv) = last[i - 3].best();
                    s.m = add_score(bv, sc[i - 1]);
                    t.m = bt;
                }
                let up = last[i];
                (s.i, t.i) = with_slips(affine(up.m, go, up.i, ge, State::M, State::I), up.o, up.t);
            }
            if i >= 3 {
                let b = curr[i - 3];
                (s.d, t.d) = with_slips(affine(b.m, go, b.d, ge, State::M, State::D), b.o, b.t);
            }
            if i >= 1 {
                let (bt, bv) = curr[i - 1].best_in_frame();
                s.o = floor_inf(bv - fs);
                t.o = bt;
            }
            if i >= 2 {
                let (bt, bv) = curr[i - 2].best_in_frame();
                s.t = floor_inf(bv - fs);
                t.t = bt;
            }
            curr[i] = s;
            tags[j * w + i] = t;
        }
        std::mem::swap(&mut curr, &mut last);
    }

    let (mut state, score) = last[n].best();
    let (mut i, mut j) = (n, p);
    let mut pb = PathBuilder::with_capacity(n + p);
    while i > 0 || j > 0 {
        let t = tags[j * w + i];
        let (prev, di, dj) = match state {
            State::M => (t.m, 3, 1),
            State::I => (t.i, 0, 1),
            State::D => (t.d, 3, 0),
            State::O => (t.o, 1, 0),
            State::T => (t.t, 2, 0),
            State::Start => return Err(AlignError::BrokenTraceback { i, j }),
        };
        if i < di || j < dj {
            return Err(AlignError::BrokenTraceback { i, j });
        }
        if let Some(op) = state.op() {
            pb.push(i, j, op);
        }
        i -= di;
        j -= dj;
        state = prev;
    }
    debug!("frame-shift global: {n} nt x {p} aa, score {score}");
    Ok(Alignment::new(pb.finish(), score))
}

/// Local tags: `g` is where the zero-floored best came from (`Start` for a
/// restart), `i` and `d` whether the gap opened from `G` or extended. The
/// `Start` tag of `i`/`d` stands for "from G".
#[derive(Clone, Copy, Debug, Default)]
struct LocalTags {
    g: State,
    i: State,
    d: State,
}

#[derive(Clone, Copy, Debug)]
struct LocalScores {
    g: i32,
    i: i32,
    d: i32,
    o: i32,
    t: i32,
}

const LOCAL_UNREACHABLE: LocalScores = LocalScores { g: NEG_INF, i: NEG_INF, d: NEG_INF, o: NEG_INF, t: NEG_INF };

/// Local alignment; the zero-floored `G = max(0, M, I, D, O, T)` lets an
/// alignment start anywhere.
///
/// Empty input is [`AlignError::NoAlignment`]; no positive cell gives an
/// empty path with score 0.
pub fn local_core(nt: &[u8], protein: &[u8], ap: &AlnParam) -> Result<Alignment, AlignError> {
    let (prof, fs) = prepare(nt, protein, ap)?;
    let (n, p) = (nt.len(), protein.len());
    if n == 0 || p == 0 {
        return Err(AlignError::NoAlignment);
    }
    let (go, ge) = (ap.gap_open, ap.gap_extend);
    let w = n + 1;
    let mut tags = vec![LocalTags::default(); (p + 1) * w];
    let mut last = vec![LOCAL_UNREACHABLE; w];
    let mut curr = vec![LOCAL_UNREACHABLE; w];
    let (mut best, mut bi, mut bj) = (0, 0, 0);

    for j in 0..=p {
        let sc = if j > 0 { Some(prof.row(protein[j - 1])) } else { None };
        for i in 0..=n {
            let mut s = LOCAL_UNREACHABLE;
            let mut t = LocalTags::default();
            let mut m = NEG_INF;
            if let Some(sc) = sc {
                if i >= 3 {
                    m = add_score(last[i - 3].g, sc[i - 1]);
                }
                let up = last[i];
                (s.i, t.i) = with_slips(affine(up.g, go, up.i, ge, State::Start, State::I), up.o, up.t);
            }
            if i >= 3 {
                let b = curr[i - 3];
                (s.d, t.d) = affine(b.g, go, b.d, ge, State::Start, State::D);
            }
            if i >= 1 {
                s.o = floor_inf(curr[i - 1].g - fs);
            }
            if i >= 2 {
                s.t = floor_inf(curr[i - 2].g - fs);
            }
            let (k, g) = argmax([0, m, s.i, s.d, s.o, s.t]);
            s.g = g;
            t.g = [State::Start, State::M, State::I, State::D, State::O, State::T][k];
            if g > best {
                (best, bi, bj) = (g, i, j);
            }
            curr[i] = s;
            tags[j * w + i] = t;
        }
        std::mem::swap(&mut curr, &mut last);
    }
    if best == 0 {
        return Ok(Alignment::default());
    }

    // Walk the state machine back from the best G; G is a hub that emits
    // nothing and ends the walk on a restart tag.
    let (mut i, mut j) = (bi, bj);
    let mut state = State::Start;
    let mut at_hub = true;
    let mut pb = PathBuilder::with_capacity(n + p);
    loop {
        let t = tags[j * w + i];
        if at_hub {
            if t.g == State::Start {
                break;
            }
            state = t.g;
            at_hub = false;
            continue;
        }
        let (next, di, dj) = match state {
            State::M => (State::Start, 3, 1),
            State::I => (t.i, 0, 1),
            State::D => (t.d, 3, 0),
            State::O => (State::Start, 1, 0),
            State::T => (State::Start, 2, 0),
            State::Start => return Err(AlignError::BrokenTraceback { i, j }),
        };
        if i < di || j < dj {
            return Err(AlignError::BrokenTraceback { i, j });
        }
        if let Some(op) = state.op() {
            pb.push(i, j, op);
        }
        i -= di;
        j -= dj;
        at_hub = next == State::Start;
        state = next;
    }
    debug!("frame-shift local: {n} nt x {p} aa, best {best} at ({bi}, {bj})");
    Ok(Alignment::new(pb.finish(), best))
}

/// A run of a protein-vs-nucleotide path between two frame shifts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodingSegment {
    /// First nucleotide of the run (1-based).
    pub nt_start: usize,
    /// Last nucleotide of the run (1-based, inclusive).
    pub nt_end: usize,
    /// First protein residue of the run.
    pub prot_start: usize,
    /// Last protein residue of the run.
    pub prot_end: usize,
}

/// Split a frame-shift path into in-frame runs. Runs that consume nothing
/// (two adjacent shifts) are dropped.
pub fn coding_segments(aln: &Alignment) -> Vec<CodingSegment> {
    let mut out = Vec::new();
    let Some(first) = aln.path.first() else {
        return out;
    };
    let (di, dj) = match first.op {
        EditOp::Match => (3, 1),
        EditOp::Insert => (0, 1),
        EditOp::Delete => (3, 0),
        EditOp::FrameShift1 => (1, 0),
        EditOp::FrameShift2 => (2, 0),
        EditOp::IntronSkip => (0, 0),
    };
    let mut seg = CodingSegment {
        nt_start: first.i - di + 1,
        nt_end: first.i - di,
        prot_start: first.j - dj + 1,
        prot_end: first.j - dj,
    };
    let mut used = false;
    for s in &aln.path {
        match s.op {
            EditOp::Match => {
                seg.nt_end = s.i;
                seg.prot_end = s.j;
                used = true;
            }
            EditOp::Insert => {
                seg.prot_end = s.j;
                used = true;
            }
            EditOp::Delete => {
                seg.nt_end = s.i;
                used = true;
            }
            EditOp::FrameShift1 | EditOp::FrameShift2 => {
                if used {
                    out.push(seg);
                }
                seg = CodingSegment { nt_start: s.i + 1, nt_end: s.i, prot_start: s.j + 1, prot_end: s.j };
                used = false;
            }
            EditOp::IntronSkip => {}
        }
    }
    if used {
        out.push(seg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(s: &str) -> Vec<u8> {
        Alphabet::Nt4.encode(s)
    }

    fn aa(s: &str) -> Vec<u8> {
        Alphabet::Amino.encode(s)
    }

    #[test]
    fn in_frame_global_is_all_matches() {
        let ap = AlnParam::aa2nt();
        let aln = global_core(&nt("ATGGCCATTGTAATGGGCCGC"), &aa("MAIVMGR"), &ap).unwrap();
        assert_eq!(aln.len(), 7);
        assert!(aln.path.iter().all(|s| s.op == EditOp::Match));
        assert_eq!(aln.end(), (21, 7));
        // M A I V M G R under BLOSUM62
        assert_eq!(aln.score, 5 + 4 + 4 + 4 + 5 + 6 + 5);
    }

    #[test]
    fn single_deletion_gives_one_slip() {
        let ap = AlnParam::aa2nt();
        // middle base of the V codon (GTA) removed
        let aln = global_core(&nt("ATGGCCATTGAATGGGCCGC"), &aa("MAIVMGR"), &ap).unwrap();
        let slips = aln.path.iter().filter(|s| s.op.is_frame_shift()).count();
        assert_eq!(slips, 1);
        assert_eq!(aln.count(EditOp::Match), 6);
        assert_eq!(aln.end(), (20, 7));
    }

    #[test]
    fn local_trims_flanks() {
        let ap = AlnParam::aa2nt();
        let aln = local_core(&nt("CCCCATGGCCATTGTAATGGGCCGCCCCC"), &aa("MAIVMGR"), &ap).unwrap();
        assert_eq!(aln.start(), (7, 1));
        assert_eq!(aln.end(), (25, 7));
        assert_eq!(aln.score, 33);
        assert!(aln.path.iter().all(|s| s.op == EditOp::Match));
    }

    #[test]
    fn local_recovers_after_slip() {
        let ap = AlnParam::aa2nt();
        // WWWWM V WWWWK with the middle base of the V codon lost
        let aln = local_core(&nt("TGGTGGTGGTGGATGGATGGTGGTGGTGGAAA"), &aa("WWWWMVWWWWK"), &ap).unwrap();
        let slips = aln.path.iter().filter(|s| s.op.is_frame_shift()).count();
        assert_eq!(slips, 1);
        assert!(aln.count(EditOp::Match) >= 9);
        assert!(aln.score > 49);
    }

    #[test]
    fn local_empty_and_zero() {
        let ap = AlnParam::aa2nt();
        assert_eq!(local_core(&[], &aa("M"), &ap).unwrap_err(), AlignError::NoAlignment);
        // W against a codon of proline
        let aln = local_core(&nt("CCC"), &aa("W"), &ap).unwrap();
        assert!(aln.is_empty());
    }

    #[test]
    fn needs_amino_matrix_and_shift_penalty() {
        let nt4 = AlnParam::splice();
        assert!(matches!(global_core(&nt("ATG"), &[0], &nt4), Err(AlignError::UnsupportedAlphabet { .. })));
        let no_fs = AlnParam::aa2aa();
        assert!(matches!(global_core(&nt("ATG"), &aa("M"), &no_fs), Err(AlignError::InvalidParam(_))));
    }

    #[test]
    fn segments_split_on_slips() {
        let ap = AlnParam::aa2nt();
        let aln = global_core(&nt("ATGGCCATTGAATGGGCCGC"), &aa("MAIVMGR"), &ap).unwrap();
        let segs = coding_segments(&aln);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].nt_start, 1);
        assert_eq!(segs[0].prot_start, 1);
        assert_eq!(segs[1].nt_end, 20);
        assert_eq!(segs[1].prot_end, 7);
        assert!(segs[0].nt_end < segs[1].nt_start);
    }
}
