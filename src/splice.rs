//! Spliced alignment of a transcript (EST/cDNA) against genomic DNA.
//!
//! `i` walks the genomic sequence, `j` the transcript. Next to the usual
//! match/insert/delete states there is an intron state `N` that consumes
//! genomic bases for free once it has paid its donor cost; leaving it pays
//! the acceptor cost. With `good`/`bad` splice penalties:
//!
//! - `donor(i)` is `good` when genomic bases `i, i+1` read `GT`, `bad`
//!   otherwise;
//! - `acceptor(i)` is `0` when bases `i-2, i-1` read `AG`, `bad - good`
//!   otherwise.
//!
//! A canonical `GT...AG` intron therefore costs `good`, anything else more.
//! Any `N` in a splice dinucleotide makes it count as bad. The global
//! recurrences:
//!
//! ```text
//! M(i,j) = max{M, I, D, N - acceptor(i)}(i-1, j-1) + S(est[j], gen[i])
//! I(i,j) = max{M - open, I - extend, N - acceptor(i) - open}(i, j-1)
//! D(i,j) = max{M - open, D - extend, N - acceptor(i) - open}(i-1, j)
//! N(i,j) = max{M - donor(i), I - donor(i), D - donor(i), N}(i-1, j)
//! ```
//!
//! Genomic bases before the transcript starts are a free intron. The local
//! and boundary-only variants use a zero-floored hub `G`:
//!
//! ```text
//! I(i,j) = max{G(i, j-1) - open, I(i, j-1) - extend}
//! D(i,j) = max{G(i-1, j) - open, D(i-1, j) - extend}
//! N(i,j) = max{G(i-1, j) - donor(i), N(i-1, j)}
//! G(i,j) = max{0, G(i-1, j-1) + S, I(i,j), D(i,j), N(i,j) - acceptor(i+1)}
//! ```
//!
//! Every variant needs the nt4 alphabet and at least five genomic bases.
//! Paths record each intron once, on its last genomic base.

use std::ops::Range;

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, NT4_A, NT4_G, NT4_T};
use crate::common::{add_score, argmax, floor_inf, AlignError, NEG_INF};
use crate::param::AlnParam;
use crate::path::{Alignment, EditOp, PathBuilder};
use crate::profile::{check_codes, ScoreProfile};

/// Shortest genomic sequence the splice cores accept.
pub const MIN_GENOMIC_LEN: usize = 5;

/// Donor and acceptor costs per genomic position (1-based, with one spare
/// slot past the end for `acceptor(len + 1)`).
#[derive(Clone, Debug)]
struct SpliceSites {
    donor: Vec<i32>,
    acceptor: Vec<i32>,
}

impl SpliceSites {
    fn new(gen: &[u8], good: i32, bad: i32) -> Self {
        let n = gen.len();
        let base = |k: usize| gen[k - 1];
        let mut donor = vec![bad; n + 2];
        for i in 1..n {
            if base(i) == NT4_G && base(i + 1) == NT4_T {
                donor[i] = good;
            }
        }
        let mut acceptor = vec![bad - good; n + 2];
        for i in 3..=n {
            let (a, b) = (base(i - 2), base(i - 1));
            acceptor[i] = if a > NT4_T || b > NT4_T {
                bad
            } else if a == NT4_A && b == NT4_G {
                0
            } else {
                bad - good
            };
        }
        Self { donor, acceptor }
    }
}

fn prepare(gen: &[u8], est: &[u8], ap: &AlnParam) -> Result<(ScoreProfile, SpliceSites), AlignError> {
    ap.validate()?;
    let alphabet = ap.alphabet()?;
    if alphabet != Alphabet::Nt4 {
        return Err(AlignError::UnsupportedAlphabet { expected: Alphabet::Nt4.name(), found: alphabet.name() });
    }
    let (good, bad) = ap.splice_penalties()?;
    if gen.len() < MIN_GENOMIC_LEN {
        return Err(AlignError::SequenceTooShort { len: gen.len(), min: MIN_GENOMIC_LEN });
    }
    check_codes(est, Alphabet::Nt4.size())?;
    let prof = ScoreProfile::new(gen, &ap.matrix)?;
    Ok((prof, SpliceSites::new(gen, good, bad)))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    /// Local restart on `G` tags; "came from G" on gap and intron tags.
    #[default]
    Start,
    M,
    I,
    D,
    N,
}

impl State {
    fn op(self) -> Option<EditOp> {
        match self {
            State::M => Some(EditOp::Match),
            State::I => Some(EditOp::Insert),
            State::D => Some(EditOp::Delete),
            State::N => Some(EditOp::IntronSkip),
            State::Start => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Scores {
    m: i32,
    i: i32,
    d: i32,
    n: i32,
}

const UNREACHABLE: Scores = Scores { m: NEG_INF, i: NEG_INF, d: NEG_INF, n: NEG_INF };

#[derive(Clone, Copy, Debug, Default)]
struct Tags {
    m: State,
    i: State,
    d: State,
    n: State,
}

/// Open-or-extend with an intron exit as third candidate. Ties prefer
/// extension, and the intron must be strictly better.
#[inline]
fn gap_from(p: &Scores, ext: i32, acc: i32, open: i32, extend: i32, ext_state: State) -> (i32, State) {
    let (o, e) = (p.m - open, ext - extend);
    let mut best = if o > e { (o, State::M) } else { (e, ext_state) };
    let from_n = p.n - acc - open;
    if from_n > best.0 {
        best = (from_n, State::N);
    }
    (floor_inf(best.0), best.1)
}

/// Global spliced alignment. Path coordinates are `(genomic, transcript)`.
///
/// An empty transcript yields an empty path with score 0.
pub fn global_core(gen: &[u8], est: &[u8], ap: &AlnParam) -> Result<Alignment, AlignError> {
    let (prof, sites) = prepare(gen, est, ap)?;
    if est.is_empty() {
        return Ok(Alignment::default());
    }
    let (_, bad) = ap.splice_penalties()?;
    let (go, ge) = (ap.gap_open, ap.gap_extend);
    let (gl, el) = (gen.len(), est.len());
    let w = gl + 1;
    let mut tags = vec![Tags::default(); (el + 1) * w];
    let mut last = vec![UNREACHABLE; w];
    let mut curr = vec![UNREACHABLE; w];

    for j in 0..=el {
        let sc = if j > 0 { Some(prof.row(est[j - 1])) } else { None };
        for i in 0..=gl {
            let mut s = UNREACHABLE;
            let mut t = Tags::default();
            if i == 0 && j == 0 {
                s.m = 0;
            }
            let acc = sites.acceptor[i];
            if let Some(sc) = sc {
                if i >= 1 {
                    let p = last[i - 1];
                    let (k, v) = argmax([p.m, p.i, p.d, p.n - acc]);
                    s.m = add_score(floor_inf(v), sc[i - 1]);
                    t.m = [State::M, State::I, State::D, State::N][k];
                }
                let u = last[i];
                (s.i, t.i) = gap_from(&u, u.i, acc, go, ge, State::I);
            }
            if i >= 1 {
                let l = curr[i - 1];
                // leading genomic bases: a bad-site entry into deletions, a free intron
                let (d_acc, don) = if j == 0 { (bad, 0) } else { (acc, sites.donor[i]) };
                (s.d, t.d) = gap_from(&l, l.d, d_acc, go, ge, State::D);
                let (k, v) = argmax([l.n, l.m - don, l.i - don, l.d - don]);
                s.n = floor_inf(v);
                t.n = [State::N, State::M, State::I, State::D][k];
            }
            curr[i] = s;
            tags[j * w + i] = t;
        }
        std::mem::swap(&mut curr, &mut last);
    }

    let end = last[gl];
    let (k, score) = argmax([end.m, end.i, end.d, end.n]);
    let mut state = [State::M, State::I, State::D, State::N][k];
    let (mut i, mut j) = (gl, el);
    let mut pb = PathBuilder::with_capacity(gl + el);
    while i > 0 || j > 0 {
        let t = tags[j * w + i];
        let (prev, di, dj) = match state {
            State::M => (t.m, 1, 1),
            State::I => (t.i, 0, 1),
            State::D => (t.d, 1, 0),
            State::N => (t.n, 1, 0),
            State::Start => return Err(AlignError::BrokenTraceback { i, j }),
        };
        if i < di || j < dj {
            return Err(AlignError::BrokenTraceback { i, j });
        }
        if let Some(op) = state.op() {
            pb.push_collapsing_intron(i, j, op);
        }
        i -= di;
        j -= dj;
        state = prev;
    }
    debug!("splice global: {gl} genomic x {el} transcript, score {score}");
    Ok(Alignment::new(pb.finish(), score))
}

#[derive(Clone, Copy, Debug)]
struct LocalScores {
    g: i32,
    i: i32,
    d: i32,
    n: i32,
}

const LOCAL_UNREACHABLE: LocalScores = LocalScores { g: NEG_INF, i: NEG_INF, d: NEG_INF, n: NEG_INF };

#[derive(Clone, Copy, Debug, Default)]
struct LocalTags {
    g: State,
    i: State,
    d: State,
    n: State,
}

/// Fill the zero-floored matrix row by row (`j` outer), passing each cell's
/// tags to `visit`. Returns the first strictly best `G` and its cell.
fn local_fill(
    gen: &[u8],
    est: &[u8],
    prof: &ScoreProfile,
    sites: &SpliceSites,
    ap: &AlnParam,
    mut visit: impl FnMut(usize, usize, i32, LocalTags),
) -> (i32, usize, usize) {
    let (go, ge) = (ap.gap_open, ap.gap_extend);
    let gl = gen.len();
    let mut last = vec![LOCAL_UNREACHABLE; gl + 1];
    let mut curr = vec![LOCAL_UNREACHABLE; gl + 1];
    let (mut best, mut bi, mut bj) = (0, 0, 0);

    for j in 0..=est.len() {
        let sc = if j > 0 { Some(prof.row(est[j - 1])) } else { None };
        for i in 0..=gl {
            let mut s = LOCAL_UNREACHABLE;
            let mut t = LocalTags::default();
            let mut m = NEG_INF;
            if let Some(sc) = sc {
                if i >= 1 {
                    m = add_score(last[i - 1].g, sc[i - 1]);
                }
                let u = last[i];
                let (o, e) = (u.g - go, u.i - ge);
                (s.i, t.i) = if o > e { (floor_inf(o), State::Start) } else { (floor_inf(e), State::I) };
            }
            if i >= 1 {
                let l = curr[i - 1];
                let (o, e) = (l.g - go, l.d - ge);
                (s.d, t.d) = if o > e { (floor_inf(o), State::Start) } else { (floor_inf(e), State::D) };
                let open = l.g - sites.donor[i];
                (s.n, t.n) = if open > l.n { (floor_inf(open), State::Start) } else { (l.n, State::N) };
            }
            let exit = floor_inf(s.n - sites.acceptor[i + 1]);
            let (k, g) = argmax([0, m, s.i, s.d, exit]);
            s.g = g;
            t.g = [State::Start, State::M, State::I, State::D, State::N][k];
            if g > best {
                (best, bi, bj) = (g, i, j);
            }
            curr[i] = s;
            visit(i, j, g, t);
        }
        std::mem::swap(&mut curr, &mut last);
    }
    (best, bi, bj)
}

/// Local spliced alignment.
///
/// An empty transcript is [`AlignError::NoAlignment`]; when no cell scores
/// above zero the path is empty with score 0.
pub fn local_core(gen: &[u8], est: &[u8], ap: &AlnParam) -> Result<Alignment, AlignError> {
    let (prof, sites) = prepare(gen, est, ap)?;
    if est.is_empty() {
        return Err(AlignError::NoAlignment);
    }
    let w = gen.len() + 1;
    let mut tags = vec![LocalTags::default(); (est.len() + 1) * w];
    let (best, bi, bj) = local_fill(gen, est, &prof, &sites, ap, |i, j, _, t| tags[j * w + i] = t);
    if best == 0 {
        return Ok(Alignment::default());
    }

    let (mut i, mut j) = (bi, bj);
    let mut state = State::Start;
    let mut at_hub = true;
    let mut pb = PathBuilder::with_capacity(bi + bj);
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
            State::M => (State::Start, 1, 1),
            State::I => (t.i, 0, 1),
            State::D => (t.d, 1, 0),
            State::N => (t.n, 1, 0),
            State::Start => return Err(AlignError::BrokenTraceback { i, j }),
        };
        if i < di || j < dj {
            return Err(AlignError::BrokenTraceback { i, j });
        }
        if let Some(op) = state.op() {
            pb.push_collapsing_intron(i, j, op);
        }
        i -= di;
        j -= dj;
        at_hub = next == State::Start;
        state = next;
    }
    debug!("splice local: best {best} at ({bi}, {bj})");
    Ok(Alignment::new(pb.finish(), best))
}

/// Span of the best local spliced block, 1-based and inclusive. Empty when
/// `gen_start > gen_stop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpliceBounds {
    pub score: i32,
    pub gen_start: usize,
    pub gen_stop: usize,
    pub est_start: usize,
    pub est_stop: usize,
}

impl SpliceBounds {
    fn empty() -> Self {
        Self { score: 0, gen_start: 1, gen_stop: 0, est_start: 1, est_stop: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.gen_start > self.gen_stop
    }
}

#[inline]
fn pack_origin(i: usize, j: usize) -> u64 {
    ((i as u64) << 32) | j as u64
}

#[inline]
fn unpack_origin(o: u64) -> (usize, usize) {
    ((o >> 32) as usize, (o & 0xffff_ffff) as usize)
}

/// Where each state's best path started, as packed `(i, j)` of its restart
/// cell.
#[derive(Clone, Copy, Debug, Default)]
struct Origins {
    g: u64,
    i: u64,
    d: u64,
    n: u64,
}

/// Boundary-only local spliced alignment: the same recurrences as
/// [`local_core`], keeping one origin per state instead of a traceback
/// matrix. Memory is linear in the genomic length.
///
/// An empty transcript is [`AlignError::NoAlignment`], as for [`local_core`].
pub fn bound_core(gen: &[u8], est: &[u8], ap: &AlnParam) -> Result<SpliceBounds, AlignError> {
    let (prof, sites) = prepare(gen, est, ap)?;
    if est.is_empty() {
        return Err(AlignError::NoAlignment);
    }
    let gl = gen.len();
    let mut last = vec![Origins::default(); gl + 1];
    let mut curr = vec![Origins::default(); gl + 1];
    let (mut top, mut top_origin) = (0, 0);
    let (best, bi, bj) = local_fill(gen, est, &prof, &sites, ap, |i, j, g, t| {
        let mut o = Origins::default();
        if j > 0 {
            o.i = if t.i == State::I { last[i].i } else { last[i].g };
        }
        if i > 0 {
            let l = curr[i - 1];
            o.d = if t.d == State::D { l.d } else { l.g };
            o.n = if t.n == State::N { l.n } else { l.g };
        }
        o.g = match t.g {
            State::Start => pack_origin(i, j),
            State::M => last[i - 1].g,
            State::I => o.i,
            State::D => o.d,
            State::N => o.n,
        };
        if g > top {
            (top, top_origin) = (g, o.g);
        }
        curr[i] = o;
        if i == gl {
            std::mem::swap(&mut curr, &mut last);
        }
    });
    if best == 0 {
        return Ok(SpliceBounds::empty());
    }
    let (oi, oj) = unpack_origin(top_origin);
    debug!("splice bounds: best {best}, genomic {}..{bi}, transcript {}..{bj}", oi + 1, oj + 1);
    Ok(SpliceBounds { score: best, gen_start: oi + 1, gen_stop: bi, est_start: oj + 1, est_stop: bj })
}

/// A maximal intron-free run of a spliced path.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Exon {
    pub gen_start: usize,
    pub gen_end: usize,
    pub est_start: usize,
    pub est_end: usize,
    /// Indices of the run's steps in the alignment path.
    pub steps: Range<usize>,
}

/// Partition a spliced path on its intron steps. Coordinates are those of
/// the first and last step of each run.
pub fn extract_exons(aln: &Alignment) -> Vec<Exon> {
    let mut out = Vec::new();
    let mut run_start = None;
    for (k, step) in aln.path.iter().enumerate() {
        match (step.op == EditOp::IntronSkip, run_start) {
            (true, Some(s)) => {
                out.push(exon_of(aln, s..k));
                run_start = None;
            }
            (false, None) => run_start = Some(k),
            _ => {}
        }
    }
    if let Some(s) = run_start {
        out.push(exon_of(aln, s..aln.path.len()));
    }
    out
}

fn exon_of(aln: &Alignment, steps: Range<usize>) -> Exon {
    let (first, last) = (aln.path[steps.start], aln.path[steps.end - 1]);
    Exon { gen_start: first.i, gen_end: last.i, est_start: first.j, est_end: last.j, steps }
}
