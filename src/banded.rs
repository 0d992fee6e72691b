//! Banded affine-gap alignment with three states (match, insert, delete).
//!
//! `i` walks the first sequence and `j` the second. Per cell:
//!
//! ```text
//! M(i,j) = max{M, I, D}(i-1, j-1) + S(seq2[j], seq1[i])
//! I(i,j) = max{M(i, j-1) - open, I(i, j-1) - extend}
//! D(i,j) = max{M(i-1, j) - open, D(i-1, j) - extend}
//! ```
//!
//! When [`AlnParam::gap_end`] is set, insertions in the first and last column
//! and deletions in the first and last row cost `gap_end` per residue
//! instead. Only cells with `j - b2 < i < j + b1` are computed, where the
//! band sides `b1`/`b2` add the length difference to the configured width.
//!
//! [`global_core`] keeps one predecessor tag per state for every banded cell
//! and traces back from `(len1, len2)`. [`local_core`] never stores tags for
//! the whole matrix: a forward pass over packed score pairs finds the best
//! score and its end cell, a reverse pass from that cell finds the start, and
//! the window between them is re-aligned with the global core. Both passes
//! rebase their values once the running best passes 32000 and carry the
//! difference as a bias.
//!
//! ### Example
//! ```
//! use pwalign::{banded, Alphabet, AlnParam, EditOp};
//! let ap = AlnParam::aa2aa();
//! let a = Alphabet::Amino.encode("HEAGAWGHEE");
//! let aln = banded::global_core(&a, &a, &ap).unwrap();
//! assert!(aln.path.iter().all(|s| s.op == EditOp::Match));
//! ```

use std::mem;

use log::{debug, warn};

use crate::common::{add_score, argmax, floor_inf, AlignError, NEG_INF};
use crate::param::AlnParam;
use crate::path::{Alignment, EditOp, PathBuilder};
use crate::profile::{check_codes, ScoreProfile};

/// Running best score that triggers a rebase of the packed pass.
const OVERFLOW_THRESHOLD: i32 = 32000;
/// Amount subtracted from every packed value on rebase.
const OVERFLOW_REDUCE: i32 = 16000;
const HALF_SHIFT: u32 = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    M,
    I,
    D,
}

const STATES: [State; 3] = [State::M, State::I, State::D];

impl State {
    fn op(self) -> EditOp {
        match self {
            State::M => EditOp::Match,
            State::I => EditOp::Insert,
            State::D => EditOp::Delete,
        }
    }
}

/// Predecessor state of each of the three states of a cell.
#[derive(Clone, Copy, Debug, Default)]
struct Tags {
    m: State,
    i: State,
    d: State,
}

#[derive(Clone, Copy, Debug)]
struct Scores {
    m: i32,
    i: i32,
    d: i32,
}

const UNREACHABLE: Scores = Scores { m: NEG_INF, i: NEG_INF, d: NEG_INF };

/// Diagonal corridor: row `j` spans columns `lo(j)..=hi(j)`.
#[derive(Clone, Copy, Debug)]
struct Band {
    b1: usize,
    b2: usize,
    len1: usize,
}

impl Band {
    fn new(len1: usize, len2: usize, width: usize) -> Self {
        let (b1, b2) = if len1 > len2 { (len1 - len2 + width, width) } else { (width, len2 - len1 + width) };
        Self { b1: b1.min(len1), b2: b2.min(len2), len1 }
    }

    fn lo(&self, j: usize) -> usize {
        (j + 1).saturating_sub(self.b2)
    }

    fn hi(&self, j: usize) -> usize {
        (j + self.b1 - 1).min(self.len1)
    }

    fn width(&self) -> usize {
        self.b1 + self.b2 - 1
    }
}

/// Predecessor tags of the banded cells, one row of `band.width()` per `j`.
struct TagMatrix {
    band: Band,
    tags: Vec<Tags>,
}

impl TagMatrix {
    fn new(band: Band, len2: usize) -> Self {
        Self { band, tags: vec![Tags::default(); (len2 + 1) * band.width()] }
    }

    fn index(&self, i: usize, j: usize) -> Option<usize> {
        (i >= self.band.lo(j) && i <= self.band.hi(j)).then(|| j * self.band.width() + i - self.band.lo(j))
    }

    fn set(&mut self, i: usize, j: usize, t: Tags) {
        if let Some(k) = self.index(i, j) {
            self.tags[k] = t;
        }
    }

    fn get(&self, i: usize, j: usize) -> Result<Tags, AlignError> {
        self.index(i, j).map(|k| self.tags[k]).ok_or(AlignError::BrokenTraceback { i, j })
    }
}

/// Open-or-extend step for a gap state. `end` replaces both penalties at
/// the sequence ends; ties go to the gap state.
#[inline]
fn gap_step(from_m: i32, from_gap: i32, gap: State, open: i32, extend: i32, end: Option<i32>) -> (i32, State) {
    let (om, og) = match end {
        Some(e) => (from_m - e, from_gap - e),
        None => (from_m - open, from_gap - extend),
    };
    if om > og { (floor_inf(om), State::M) } else { (floor_inf(og), gap) }
}

#[inline]
fn best_state(s: &Scores) -> (State, i32) {
    let (k, v) = argmax([s.m, s.i, s.d]);
    (STATES[k], v)
}

/// Banded global alignment of `seq1` against `seq2`.
///
/// An empty sequence yields an empty path with score 0.
pub fn global_core(seq1: &[u8], seq2: &[u8], ap: &AlnParam) -> Result<Alignment, AlignError> {
    ap.validate()?;
    check_codes(seq2, ap.matrix.size)?;
    global_banded(seq1, seq2, ap, ap.band_width, ap.gap_end)
}

fn global_banded(
    seq1: &[u8],
    seq2: &[u8],
    ap: &AlnParam,
    band_width: usize,
    gap_end: Option<i32>,
) -> Result<Alignment, AlignError> {
    let (len1, len2) = (seq1.len(), seq2.len());
    if len1 == 0 || len2 == 0 {
        return Ok(Alignment::default());
    }
    let prof = ScoreProfile::new(seq1, &ap.matrix)?;
    let (go, ge) = (ap.gap_open, ap.gap_extend);
    let band = Band::new(len1, len2, band_width);
    let mut tags = TagMatrix::new(band, len2);
    let mut curr = vec![UNREACHABLE; len1 + 1];
    let mut last = vec![UNREACHABLE; len1 + 1];

    // first row: leading deletions only
    curr[0] = Scores { m: 0, i: NEG_INF, d: NEG_INF };
    for i in 1..=band.hi(0) {
        let left = curr[i - 1];
        let (d, dt) = gap_step(left.m, left.d, State::D, go, ge, gap_end);
        curr[i] = Scores { m: NEG_INF, i: NEG_INF, d };
        tags.set(i, 0, Tags { d: dt, ..Tags::default() });
    }
    if band.hi(0) < len1 {
        curr[band.hi(0) + 1] = UNREACHABLE;
    }
    mem::swap(&mut curr, &mut last);

    for j in 1..=len2 {
        let (lo, hi) = (band.lo(j), band.hi(j));
        let sc = prof.row(seq2[j - 1]);
        let end_d = if j == len2 { gap_end } else { None };
        if lo > 0 {
            curr[lo - 1] = UNREACHABLE;
        }
        for i in lo..=hi {
            let mut t = Tags::default();
            let mut s = UNREACHABLE;
            if i > 0 {
                let (mt, mv) = best_state(&last[i - 1]);
                s.m = add_score(mv, sc[i - 1]);
                t.m = mt;
                let left = curr[i - 1];
                (s.d, t.d) = gap_step(left.m, left.d, State::D, go, ge, end_d);
            }
            let up = last[i];
            let end_i = if i == 0 || i == len1 { gap_end } else { None };
            (s.i, t.i) = gap_step(up.m, up.i, State::I, go, ge, end_i);
            curr[i] = s;
            tags.set(i, j, t);
        }
        if hi < len1 {
            curr[hi + 1] = UNREACHABLE;
        }
        mem::swap(&mut curr, &mut last);
    }

    let (mut state, score) = best_state(&last[len1]);
    let (mut i, mut j) = (len1, len2);
    let mut pb = PathBuilder::with_capacity(len1 + len2);
    while i > 0 || j > 0 {
        let t = tags.get(i, j)?;
        pb.push(i, j, state.op());
        let prev = match state {
            State::M => t.m,
            State::I => t.i,
            State::D => t.d,
        };
        match state {
            State::M if i > 0 && j > 0 => {
                i -= 1;
                j -= 1;
            }
            State::I if j > 0 => j -= 1,
            State::D if i > 0 => i -= 1,
            _ => return Err(AlignError::BrokenTraceback { i, j }),
        }
        state = prev;
    }
    debug!("banded global: {len1}x{len2}, band ({}, {}), score {score}", band.b1, band.b2);
    Ok(Alignment::new(pb.finish(), score))
}

// Packed halves are stored relative to the running bias, so a true score
// of 0 (a fresh local start) is stored as `-bias`, the floor of the pass.

#[inline]
fn pack(h: i32, e: i32) -> u64 {
    ((h as u32 as u64) << HALF_SHIFT) | e as u32 as u64
}

#[inline]
fn unpack(w: u64) -> (i32, i32) {
    ((w >> HALF_SHIFT) as u32 as i32, w as u32 as i32)
}

/// Lower both halves of every word by [`OVERFLOW_REDUCE`], never below the
/// new `floor`.
fn rebase(eh: &mut [u64], floor: i32) {
    for w in eh.iter_mut() {
        let (h, e) = unpack(*w);
        *w = pack((h - OVERFLOW_REDUCE).max(floor), (e - OVERFLOW_REDUCE).max(floor));
    }
}

/// Best local score and the cell where it is first reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LocalHit {
    score: i32,
    i: usize,
    j: usize,
}

/// Score-only local pass. Each word of `eh` holds the previous row's best
/// score (high half) and insertion score (low half) of one column.
fn forward_pass(prof: &ScoreProfile, seq2: &[u8], open: i32, extend: i32) -> LocalHit {
    let len1 = prof.len();
    let mut eh = vec![pack(0, 0); len1 + 1];
    let (mut best, mut bias) = (0i32, 0i32);
    let mut hit = LocalHit { score: 0, i: 0, j: 0 };
    for (j, &c) in seq2.iter().enumerate() {
        if best > OVERFLOW_THRESHOLD {
            best -= OVERFLOW_REDUCE;
            bias += OVERFLOW_REDUCE;
            rebase(&mut eh, -bias);
            debug!("forward pass rebased at row {}, bias {bias}", j + 1);
        }
        let floor = -bias;
        let sc = prof.row(c);
        let (mut diag, mut h_left, mut f) = (floor, floor, floor);
        for i in 1..=len1 {
            let (h_up, e_up) = unpack(eh[i]);
            let e = (h_up - open).max(e_up - extend).max(floor);
            f = (h_left - open).max(f - extend).max(floor);
            let h = (diag + sc[i - 1]).max(e).max(f).max(floor);
            diag = h_up;
            eh[i] = pack(h, e);
            h_left = h;
            if h > best {
                best = h;
                hit = LocalHit { score: 0, i, j: j + 1 };
            }
        }
    }
    hit.score = best + bias;
    hit
}

/// Leftmost column that can still start a positive-scoring alignment ending
/// at `end_i` when `rows` rows of the second sequence remain.
fn lower_column(end_i: usize, rows: usize, max_sub: i32, extend: i32) -> usize {
    if extend <= 0 {
        return 1;
    }
    let reach = rows + rows * max_sub.max(0) as usize / extend as usize + 1;
    (end_i + 1).saturating_sub(reach).max(1)
}

/// Walk back from the forward hit to the cell where its alignment starts.
///
/// Paths through the end cell carry an extra `anchor`, which lifts them
/// above every other local alignment; the pass stops as soon as one of them
/// reaches the forward score.
fn reverse_pass(prof: &ScoreProfile, seq2: &[u8], open: i32, extend: i32, max_sub: i32, end: LocalHit) -> LocalHit {
    let anchor = open.max(1);
    let target = end.score + anchor;
    let seed = anchor + prof.row(seq2[end.j - 1])[end.i - 1];
    let mut start = LocalHit { score: seed, i: end.i, j: end.j };
    if seed == target {
        return LocalHit { score: end.score, ..start };
    }
    let mut eh = vec![pack(0, 0); end.i + 2];
    eh[end.i] = pack(seed, 0);
    let (mut best, mut bias) = (seed, 0i32);
    let mut hi = end.i;
    'rows: for j in (1..end.j).rev() {
        if best > OVERFLOW_THRESHOLD {
            best -= OVERFLOW_REDUCE;
            bias += OVERFLOW_REDUCE;
            rebase(&mut eh, -bias);
            debug!("reverse pass rebased at row {j}, bias {bias}");
        }
        let floor = -bias;
        let lo = lower_column(end.i, end.j - j + 1, max_sub, extend);
        if lo > hi {
            break;
        }
        let sc = prof.row(seq2[j - 1]);
        let mut diag = unpack(eh[hi + 1]).0;
        let (mut h_right, mut f) = (floor, floor);
        for i in (lo..=hi).rev() {
            let (h_up, e_up) = unpack(eh[i]);
            let e = (h_up - open).max(e_up - extend).max(floor);
            f = (h_right - open).max(f - extend).max(floor);
            let h = (diag + sc[i - 1]).max(e).max(f).max(floor);
            diag = h_up;
            eh[i] = pack(h, e);
            h_right = h;
            if h > best {
                best = h;
                start.i = i;
                start.j = j;
                if best + bias == target {
                    break 'rows;
                }
            }
        }
        let dead = pack(floor, floor);
        match (lo..=hi).rev().find(|&i| eh[i] != dead) {
            Some(k) => {
                eh[k + 1..=hi].fill(dead);
                hi = k;
            }
            None => break,
        }
    }
    start.score = best + bias - anchor;
    start
}

/// Local alignment: two packed passes locate the best-scoring window, which
/// is then re-aligned with the banded global core (end gaps disabled),
/// doubling the band until the re-aligned score equals the forward score.
/// When it never does below [`AlnParam::max_band_width`] the result is
/// [`AlignError::BandExhausted`].
///
/// Empty input is [`AlignError::NoAlignment`]. When no residue pair scores
/// above zero the result is an empty path with score 0.
pub fn local_core(seq1: &[u8], seq2: &[u8], ap: &AlnParam) -> Result<Alignment, AlignError> {
    ap.validate()?;
    if seq1.is_empty() || seq2.is_empty() {
        return Err(AlignError::NoAlignment);
    }
    check_codes(seq2, ap.matrix.size)?;
    let max_sub = ap.matrix.max_score();
    if max_sub >= OVERFLOW_REDUCE || ap.gap_open >= OVERFLOW_REDUCE {
        return Err(AlignError::InvalidParam("scores too large for the packed local pass"));
    }
    let prof = ScoreProfile::new(seq1, &ap.matrix)?;
    let (open, extend) = (ap.gap_open, ap.gap_extend);

    let end = forward_pass(&prof, seq2, open, extend);
    if end.score == 0 {
        return Ok(Alignment::default());
    }
    let start = reverse_pass(&prof, seq2, open, extend, max_sub, end);
    if start.score != end.score {
        warn!("reverse pass score {} differs from forward score {}", start.score, end.score);
    }
    debug!("local window: ({}, {}) .. ({}, {}), score {}", start.i, start.j, end.i, end.j, end.score);

    let w1 = &seq1[start.i - 1..end.i];
    let w2 = &seq2[start.j - 1..end.j];
    let span = w1.len().max(w2.len());
    let mut band_width = ap.band_width;
    loop {
        let mut aln = global_banded(w1, w2, ap, band_width, None)?;
        if aln.score == end.score {
            for s in aln.path.iter_mut() {
                s.i += start.i - 1;
                s.j += start.j - 1;
            }
            return Ok(aln);
        }
        if band_width >= span || band_width.saturating_mul(2) > ap.max_band_width {
            return Err(AlignError::BandExhausted {
                score_forward: end.score,
                score_reverse: start.score,
                score_global: aln.score,
                max_band_width: ap.max_band_width,
            });
        }
        band_width *= 2;
        debug!("local window re-alignment: widening band to {band_width}");
    }
}
