//! Alignment paths: the edit operations a DP core emits during traceback.
//!
//! A path is stored in forward order. Each [`PathStep`] names the DP cell
//! `(i, j)` *after* the step was taken (1-based residue counts, so `i = 3`
//! means the first three residues of the first sequence are consumed) and the
//! state that produced it. How far a step moves depends on the core:
//!
//! | op            | banded | frame shift | splice        |
//! |---------------|--------|-------------|---------------|
//! | `Match`       | (1, 1) | (3, 1)      | (1, 1)        |
//! | `Insert`      | (0, 1) | (0, 1)      | (0, 1)        |
//! | `Delete`      | (1, 0) | (3, 0)      | (1, 0)        |
//! | `FrameShift1` | -      | (1, 0)      | -             |
//! | `FrameShift2` | -      | (2, 0)      | -             |
//! | `IntronSkip`  | -      | -           | whole intron  |
//!
//! The splice cores collapse each intron into a single `IntronSkip` step that
//! sits on the intron's last genomic base.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of a single traceback step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EditOp {
    /// Residues of both sequences aligned.
    Match,
    /// Residue of the second sequence against a gap.
    Insert,
    /// Residue of the first sequence against a gap.
    Delete,
    /// One-nucleotide frame slip.
    FrameShift1,
    /// Two-nucleotide frame slip.
    FrameShift2,
    /// Intron in the genomic sequence.
    IntronSkip,
}

impl EditOp {
    /// Single-letter code, as printed in path dumps.
    pub fn symbol(self) -> char {
        match self {
            EditOp::Match => 'M',
            EditOp::Insert => 'I',
            EditOp::Delete => 'D',
            EditOp::FrameShift1 => 'O',
            EditOp::FrameShift2 => 'T',
            EditOp::IntronSkip => 'N',
        }
    }

    pub fn is_frame_shift(self) -> bool {
        matches!(self, EditOp::FrameShift1 | EditOp::FrameShift2)
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One step of an alignment path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathStep {
    /// Position in the first sequence after the step.
    pub i: usize,
    /// Position in the second sequence after the step.
    pub j: usize,
    pub op: EditOp,
}

impl PathStep {
    pub fn new(i: usize, j: usize, op: EditOp) -> Self {
        Self { i, j, op }
    }
}

/// Result of a DP core: the optimal path and its score.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alignment {
    /// Steps in forward order.
    pub path: Vec<PathStep>,
    /// Score of the path under the parameters used.
    pub score: i32,
}

impl Alignment {
    pub fn new(path: Vec<PathStep>, score: i32) -> Self {
        Self { path, score }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Cell of the first step, `(0, 0)` for an empty path.
    pub fn start(&self) -> (usize, usize) {
        self.path.first().map(|p| (p.i, p.j)).unwrap_or((0, 0))
    }

    /// Cell of the last step, `(0, 0)` for an empty path.
    pub fn end(&self) -> (usize, usize) {
        self.path.last().map(|p| (p.i, p.j)).unwrap_or((0, 0))
    }

    /// Number of steps of the given kind.
    pub fn count(&self, op: EditOp) -> usize {
        self.path.iter().filter(|p| p.op == op).count()
    }

    /// Compact run-length dump of the operations, e.g. `5M1I3M`.
    pub fn op_string(&self) -> String {
        let mut out = String::new();
        let mut iter = self.path.iter().map(|p| p.op).peekable();
        while let Some(op) = iter.next() {
            let mut n = 1;
            while iter.peek() == Some(&op) {
                iter.next();
                n += 1;
            }
            out.push_str(&format!("{n}{op}"));
        }
        out
    }
}

/// Traceback helper: records steps while walking backwards, then hands them
/// out in forward order.
#[derive(Debug, Default)]
pub(crate) struct PathBuilder {
    steps: Vec<PathStep>,
}

impl PathBuilder {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self { steps: Vec::with_capacity(n) }
    }

    pub(crate) fn push(&mut self, i: usize, j: usize, op: EditOp) {
        self.steps.push(PathStep::new(i, j, op));
    }

    /// Record an intron step unless the step recorded just before (which is
    /// later in the path) already covers this intron.
    pub(crate) fn push_collapsing_intron(&mut self, i: usize, j: usize, op: EditOp) {
        let extends = op == EditOp::IntronSkip && matches!(self.steps.last(), Some(s) if s.op == EditOp::IntronSkip);
        if !extends {
            self.push(i, j, op);
        }
    }

    pub(crate) fn finish(mut self) -> Vec<PathStep> {
        self.steps.reverse();
        self.steps
    }
}
