//! # pwalign
//!
//! Pairwise sequence alignment by dynamic programming.
//!
//! Three alignment engines share one parameter type, one path type and one
//! renderer:
//!
//! - [`banded`]: three-state affine-gap alignment restricted to a diagonal
//!   band. The global variant traces back through the band; the local variant
//!   locates its window with two linear-memory passes and then re-aligns only
//!   that window.
//! - [`frameshift`]: protein against nucleotide through a sliding codon
//!   translation, with two extra states that absorb one- and two-base frame
//!   slips.
//! - [`splice`]: transcript against genomic DNA with an intron state whose
//!   cost depends on `GT`/`AG` donor and acceptor sites, plus a
//!   boundary-only variant and exon extraction.
//!
//! Cores take sequences already encoded as small integer codes (see
//! [`Alphabet`]) and return an [`Alignment`]: the path of [`EditOp`]s and its
//! score. [`align`] does the encoding, core selection and rendering for text
//! input.
//!
//! ### Example
//! ```
//! use pwalign::{align, AlignMode, AlnParam, EditOp};
//! let res = align("ATGGCCATTGAATGGGCCGC", "MAIVMGR", &AlnParam::aa2nt(), AlignMode::Global).unwrap();
//! assert_eq!(res.alignment.path.iter().filter(|s| s.op.is_frame_shift()).count(), 1);
//! assert!(res.rendered.markers.contains('!'));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod alphabet;
pub mod backtrans;
pub mod banded;
pub mod common;
pub mod frameshift;
pub mod matrix;
pub mod pairwise;
pub mod param;
pub mod path;
pub mod profile;
pub mod render;
pub mod splice;

pub use alphabet::{reverse_complement_nt4, translate_codon, translate_codons, Alphabet};
pub use backtrans::{back_translate, BackTranslation, Flaws};
pub use common::{parse_fasta, AlignError, FastaRecord, NEG_INF};
pub use frameshift::{coding_segments, CodingSegment};
pub use matrix::ScoreMatrix;
pub use pairwise::{align, select_core, AlignMode, Core, PairAlignment};
pub use param::{AlnParam, DEFAULT_MAX_BAND_WIDTH};
pub use path::{Alignment, EditOp, PathStep};
pub use profile::ScoreProfile;
pub use render::{render_banded, render_exons, render_frame, render_splice, Rendered};
pub use splice::{extract_exons, Exon, SpliceBounds, MIN_GENOMIC_LEN};
