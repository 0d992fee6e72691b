use proptest::prelude::*;
use pwalign::*;

fn codon(aa: char) -> &'static str {
    match aa {
        'A' => "GCT",
        'C' => "TGT",
        'D' => "GAT",
        'E' => "GAA",
        'F' => "TTT",
        'G' => "GGT",
        'H' => "CAT",
        'I' => "ATT",
        'K' => "AAA",
        'L' => "CTG",
        'M' => "ATG",
        'N' => "AAT",
        'P' => "CCT",
        'Q' => "CAA",
        'R' => "CGT",
        'S' => "TCT",
        'T' => "ACT",
        'V' => "GTT",
        'W' => "TGG",
        _ => "TAT",
    }
}

fn coding(protein: &str) -> String {
    protein.chars().map(codon).collect()
}

fn self_score(seq: &str, alphabet: Alphabet, matrix: &ScoreMatrix) -> i32 {
    alphabet.encode(seq).iter().map(|&c| matrix.score(c, c)).sum()
}

/// Each step consumes what its kind says it does.
fn steps_are_consistent(aln: &Alignment) -> bool {
    aln.path.windows(2).all(|w| {
        let (a, b) = (w[0], w[1]);
        match b.op {
            EditOp::Match => b.i == a.i + 1 && b.j == a.j + 1,
            EditOp::Insert => b.i == a.i && b.j == a.j + 1,
            EditOp::Delete => b.i == a.i + 1 && b.j == a.j,
            _ => b.i >= a.i && b.j >= a.j,
        }
    })
}

proptest! {
    #[test]
    fn nucleotide_self_alignment(seq in "[ACGT]{1,60}") {
        let ap = AlnParam::nt2nt();
        let want = self_score(&seq, Alphabet::Nt16, &ap.matrix);
        for mode in [AlignMode::Global, AlignMode::Local] {
            let res = align(&seq, &seq, &ap, mode).unwrap();
            prop_assert_eq!(res.alignment.score, want);
            prop_assert_eq!(res.alignment.count(EditOp::Match), seq.len());
            prop_assert_eq!(res.alignment.end(), (seq.len(), seq.len()));
            prop_assert_eq!(&res.rendered.top, &seq);
        }
    }

    #[test]
    fn local_paths_are_consistent(a in "[ACGT]{1,50}", b in "[ACGT]{1,50}") {
        let res = align(&a, &b, &AlnParam::nt2nt(), AlignMode::Local).unwrap();
        prop_assert!(res.alignment.score >= 0);
        prop_assert!(steps_are_consistent(&res.alignment));
        prop_assert_eq!(res.rendered.len(), res.alignment.len());
        if let Some(first) = res.alignment.path.first() {
            prop_assert_eq!(first.op, EditOp::Match);
        }
    }

    #[test]
    fn global_score_is_symmetric(a in "[ACGT]{1,50}", b in "[ACGT]{1,50}") {
        let ap = AlnParam::nt2nt();
        let ab = align(&a, &b, &ap, AlignMode::Global).unwrap();
        let ba = align(&b, &a, &ap, AlignMode::Global).unwrap();
        prop_assert_eq!(ab.alignment.score, ba.alignment.score);
        prop_assert!(steps_are_consistent(&ab.alignment));
        prop_assert_eq!(ab.alignment.end(), (a.len(), b.len()));
    }

    #[test]
    fn local_window_realigns_globally(a in "[ACGT]{1,50}", b in "[ACGT]{1,50}") {
        let ap = AlnParam::nt2nt().with_gap_end(None);
        let local = align(&a, &b, &ap, AlignMode::Local).unwrap().alignment;
        prop_assume!(!local.is_empty());
        let (first, last) = (local.path[0], local.path[local.len() - 1]);
        let w1 = &a[first.i - 1..last.i];
        let w2 = &b[first.j - 1..last.j];
        let global = align(w1, w2, &ap, AlignMode::Global).unwrap();
        prop_assert_eq!(global.alignment.score, local.score);
    }

    #[test]
    fn coding_sequence_aligns_in_frame(protein in "[ACDEFGHIKLMNPQRSTVWY]{1,30}") {
        let ap = AlnParam::aa2nt();
        let nt = coding(&protein);
        let want = self_score(&protein, Alphabet::Amino, &ap.matrix);
        for mode in [AlignMode::Global, AlignMode::Local] {
            let res = align(&nt, &protein, &ap, mode).unwrap();
            prop_assert_eq!(res.alignment.score, want);
            prop_assert_eq!(res.alignment.count(EditOp::Match), protein.len());
            prop_assert_eq!(res.alignment.start(), (3, 1));
            prop_assert_eq!(res.alignment.end(), (nt.len(), protein.len()));
            prop_assert_eq!(coding_segments(&res.alignment).len(), 1);
        }
    }

    #[test]
    fn ungapped_rows_back_translate_cleanly(protein in "[ACDEFGHIKLMNPQRSTVWY]{1,30}") {
        let nt = coding(&protein);
        let bt = back_translate(&protein, &nt, &AlnParam::aa2nt()).unwrap();
        prop_assert_eq!(&bt.aligned_nt, &nt);
        prop_assert!(bt.flaws.is_clean());
        prop_assert_eq!(bt.identity, 100);
    }

    #[test]
    fn unspliced_transcript_has_one_exon(seq in "[ACGT]{5,60}") {
        let res = align(&seq, &seq, &AlnParam::splice(), AlignMode::Global).unwrap();
        prop_assert_eq!(res.alignment.count(EditOp::IntronSkip), 0);
        prop_assert_eq!(res.alignment.count(EditOp::Match), seq.len());
        prop_assert_eq!(res.exons.len(), 1);
        prop_assert_eq!((res.exons[0].gen_start, res.exons[0].gen_end), (1, seq.len()));
    }
}
