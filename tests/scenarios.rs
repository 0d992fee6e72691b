use pwalign::*;

const EXON1: &str = "CAGCTACGATCGATTACCGGCATCAAGCTTCGAGCTAGCC";
const INTRON: &str = "GTAAGGTTCCAATTGGCCAATTGGTTAACCGGTTAACCAAGGTTCCAATTGGAATTCCTTAG";
const EXON2: &str = "CTGACCTAGGACTTCAAGGCTCTAGACCATGGTACGTACG";

#[test]
fn frame_shift_is_flagged() {
    // MAIVMGR with the middle base of the V codon lost
    let res = align("ATGGCCATTGAATGGGCCGC", "MAIVMGR", &AlnParam::aa2nt(), AlignMode::Global).unwrap();
    let aln = &res.alignment;
    let slips = aln.path.iter().filter(|s| s.op.is_frame_shift()).count();
    assert_eq!(slips, 1);
    assert_eq!(aln.count(EditOp::Match) + aln.count(EditOp::Insert), 7);
    assert_eq!(aln.end(), (20, 7));
    assert!(res.rendered.markers.contains('!'));
    assert!(res.rendered.bottom.contains('!'));
    assert_eq!(res.rendered.top.len(), res.rendered.bottom.len());

    let segs = coding_segments(aln);
    assert_eq!(segs.len(), 2);
    assert_eq!(segs[0].nt_start, 1);
    assert_eq!(segs[1].prot_end, 7);
}

#[test]
fn canonical_intron_is_skipped() {
    let gen = format!("{EXON1}{INTRON}{EXON2}");
    let est = format!("{EXON1}{EXON2}");
    for mode in [AlignMode::Global, AlignMode::Local] {
        let res = align(&gen, &est, &AlnParam::splice(), mode).unwrap();
        assert_eq!(res.alignment.count(EditOp::IntronSkip), 1);
        assert_eq!(res.exons.len(), 2);
        let text = render_exons(&res.alignment, &res.exons, &Alphabet::Nt4.encode(&gen), &Alphabet::Nt4.encode(&est));
        assert!(text.starts_with("1\t40\t1\t40\t--\tGT\n"));
        assert!(text.contains("\n103\t142\t41\t80\tAG\t--\n"));
        assert!(res.rendered.top.contains(&INTRON.to_lowercase()));
    }
}

#[test]
fn bounds_report_the_block() {
    let gen = format!("TTTTTTTTTT{EXON1}TTTTTTTTTT");
    let res = align(&gen, EXON1, &AlnParam::splice(), AlignMode::Bounds).unwrap();
    let b = res.bounds.unwrap();
    assert_eq!((b.gen_start, b.gen_stop), (11, 50));
    assert_eq!((b.est_start, b.est_stop), (1, 40));
    assert!(b.score > 0);
}

#[test]
fn protein_gap_is_rendered() {
    let res = align("MKVLAAGIVGLLLAW", "MKVLGIVGLLLAW", &AlnParam::aa2aa(), AlignMode::Global).unwrap();
    assert_eq!(res.alignment.count(EditOp::Delete), 2);
    assert_eq!(res.rendered.top, "MKVLAAGIVGLLLAW");
    assert_eq!(res.rendered.bottom.matches('-').count(), 2);
    assert_eq!(res.alignment.end(), (15, 13));
}

#[test]
fn back_translation_roundtrip_of_alignment_rows() {
    let rows = parse_fasta(">a\nMA-IV\n>b\nMAGIV\n");
    let cds = parse_fasta(">a\nATGGCCATTGTA\n>b\nATGGCCGGTATTGTA\n");
    let a = back_translate(&rows[0].seq, &cds[0].seq, &AlnParam::aa2nt()).unwrap();
    let b = back_translate(&rows[1].seq, &cds[1].seq, &AlnParam::aa2nt()).unwrap();
    assert_eq!(a.aligned_nt, "ATGGCC---ATTGTA");
    assert_eq!(b.aligned_nt, "ATGGCCGGTATTGTA");
    assert_eq!(a.aligned_nt.len(), b.aligned_nt.len());
    assert!(a.flaws.is_clean() && b.flaws.is_clean());
}

#[test]
fn empty_local_input_has_no_alignment() {
    for ap in [AlnParam::nt2nt(), AlnParam::aa2nt(), AlnParam::splice()] {
        let err = align("ACGTACGTAC", "", &ap, AlignMode::Local).unwrap_err();
        assert!(matches!(err, AlignError::NoAlignment), "{err:?}");
    }
    let err = align("ACGTACGTAC", "", &AlnParam::splice(), AlignMode::Bounds).unwrap_err();
    assert!(matches!(err, AlignError::NoAlignment), "{err:?}");
    let res = align("ACGTACGTAC", "", &AlnParam::splice(), AlignMode::Global).unwrap();
    assert!(res.alignment.is_empty());
    assert!(res.exons.is_empty());
}
