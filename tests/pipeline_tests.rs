//! Library-level tests of the counting pipeline
//!
//! These exercise the full path from raw reads to aggregated tables:
//! flank extraction, barcode resolution, per-sample counting, candidate
//! statistics and multi-sample aggregation.

use barseq::core::config::{
    CountMode, FlankPattern, RunConfig, DEFAULT_LEFT_FLANK, DEFAULT_RIGHT_FLANK,
};
use barseq::core::library::{LibraryError, ReferenceLibrary};
use barseq::core::types::{BarcodeId, ClassificationOutcome, NO_BARCODE_FOUND, OTHER_LABEL};
use barseq::counting::aggregate::{aggregate, RowSource};
use barseq::counting::pipeline::{count_reads, count_samples, Classifier};
use barseq::counting::stats::{percentage, rank_candidates, summarize};
use barseq::matching::resolver::resolve;
use barseq::matching::FlankMatcher;
use barseq::parsing::reference::parse_reference;
use barseq::parsing::samples::resolve_samples;

const BAR1: &str = "ATGAAGACTGTTGCCGTA";
const BAR2: &str = "CCGTAGGATACCATGACA";
const BAR3: &str = "TTGACCAGTACGGATCAA";

fn read_with(barcode: &str) -> String {
    format!("{DEFAULT_LEFT_FLANK}{barcode}{DEFAULT_RIGHT_FLANK}")
}

fn library() -> ReferenceLibrary {
    parse_reference(
        format!("barcode,gene\n{BAR1},bar1\n{BAR2},bar2\n").as_bytes(),
        b',',
    )
    .unwrap()
}

fn reference_free(min_count: u64) -> RunConfig {
    RunConfig::new(FlankPattern::default(), CountMode::ReferenceFree { min_count })
}

/// A mixed read stream: exact, lowercase, mutated, unflanked and short reads
fn mixed_reads() -> Vec<String> {
    let mut substituted = read_with(BAR2);
    // One substitution inside the left flank
    substituted.replace_range(3..4, "A");

    vec![
        read_with(BAR1),
        read_with(BAR1).to_lowercase(),
        substituted,
        format!("NNNN{}NNNN", read_with(BAR3)),
        "ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".to_string(),
        "GCTCATGCACTTGATTCC".to_string(),
        String::new(),
    ]
}

#[test]
fn test_matched_plus_unmatched_is_total() {
    let library = library();
    let classifier = Classifier::new(&RunConfig::default(), Some(&library)).unwrap();
    let table = count_reads("s1", mixed_reads(), &classifier);

    assert_eq!(table.total_reads(), 7);
    assert_eq!(table.matched() + table.unmatched(), table.total_reads());
    assert_eq!(table.count(BAR1), 2);
    assert_eq!(table.count(BAR2), 1);
    assert_eq!(table.count(OTHER_LABEL), 4);
    assert_eq!(table.unknown_barcode(), 1);
    assert_eq!(table.no_flank(), 3);

    let classifier = Classifier::new(&reference_free(1), None).unwrap();
    let table = count_reads("s1", mixed_reads(), &classifier);
    assert_eq!(table.matched() + table.unmatched(), table.total_reads());
    assert_eq!(table.count(BAR3), 1);
    assert_eq!(table.count(NO_BARCODE_FOUND), 3);
}

#[test]
fn test_duplicate_barcode_is_rejected() {
    let csv = format!("barcode,gene\n{BAR1},bar1\n{BAR2},bar2\n{BAR1},bar3\n");

    match parse_reference(csv.as_bytes(), b',') {
        Err(LibraryError::DuplicateBarcode {
            barcode,
            first_label,
            ..
        }) => {
            assert_eq!(barcode, BAR1);
            assert_eq!(first_label, "bar1");
        }
        other => panic!("expected a duplicate barcode error, got {other:?}"),
    }
}

#[test]
fn test_short_reads_never_yield_a_region() {
    let pattern = FlankPattern::default();
    let matcher = FlankMatcher::new(&pattern);
    let full = read_with(BAR1);

    assert!(matcher.extract(full.as_bytes()).is_some());
    for len in 0..pattern.min_read_length() {
        assert_eq!(matcher.extract(&full.as_bytes()[..len]), None, "length {len}");
        assert_eq!(
            matcher.extract(&full.as_bytes()[full.len() - len..]),
            None,
            "suffix length {len}"
        );
    }
}

#[test]
fn test_exact_read_extracts_exact_barcode() {
    let matcher = FlankMatcher::new(&FlankPattern::default());
    assert_eq!(
        matcher.extract(read_with(BAR1).as_bytes()),
        Some(BAR1.as_bytes())
    );
}

#[test]
fn test_resolution_against_reference() {
    let library = library();

    assert_eq!(
        resolve(BAR1.as_bytes(), &library, 1),
        ClassificationOutcome::Matched(BarcodeId(0))
    );
    assert_eq!(library.get(BarcodeId(0)).unwrap().label, "bar1");

    // Two substitutions away from bar1, far from bar2
    let mut mutated = BAR1.as_bytes().to_vec();
    mutated[0] = b'C';
    mutated[9] = b'A';
    assert_eq!(
        resolve(&mutated, &library, 1),
        ClassificationOutcome::UnmatchedUnknownBarcode
    );
}

#[test]
fn test_min_count_boundary() {
    let mut reads = Vec::new();
    reads.extend(std::iter::repeat(read_with(BAR1)).take(4));
    reads.extend(std::iter::repeat(read_with(BAR2)).take(5));

    let classifier = Classifier::new(&reference_free(5), None).unwrap();
    let table = count_reads("s1", &reads, &classifier);
    let ranked = rank_candidates(&table, 5).unwrap();

    let sequences: Vec<&str> = ranked
        .candidates
        .iter()
        .map(|c| c.sequence.as_str())
        .collect();
    assert_eq!(sequences, vec![BAR2]);
    // Dropped candidates still count towards the denominator
    assert_eq!(ranked.total_classified, 9);
}

#[test]
fn test_percentage_two_decimals() {
    assert_eq!(percentage(10, 40), Some(25.00));

    let ranked = summarize("s1", vec![("ACGT", 10), ("TTTT", 30)], 40, 1).unwrap();
    assert_eq!(ranked.candidates[1].percentage, 25.00);
    assert_eq!(ranked.candidates[0].percentage, 75.00);
    assert!(!ranked.is_low_confidence());
}

#[test]
fn test_disjoint_candidates_are_zero_filled() {
    let classifier = Classifier::new(&reference_free(1), None).unwrap();
    let first = count_reads("a", [read_with(BAR1), read_with(BAR1)], &classifier);
    let second = count_reads("b", [read_with(BAR2)], &classifier);

    let table = aggregate(&[second, first], RowSource::ReferenceFree { min_count: 1 });

    assert_eq!(table.samples(), ["a", "b"]);
    assert_eq!(table.get(BAR1, "a"), Some(2));
    assert_eq!(table.get(BAR1, "b"), Some(0));
    assert_eq!(table.get(BAR2, "a"), Some(0));
    assert_eq!(table.get(BAR2, "b"), Some(1));
}

#[test]
fn test_classification_is_idempotent() {
    let library = library();
    let classifier = Classifier::new(&RunConfig::default(), Some(&library)).unwrap();

    let first = count_reads("s1", mixed_reads(), &classifier);
    let second = count_reads("s1", mixed_reads(), &classifier);
    assert_eq!(first, second);

    let classifier = Classifier::new(&reference_free(1), None).unwrap();
    let first = count_reads("s1", mixed_reads(), &classifier);
    let second = count_reads("s1", mixed_reads(), &classifier);
    assert_eq!(first, second);
}

#[test]
fn test_count_samples_from_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let fastq = |reads: &[String]| -> String {
        reads
            .iter()
            .enumerate()
            .map(|(i, r)| format!("@r{i}\n{r}\n+\n{}\n", "I".repeat(r.len())))
            .collect()
    };
    std::fs::write(
        dir.path().join("S2.fastq"),
        fastq(&[read_with(BAR2), read_with(BAR3)]),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("S1.fastq"),
        fastq(&[read_with(BAR1), read_with(BAR1)]),
    )
    .unwrap();

    let library = library();
    let samples = resolve_samples(dir.path(), None).unwrap();
    let tables = count_samples(&samples, &RunConfig::default(), Some(&library), 2).unwrap();

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].sample(), "S1");
    assert_eq!(tables[0].count(BAR1), 2);
    assert_eq!(tables[1].count(BAR2), 1);
    assert_eq!(tables[1].count(OTHER_LABEL), 1);

    let table = aggregate(&tables, RowSource::Reference(&library));
    let keys: Vec<&str> = table.rows().iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec![BAR1, BAR2, OTHER_LABEL]);
    assert_eq!(table.row(OTHER_LABEL).unwrap().counts, vec![0, 1]);
}
