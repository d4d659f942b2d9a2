//! End-to-end pipeline tests: detection, resolution, and filtering.

use neardup::{
    detect_duplicates, filter_corpus, CancellationToken, DedupConfig, MemoryCorpus, MemorySink,
    SignatureConfig,
};

fn config() -> DedupConfig {
    DedupConfig::new()
        .with_signature(SignatureConfig::new().with_shingle_width(6))
        .with_reader_workers(2)
}

#[test]
fn trailing_punctuation_duplicates_cluster_together() {
    // D1 and D2 differ only by a trailing period, which canonicalization
    // removes; D3 is unrelated and must survive on its own.
    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "docs.jsonl",
        vec![
            "the quick brown fox jumps over the lazy dog".into(),
            "the quick brown fox jumps over the lazy dog.".into(),
            "completely unrelated sentence about something else".into(),
        ],
    );

    let report = detect_duplicates(&corpus, &config(), &CancellationToken::new()).unwrap();

    assert_eq!(report.summary.documents_seen, 3);
    assert_eq!(report.summary.duplicate_clusters, 1);
    assert_eq!(report.summary.documents_flagged, 1);

    let cluster = &report.index.clusters()[0];
    assert_eq!(cluster.representative, "docs.jsonl-0");
    assert_eq!(cluster.duplicates, vec!["docs.jsonl-1"]);

    // D3 has no candidate edge and never appears in the index.
    assert!(!report.index.should_drop("docs.jsonl", 2));

    let mut sink = MemorySink::new();
    let stats = filter_corpus(&corpus, &report.index, &mut sink).unwrap();
    assert_eq!(stats.records_written, 2);
    assert_eq!(stats.records_dropped, 1);
    let survivors: Vec<u64> = sink
        .records("docs.jsonl")
        .iter()
        .map(|r| r.record_offset)
        .collect();
    assert_eq!(survivors, vec![0, 2]);
}

#[test]
fn three_identical_documents_resolve_transitively() {
    // A first-occupant band store pairs later arrivals with the first one
    // only; the second and third copies are never paired directly. The
    // component still contains all three and exactly one survives.
    let text = "this exact block of text is stored three separate times";
    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "docs.jsonl",
        vec![text.into(), text.into(), text.into()],
    );

    let report = detect_duplicates(&corpus, &config(), &CancellationToken::new()).unwrap();

    assert_eq!(report.summary.duplicate_clusters, 1);
    assert_eq!(report.summary.documents_flagged, 2);
    assert_eq!(report.index.clusters()[0].representative, "docs.jsonl-0");
    assert!(report.index.should_drop("docs.jsonl", 1));
    assert!(report.index.should_drop("docs.jsonl", 2));
}

#[test]
fn near_duplicates_cluster_and_unrelated_text_does_not() {
    // ~97% shingle overlap (one appended word) must cluster; a document
    // with no shared content must not.
    let base = "large corpora accumulate copies of the same paragraph through \
                mirrors syndication and boilerplate so the detection stage has \
                to recognize passages that agree almost everywhere even when a \
                few characters differ between the stored revisions of the text";
    let near = format!("{base} indeed");
    let unrelated = "0f3a9c71e4b82d56 77aa01bc93fde245 5c6d8e9f0a1b2c3d 9e8d7c6b5a493827";

    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "docs.jsonl",
        vec![base.into(), near, unrelated.into()],
    );

    let report = detect_duplicates(&corpus, &config(), &CancellationToken::new()).unwrap();

    assert_eq!(report.summary.duplicate_clusters, 1);
    assert_eq!(report.summary.documents_flagged, 1);
    assert!(report.index.should_drop("docs.jsonl", 1));
    assert!(!report.index.should_drop("docs.jsonl", 2));
}

#[test]
fn empty_documents_never_pair_with_each_other() {
    // Both canonicalize to nothing. Their sentinel signatures are identical,
    // which is exactly why they must be excluded from banding.
    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "docs.jsonl",
        vec![
            "?!".into(),
            "...".into(),
            "a normal document with enough text to shingle".into(),
        ],
    );

    let report = detect_duplicates(&corpus, &config(), &CancellationToken::new()).unwrap();

    assert_eq!(report.summary.documents_seen, 3);
    assert_eq!(report.summary.empty_documents, 2);
    assert_eq!(report.summary.candidate_edges, 0);
    assert!(report.index.is_empty());

    // Both empty documents survive filtering.
    let mut sink = MemorySink::new();
    let stats = filter_corpus(&corpus, &report.index, &mut sink).unwrap();
    assert_eq!(stats.records_written, 3);
}

#[test]
fn duplicates_found_across_files() {
    let shared = "the same passage was syndicated into two different files";
    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "a.jsonl",
        vec![shared.into(), "unique passage in the first file".into()],
    );
    corpus.push_file(
        "b.jsonl",
        vec!["unique passage in the second file".into(), shared.into()],
    );

    let report = detect_duplicates(&corpus, &config(), &CancellationToken::new()).unwrap();

    assert_eq!(report.summary.duplicate_clusters, 1);
    // "a.jsonl-0" < "b.jsonl-1": the copy in a.jsonl survives.
    assert_eq!(report.index.clusters()[0].representative, "a.jsonl-0");
    assert!(report.index.should_drop("b.jsonl", 1));
    assert!(!report.index.should_drop("a.jsonl", 0));

    let mut sink = MemorySink::new();
    filter_corpus(&corpus, &report.index, &mut sink).unwrap();
    assert_eq!(sink.records("a.jsonl").len(), 2);
    assert_eq!(sink.records("b.jsonl").len(), 1);
}

#[test]
fn filtering_twice_yields_identical_output() {
    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "docs.jsonl",
        vec![
            "a record that is repeated verbatim inside this file".into(),
            "a record that is repeated verbatim inside this file".into(),
            "some other record that only exists a single time here".into(),
        ],
    );

    let report = detect_duplicates(&corpus, &config(), &CancellationToken::new()).unwrap();

    let mut first = MemorySink::new();
    let first_stats = filter_corpus(&corpus, &report.index, &mut first).unwrap();
    let mut second = MemorySink::new();
    let second_stats = filter_corpus(&corpus, &report.index, &mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_stats, second_stats);
    assert_eq!(first_stats.records_written, 2);
}

#[test]
fn summary_accounts_for_the_whole_run() {
    let mut corpus = MemoryCorpus::new();
    corpus.push_file(
        "docs.jsonl",
        vec![
            "enough words to form shingles in the first record".into(),
            "enough words to form shingles in the first record".into(),
            "!!".into(),
        ],
    );

    let cfg = config();
    let report = detect_duplicates(&corpus, &cfg, &CancellationToken::new()).unwrap();

    assert_eq!(report.summary.documents_seen, 3);
    assert_eq!(report.summary.empty_documents, 1);
    assert_eq!(report.summary.duplicate_clusters, 1);
    assert_eq!(report.summary.documents_flagged, 1);
    assert_eq!(report.summary.config, cfg);
}
