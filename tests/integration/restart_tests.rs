use dupescan::duplicates::{path_to_record, DuplicateFinder, FinderConfig, FinderError};
use dupescan::session::{load_state, StateError};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn config(out: &TempDir) -> FinderConfig {
    FinderConfig::default().with_output_paths(
        out.path().join("duplicates.json"),
        out.path().join("uniques.json"),
    )
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_restart_hashes_only_new_files() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "a.txt", "same");
    write(dir.path(), "b.txt", "other");

    DuplicateFinder::new(config(&out)).run(dir.path()).unwrap();

    write(dir.path(), "c.txt", "same");
    let resumed = DuplicateFinder::new(config(&out).with_restart(true))
        .run(dir.path())
        .unwrap();

    assert_eq!(resumed.summary.resumed_files, 2);
    assert_eq!(resumed.summary.skipped_files, 2);
    assert_eq!(resumed.summary.hashed_files, 1);

    let partition = resumed.partition.canonical();
    assert_eq!(partition.duplicate_groups(), 1);
    assert_eq!(
        partition.duplicates.values().next().unwrap(),
        &vec![
            path_to_record(&dir.path().join("a.txt")),
            path_to_record(&dir.path().join("c.txt")),
        ]
    );
    assert_eq!(partition.unique_files(), 1);
}

#[test]
fn test_restart_after_partial_run_matches_full_run() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        write(dir.path(), &format!("d{}/f{}.txt", i % 3, i), &format!("{}", i % 4));
    }

    let full_out = tempdir().unwrap();
    let full = DuplicateFinder::new(config(&full_out)).run(dir.path()).unwrap();

    // Cut the persisted state down to what an interrupted run might leave.
    let out = tempdir().unwrap();
    let cfg = config(&out);
    DuplicateFinder::new(cfg.clone()).run(dir.path()).unwrap();
    let uniques: BTreeMap<String, String> = BTreeMap::new();
    fs::write(&cfg.uniques_path, serde_json::to_string(&uniques).unwrap()).unwrap();
    let mut duplicates: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&fs::read_to_string(&cfg.duplicates_path).unwrap()).unwrap();
    let first_key = duplicates.keys().next().unwrap().clone();
    duplicates.retain(|k, _| k == &first_key);
    fs::write(
        &cfg.duplicates_path,
        serde_json::to_string_pretty(&duplicates).unwrap(),
    )
    .unwrap();

    let resumed = DuplicateFinder::new(cfg.with_restart(true))
        .run(dir.path())
        .unwrap();

    assert_eq!(resumed.partition.canonical(), full.partition.canonical());
    assert_eq!(resumed.summary.resumed_files, 3);
    assert_eq!(resumed.summary.hashed_files, 9);
}

#[test]
fn test_restart_on_complete_state_changes_nothing() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "a.txt", "1");
    write(dir.path(), "b.txt", "1");
    let cfg = config(&out);

    DuplicateFinder::new(cfg.clone()).run(dir.path()).unwrap();
    let before = fs::read_to_string(&cfg.duplicates_path).unwrap();

    let resumed = DuplicateFinder::new(cfg.clone().with_restart(true))
        .run(dir.path())
        .unwrap();

    assert_eq!(resumed.summary.hashed_files, 0);
    assert_eq!(resumed.summary.skipped_files, 2);
    assert_eq!(fs::read_to_string(&cfg.duplicates_path).unwrap(), before);
}

#[test]
fn test_restart_skips_by_name_across_directories() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "one/x.txt", "first");
    let cfg = config(&out);

    DuplicateFinder::new(cfg.clone()).run(&dir.path().join("one")).unwrap();

    // A different file with the same name elsewhere counts as already hashed.
    write(dir.path(), "two/x.txt", "second");
    let resumed = DuplicateFinder::new(cfg.with_restart(true))
        .run(dir.path())
        .unwrap();

    assert_eq!(resumed.summary.hashed_files, 0);
    assert_eq!(resumed.summary.skipped_files, 2);
    assert_eq!(resumed.partition.total_files(), 1);
}

#[test]
fn test_restart_merges_unique_into_duplicate_group() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let cfg = config(&out);

    // Previous state: digest "abc" both as a group and as a unique.
    fs::write(
        &cfg.duplicates_path,
        r#"{"abc": ["/prev/a.txt", "/prev/b.txt"]}"#,
    )
    .unwrap();
    fs::write(&cfg.uniques_path, r#"{"abc": "/prev/c.txt", "def": "/prev/d.txt"}"#).unwrap();

    let resumed = DuplicateFinder::new(cfg.clone().with_restart(true))
        .run(dir.path())
        .unwrap();

    let partition = resumed.partition.canonical();
    assert_eq!(
        partition.duplicates.get("abc").unwrap(),
        &vec![
            "/prev/a.txt".to_string(),
            "/prev/b.txt".to_string(),
            "/prev/c.txt".to_string(),
        ]
    );
    assert_eq!(partition.uniques.get("def").unwrap(), "/prev/d.txt");

    // The merged state is what got persisted.
    let reloaded = load_state(&cfg.duplicates_path, &cfg.uniques_path).unwrap();
    assert_eq!(reloaded.store.partition().canonical(), partition);
}

#[test]
fn test_restart_requires_both_documents() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let cfg = config(&out);
    fs::write(&cfg.duplicates_path, "{}").unwrap();

    let err = DuplicateFinder::new(cfg.clone().with_restart(true))
        .run(dir.path())
        .unwrap_err();

    match err {
        FinderError::State(StateError::MissingArtifact(path)) => {
            assert_eq!(path, cfg.uniques_path);
        }
        other => panic!("Expected MissingArtifact, got {:?}", other),
    }
}

#[test]
fn test_restart_rejects_corrupt_document() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let cfg = config(&out);
    fs::write(&cfg.duplicates_path, "[1, 2, 3]").unwrap();
    fs::write(&cfg.uniques_path, "{}").unwrap();

    let err = DuplicateFinder::new(cfg.with_restart(true))
        .run(dir.path())
        .unwrap_err();

    assert!(matches!(err, FinderError::State(StateError::Parse { .. })));
}
