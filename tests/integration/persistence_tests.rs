use dupescan::duplicates::{path_to_record, DuplicateFinder, FinderConfig, FinderError};
use dupescan::progress::ProgressCallback;
use dupescan::session::{load_state, StateError};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[test]
fn test_documents_written_with_expected_shape() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello world").unwrap();
    fs::write(dir.path().join("b.txt"), "hello world").unwrap();
    fs::write(dir.path().join("c.txt"), "").unwrap();
    let dup = out.path().join("dups.json");
    let uni = out.path().join("uniq.json");

    DuplicateFinder::new(FinderConfig::default().with_output_paths(&dup, &uni))
        .run(dir.path())
        .unwrap();

    let duplicates: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&fs::read_to_string(&dup).unwrap()).unwrap();
    let uniques: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(&uni).unwrap()).unwrap();

    let mut group = duplicates
        .get("5eb63bbbe01eeed093cb22bb8f5acdc3")
        .unwrap()
        .clone();
    group.sort();
    assert_eq!(
        group,
        vec![
            path_to_record(&dir.path().join("a.txt")),
            path_to_record(&dir.path().join("b.txt")),
        ]
    );
    assert_eq!(
        uniques.get("d41d8cd98f00b204e9800998ecf8427e").unwrap(),
        &path_to_record(&dir.path().join("c.txt"))
    );
}

#[test]
fn test_documents_are_indented_json() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), "x").unwrap();
    let dup = out.path().join("d.json");
    let uni = out.path().join("u.json");

    DuplicateFinder::new(FinderConfig::default().with_output_paths(&dup, &uni))
        .run(dir.path())
        .unwrap();

    assert_eq!(fs::read_to_string(&dup).unwrap(), "{}");
    let uniques = fs::read_to_string(&uni).unwrap();
    assert!(uniques.starts_with("{\n  \""));
    assert!(uniques.ends_with("\"\n}"));
}

#[test]
fn test_output_directories_are_created() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a"), "x").unwrap();
    let dup = out.path().join("nested/state/d.json");
    let uni = out.path().join("other/u.json");

    DuplicateFinder::new(FinderConfig::default().with_output_paths(&dup, &uni))
        .run(dir.path())
        .unwrap();

    assert!(dup.is_file());
    assert!(uni.is_file());
}

#[test]
fn test_no_temporary_files_left_behind() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    for i in 0..10 {
        fs::write(dir.path().join(format!("f{i}")), format!("{i}")).unwrap();
    }

    DuplicateFinder::new(FinderConfig::default().with_output_paths(
        out.path().join("d.json"),
        out.path().join("u.json"),
    ))
    .run(dir.path())
    .unwrap();

    let mut names: Vec<String> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["d.json", "u.json"]);
}

#[test]
fn test_write_failure_aborts_run() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    let blocker = out.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let err = DuplicateFinder::new(
        FinderConfig::default().with_output_paths(blocker.join("d.json"), out.path().join("u.json")),
    )
    .run(dir.path())
    .unwrap_err();

    assert!(matches!(err, FinderError::State(StateError::Write { .. })));
}

/// Records the persisted file count each time a result is reported.
struct PersistedCounts {
    dup: PathBuf,
    uni: PathBuf,
    counts: Mutex<Vec<(usize, usize)>>,
}

impl ProgressCallback for PersistedCounts {
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    fn on_progress(&self, current: usize, _path: &str) {
        let persisted = load_state(&self.dup, &self.uni)
            .unwrap()
            .store
            .partition()
            .total_files();
        self.counts.lock().unwrap().push((current, persisted));
    }

    fn on_phase_end(&self, _phase: &str) {}
}

#[test]
fn test_documents_track_each_result_after_restart() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    let dup = out.path().join("d.json");
    let uni = out.path().join("u.json");
    for i in 0..3 {
        fs::write(dir.path().join(format!("old{i}")), format!("{i}")).unwrap();
    }
    DuplicateFinder::new(FinderConfig::default().with_output_paths(&dup, &uni))
        .run(dir.path())
        .unwrap();

    for i in 0..5 {
        fs::create_dir_all(dir.path().join("new")).unwrap();
        fs::write(dir.path().join(format!("new/new{i}")), format!("{}", i % 2)).unwrap();
    }
    let check = Arc::new(PersistedCounts {
        dup: dup.clone(),
        uni: uni.clone(),
        counts: Mutex::new(Vec::new()),
    });
    let config = FinderConfig::default()
        .with_output_paths(&dup, &uni)
        .with_restart(true)
        .with_progress_callback(check.clone());

    let outcome = DuplicateFinder::new(config).run(dir.path()).unwrap();

    let counts = check.counts.lock().unwrap().clone();
    assert_eq!(counts.len(), 5);
    for (current, persisted) in counts {
        assert_eq!(persisted, 3 + current);
    }
    assert_eq!(outcome.summary.resumed_files, 3);
    assert_eq!(outcome.partition.total_files(), 8);
}

#[cfg(unix)]
#[test]
fn test_rewrite_keeps_document_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    fs::write(dir.path().join("a"), "x").unwrap();
    let dup = out.path().join("d.json");
    let uni = out.path().join("u.json");
    let config = FinderConfig::default().with_output_paths(&dup, &uni);

    DuplicateFinder::new(config.clone()).run(dir.path()).unwrap();
    for path in [&dup, &uni] {
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }
    DuplicateFinder::new(config).run(dir.path()).unwrap();

    for path in [&dup, &uni] {
        let mode = fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
