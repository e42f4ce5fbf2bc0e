use dupescan::duplicates::{path_to_record, DuplicateFinder, FinderConfig};
use dupescan::scanner::{HashAlgorithm, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn finder_in(out: &TempDir) -> FinderConfig {
    FinderConfig::default().with_output_paths(
        out.path().join("duplicates.json"),
        out.path().join("uniques.json"),
    )
}

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();

    let outcome = DuplicateFinder::new(finder_in(&out)).run(dir.path()).unwrap();

    assert!(outcome.partition.duplicates.is_empty());
    assert!(outcome.partition.uniques.is_empty());
    assert_eq!(outcome.summary.hashed_files, 0);
    assert_eq!(outcome.summary.directories, 1);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let outcome = DuplicateFinder::new(finder_in(&out)).run(dir.path()).unwrap();

    assert!(outcome.partition.duplicates.is_empty());
    assert_eq!(outcome.partition.uniques.len(), 3);
    assert_eq!(outcome.summary.unique_files, 3);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "a.txt", b"duplicate");
    write(dir.path(), "b.txt", b"duplicate");
    write(dir.path(), "c.txt", b"unique");

    let outcome = DuplicateFinder::new(finder_in(&out)).run(dir.path()).unwrap();
    let partition = outcome.partition.canonical();

    assert_eq!(partition.duplicates.len(), 1);
    let group = partition.duplicates.values().next().unwrap();
    assert_eq!(
        group,
        &vec![
            path_to_record(&dir.path().join("a.txt")),
            path_to_record(&dir.path().join("b.txt")),
        ]
    );
    assert_eq!(partition.uniques.len(), 1);
    assert_eq!(outcome.summary.duplicate_groups, 1);
    assert_eq!(outcome.summary.duplicate_files, 2);
}

#[test]
fn test_scan_empty_files_share_digest() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "sub/e2", b"");

    let outcome = DuplicateFinder::new(finder_in(&out)).run(dir.path()).unwrap();

    let group = outcome
        .partition
        .duplicates
        .get("d41d8cd98f00b204e9800998ecf8427e")
        .unwrap();
    assert_eq!(group.len(), 2);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "top.txt", b"shared");
    write(dir.path(), "a/mid.txt", b"shared");
    write(dir.path(), "a/b/c/deep.txt", b"shared");
    write(dir.path(), "a/b/other.txt", b"alone");

    let outcome = DuplicateFinder::new(finder_in(&out)).run(dir.path()).unwrap();

    assert_eq!(outcome.summary.directories, 4);
    assert_eq!(outcome.summary.hashed_files, 4);
    assert_eq!(outcome.partition.duplicate_groups(), 1);
    assert_eq!(outcome.partition.duplicate_files(), 3);
    assert_eq!(outcome.partition.unique_files(), 1);
}

#[test]
fn test_every_file_in_exactly_one_place() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    for i in 0..40 {
        let rel = format!("d{}/f{}.bin", i % 4, i);
        write(dir.path(), &rel, format!("{}", i % 7).as_bytes());
    }

    let outcome = DuplicateFinder::new(finder_in(&out).with_workers(8))
        .run(dir.path())
        .unwrap();
    let partition = outcome.partition;

    let mut seen: Vec<&String> = partition
        .duplicates
        .values()
        .flatten()
        .chain(partition.uniques.values())
        .collect();
    assert_eq!(seen.len(), 40);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 40);

    for group in partition.duplicates.values() {
        assert!(group.len() >= 2);
    }
    for digest in partition.uniques.keys() {
        assert!(!partition.duplicates.contains_key(digest));
    }
}

#[test]
fn test_worker_count_does_not_change_result() {
    let dir = tempdir().unwrap();
    for i in 0..25 {
        write(dir.path(), &format!("f{i}"), format!("{}", i % 6).as_bytes());
    }

    let out1 = tempdir().unwrap();
    let out8 = tempdir().unwrap();
    let single = DuplicateFinder::new(finder_in(&out1).with_workers(1))
        .run(dir.path())
        .unwrap();
    let many = DuplicateFinder::new(finder_in(&out8).with_workers(8))
        .run(dir.path())
        .unwrap();

    assert_eq!(single.partition.canonical(), many.partition.canonical());
}

#[test]
fn test_rerun_without_restart_is_identical() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "a", b"1");
    write(dir.path(), "b", b"1");
    write(dir.path(), "c", b"2");
    let config = finder_in(&out);

    let first = DuplicateFinder::new(config.clone()).run(dir.path()).unwrap();
    let second = DuplicateFinder::new(config).run(dir.path()).unwrap();

    assert_eq!(first.partition.canonical(), second.partition.canonical());
    assert_eq!(second.summary.hashed_files, 3);
}

#[test]
fn test_alternative_algorithms() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"");

    for (algorithm, digest) in [
        (
            HashAlgorithm::Sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        ),
        (
            HashAlgorithm::Blake3,
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262",
        ),
    ] {
        let out = tempdir().unwrap();
        let outcome = DuplicateFinder::new(finder_in(&out).with_algorithm(algorithm))
            .run(dir.path())
            .unwrap();
        assert!(outcome.partition.uniques.contains_key(digest));
    }
}

#[test]
fn test_small_buffer_same_digest() {
    let dir = tempdir().unwrap();
    write(dir.path(), "big.bin", &vec![7u8; 100_000]);
    let out_a = tempdir().unwrap();
    let out_b = tempdir().unwrap();

    let small = DuplicateFinder::new(finder_in(&out_a).with_buffer_size(7))
        .run(dir.path())
        .unwrap();
    let large = DuplicateFinder::new(finder_in(&out_b))
        .run(dir.path())
        .unwrap();

    assert_eq!(small.partition, large.partition);
    assert_eq!(small.summary.bytes_hashed, 100_000);
}

#[test]
fn test_skip_hidden() {
    let dir = tempdir().unwrap();
    let out = tempdir().unwrap();
    write(dir.path(), "visible.txt", b"x");
    write(dir.path(), ".hidden.txt", b"x");
    write(dir.path(), ".git/config", b"x");

    let config = finder_in(&out).with_walker_config(WalkerConfig::new(false, true));
    let outcome = DuplicateFinder::new(config).run(dir.path()).unwrap();

    assert_eq!(outcome.summary.hashed_files, 1);
    assert!(outcome.partition.duplicates.is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinks_only_followed_on_request() {
    let dir = tempdir().unwrap();
    write(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

    let out = tempdir().unwrap();
    let plain = DuplicateFinder::new(finder_in(&out)).run(dir.path()).unwrap();
    assert_eq!(plain.summary.hashed_files, 1);

    let out = tempdir().unwrap();
    let config = finder_in(&out).with_walker_config(WalkerConfig::new(true, false));
    let followed = DuplicateFinder::new(config).run(dir.path()).unwrap();
    assert_eq!(followed.summary.hashed_files, 2);
    assert_eq!(followed.partition.duplicate_groups(), 1);
}
