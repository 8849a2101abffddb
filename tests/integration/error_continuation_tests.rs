use duplicheck::cache::SignatureCache;
use duplicheck::config::RunConfig;
use duplicheck::duplicates::{DuplicateFinder, FileOutcome};
use duplicheck::error::PipelineError;
use duplicheck::pipeline::run;
use duplicheck::progress::NoProgress;
use duplicheck::scanner::{HashError, ScanError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn setup() -> (TempDir, RunConfig) {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    let config = RunConfig::new(&root, &dir.path().join("c.json"), &dir.path().join("l.csv"))
        .with_quiet(true);
    (dir, config)
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap()
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[test]
fn test_missing_files_are_skipped_not_fatal() {
    let finder = DuplicateFinder::with_defaults();
    let paths = vec![
        PathBuf::from("nonexistent_1.txt"),
        PathBuf::from("nonexistent_2.txt"),
    ];

    let outcome = finder
        .hash_and_group(&paths, &SignatureCache::new())
        .unwrap();

    assert!(outcome.groups.is_empty());
    assert!(outcome.cache.is_empty());
    assert_eq!(outcome.stats.vanished, 2);
    assert!(outcome.stats.failures.is_empty());
}

#[test]
fn test_process_file_reports_vanished() {
    let finder = DuplicateFinder::with_defaults();
    match finder.process_file(Path::new("nonexistent.txt"), &SignatureCache::new()) {
        FileOutcome::Vanished(path) => assert_eq!(path, PathBuf::from("nonexistent.txt")),
        other => panic!("Expected Vanished, got: {:?}", other),
    }
}

#[test]
fn test_missing_root_aborts() {
    let dir = tempdir().unwrap();
    let config = RunConfig::new(
        &dir.path().join("nope"),
        &dir.path().join("c.json"),
        &dir.path().join("l.csv"),
    );

    match run(&config, Arc::new(NoProgress)) {
        Err(PipelineError::Scan(ScanError::NotFound(path))) => {
            assert_eq!(path, dir.path().join("nope"));
        }
        other => panic!("Expected NotFound scan error, got: {:?}", other),
    }
}

#[test]
fn test_file_root_aborts() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    let config = RunConfig::new(&file, &dir.path().join("c.json"), &dir.path().join("l.csv"));

    assert!(matches!(
        run(&config, Arc::new(NoProgress)),
        Err(PipelineError::Scan(ScanError::NotADirectory(_)))
    ));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Permission bits are not enforced for a privileged user.
    fn permissions_enforced(probe: &Path) -> bool {
        fs::read(probe).is_err()
    }

    #[test]
    fn test_unreadable_file_is_excluded() {
        let (_dir, config) = setup();
        let secret = config.root.join("b_secret.txt");
        fs::write(config.root.join("a.txt"), "same").unwrap();
        fs::write(&secret, "same").unwrap();
        fs::write(config.root.join("c.txt"), "same").unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();
        if !permissions_enforced(&secret) {
            return;
        }

        let report = run(&config, Arc::new(NoProgress)).unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(report.hash_stats.failures.len(), 1);
        assert!(matches!(
            report.hash_stats.failures[0],
            HashError::PermissionDenied(_)
        ));
        assert_eq!(report.deleted(), 1);
        assert!(secret.exists());
        assert!(!config.root.join("c.txt").exists());
    }

    #[test]
    fn test_undeletable_duplicate_is_logged_as_failed() {
        let (_dir, config) = setup();
        let locked = config.root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(config.root.join("a.txt"), "hello").unwrap();
        fs::write(locked.join("b.txt"), "hello").unwrap();
        fs::write(config.root.join("z.txt"), "hello").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let probe = locked.join("probe");
        let enforced = fs::write(&probe, "").is_err();
        if !enforced {
            let _ = fs::remove_file(&probe);
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = run(&config, Arc::new(NoProgress)).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.deleted(), 1);
        assert_eq!(report.failed(), 1);
        assert!(locked.join("b.txt").exists());
        assert!(!config.root.join("z.txt").exists());

        let rows = read_rows(&config.log_file);
        let actions: Vec<&str> = rows[1..].iter().map(|r| r[1].as_str()).collect();
        assert_eq!(actions, vec!["Kept", "Failed", "Deleted"]);
        assert!(rows[2][3].contains("permission denied"));
    }
}
