use duplicheck::config::RunConfig;
use duplicheck::output::{Action, ActionLog, LogRecord, LOG_HEADER};
use duplicheck::pipeline::run;
use duplicheck::progress::NoProgress;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

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
fn test_log_appends_with_single_header() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("logs/cleanup.csv");

    {
        let mut log = ActionLog::open(&log_path).unwrap();
        log.record(&LogRecord::kept("2024-01-01 10:00:00", Path::new("/a"), "aa"))
            .unwrap();
    }
    {
        let mut log = ActionLog::open(&log_path).unwrap();
        log.record(&LogRecord::deleted("2024-01-02 10:00:00", Path::new("/b"), "aa"))
            .unwrap();
    }

    let rows = read_rows(&log_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], LOG_HEADER.to_vec());
    assert_eq!(rows[1], vec!["2024-01-01 10:00:00", "Kept", "/a", "aa"]);
    assert_eq!(rows[2], vec!["2024-01-02 10:00:00", "Deleted", "/b", "aa"]);
}

#[test]
fn test_empty_existing_log_gets_header() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("cleanup.csv");
    fs::write(&log_path, "").unwrap();

    let log = ActionLog::open(&log_path).unwrap();
    drop(log);

    assert_eq!(read_rows(&log_path), vec![LOG_HEADER.to_vec()]);
}

#[test]
fn test_paths_with_commas_are_quoted() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("cleanup.csv");

    let mut log = ActionLog::open(&log_path).unwrap();
    log.record(&LogRecord::failed(
        "2024-01-01 10:00:00",
        Path::new("/photos/beach, day 1.jpg"),
        "ff",
        "permission denied",
    ))
    .unwrap();
    drop(log);

    let text = fs::read_to_string(&log_path).unwrap();
    assert!(text.contains("\"/photos/beach, day 1.jpg\""));
    let rows = read_rows(&log_path);
    assert_eq!(rows[1][1], Action::Failed.to_string());
    assert_eq!(rows[1][2], "/photos/beach, day 1.jpg");
    assert_eq!(rows[1][3], "ff (permission denied)");
}

#[test]
fn test_runs_accumulate_in_one_log() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    let config = RunConfig::new(&root, &dir.path().join("c.json"), &dir.path().join("l.csv"))
        .with_quiet(true);

    fs::write(root.join("a.txt"), "first").unwrap();
    fs::write(root.join("b.txt"), "first").unwrap();
    run(&config, Arc::new(NoProgress)).unwrap();

    fs::write(root.join("c.txt"), "first").unwrap();
    run(&config, Arc::new(NoProgress)).unwrap();

    let rows = read_rows(&config.log_file);
    let headers = rows.iter().filter(|r| r[0] == "Timestamp").count();
    assert_eq!(headers, 1);
    let actions: Vec<&str> = rows[1..].iter().map(|r| r[1].as_str()).collect();
    assert_eq!(actions, vec!["Kept", "Deleted", "Kept", "Deleted"]);
    assert!(root.join("a.txt").exists());
    assert!(!root.join("c.txt").exists());
}
