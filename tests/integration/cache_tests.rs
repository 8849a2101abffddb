use duplicheck::cache::{CacheEntry, HashCache, SignatureCache};
use duplicheck::config::RunConfig;
use duplicheck::duplicates::DuplicateFinder;
use duplicheck::pipeline::run;
use duplicheck::progress::NoProgress;
use duplicheck::scanner::{hash_to_hex, signature_of, Hasher};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_cache_initial_scan_and_rescan() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    fs::write(dir.path().join("file1.txt"), "duplicate content").unwrap();
    fs::write(dir.path().join("file2.txt"), "duplicate content").unwrap();
    let paths = vec![dir.path().join("file1.txt"), dir.path().join("file2.txt")];

    let store = HashCache::new(&cache_path);
    let finder = DuplicateFinder::with_defaults();

    let first = finder.hash_and_group(&paths, &store.load()).unwrap();
    assert_eq!(first.stats.cache_hits, 0);
    assert_eq!(first.stats.cache_misses, 2);
    store.save(&first.cache).unwrap();

    let second = finder.hash_and_group(&paths, &store.load()).unwrap();
    assert_eq!(second.stats.cache_hits, 2);
    assert_eq!(second.stats.cache_misses, 0);
    assert_eq!(second.groups.len(), 1);
    assert_eq!(second.cache, first.cache);
}

#[test]
fn test_cache_file_layout() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("hello.txt");
    fs::write(&file, "hello").unwrap();
    set_file_mtime(&file, FileTime::from_unix_time(1_700_000_000, 500)).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let outcome = finder
        .hash_and_group(&[file.clone()], &SignatureCache::new())
        .unwrap();
    let store = HashCache::new(&dir.path().join("cache.json"));
    store.save(&outcome.cache).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    let entry = &json[&*file.to_string_lossy()];
    assert_eq!(entry["signature"], serde_json::json!([1_700_000_000_000_000_500i64, 5]));
    assert_eq!(
        entry["hash"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_cache_invalidation_on_size_change() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "short").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let first = finder
        .hash_and_group(&[file.clone()], &SignatureCache::new())
        .unwrap();

    fs::write(&file, "a bit longer").unwrap();
    let second = finder.hash_and_group(&[file.clone()], &first.cache).unwrap();

    assert_eq!(second.stats.cache_misses, 1);
    let entry = second.cache.get(&file).unwrap();
    assert_eq!(entry.hash, Hasher::new().hash_bytes(b"a bit longer"));
}

#[test]
fn test_cache_invalidation_on_mtime_change() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "same size A").unwrap();
    set_file_mtime(&file, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let first = finder
        .hash_and_group(&[file.clone()], &SignatureCache::new())
        .unwrap();

    fs::write(&file, "same size B").unwrap();
    set_file_mtime(&file, FileTime::from_unix_time(1_600_000_001, 0)).unwrap();
    let second = finder.hash_and_group(&[file.clone()], &first.cache).unwrap();

    assert_eq!(second.stats.cache_misses, 1);
    assert_eq!(
        second.cache.get(&file).unwrap().hash,
        Hasher::new().hash_bytes(b"same size B")
    );
}

#[test]
fn test_matching_signature_trusts_cached_hash() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "actual").unwrap();
    let pinned = FileTime::from_unix_time(1_650_000_000, 0);
    set_file_mtime(&file, pinned).unwrap();

    // Seed a cache entry with the current signature but a different hash.
    let signature = signature_of(&file).unwrap().unwrap();
    let stale = Hasher::new().hash_bytes(b"stale!");
    let mut previous = SignatureCache::new();
    previous.insert(&file, CacheEntry::new(signature, stale));

    let outcome = DuplicateFinder::with_defaults()
        .hash_and_group(&[file.clone()], &previous)
        .unwrap();

    assert_eq!(outcome.stats.cache_hits, 1);
    assert_eq!(outcome.cache.get(&file).unwrap().hash, stale);
}

#[test]
fn test_vanished_entries_are_dropped_from_cache() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("keep.txt"), "keep").unwrap();
    fs::write(root.join("gone.txt"), "gone").unwrap();
    let config = RunConfig::new(&root, &dir.path().join("c.json"), &dir.path().join("l.csv"))
        .with_quiet(true);

    run(&config, Arc::new(NoProgress)).unwrap();
    fs::remove_file(root.join("gone.txt")).unwrap();
    run(&config, Arc::new(NoProgress)).unwrap();

    let cache = HashCache::new(&config.cache_file).try_load().unwrap();
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&root.join("keep.txt")).is_some());
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();
    let cache_path = dir.path().join("c.json");
    fs::write(&cache_path, "{ this is not json").unwrap();
    let config = RunConfig::new(&root, &cache_path, &dir.path().join("l.csv")).with_quiet(true);

    let report = run(&config, Arc::new(NoProgress)).unwrap();
    assert_eq!(report.hash_stats.cache_misses, 1);

    let cache = HashCache::new(&cache_path).try_load().unwrap();
    let (_, entry) = cache.iter().next().unwrap();
    assert_eq!(
        hash_to_hex(&entry.hash),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_never_share_a_cache_entry() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    let named = |bytes: &[u8]| root.join(OsStr::from_bytes(bytes));
    let (first, unique, copy) = (named(b"f\xfd"), named(b"f\xfe"), named(b"f\xff"));

    // Some filesystems only accept UTF-8 names
    if fs::write(&first, "Y").is_err() {
        return;
    }
    fs::write(&unique, "X").unwrap();
    fs::write(&copy, "Y").unwrap();
    let pinned = FileTime::from_unix_time(1_650_000_000, 0);
    for path in [&first, &unique, &copy] {
        set_file_mtime(path, pinned).unwrap();
    }
    let config = RunConfig::new(&root, &dir.path().join("c.json"), &dir.path().join("l.csv"))
        .with_quiet(true);

    let report = run(&config, Arc::new(NoProgress)).unwrap();
    assert_eq!(report.deleted(), 1);
    assert!(!copy.exists());

    let report = run(&config, Arc::new(NoProgress)).unwrap();
    assert_eq!(report.hash_stats.cache_hits, 2);
    assert_eq!(report.deleted(), 0);
    assert!(first.exists());
    assert!(unique.exists());

    let cache = HashCache::new(&config.cache_file).try_load().unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&unique).unwrap().hash, Hasher::new().hash_bytes(b"X"));

    // Kept and deleted rows name different files
    let log = fs::read_to_string(&config.log_file).unwrap();
    assert!(log.contains(&format!("Kept,{}", root.join("f\\xfd").display())));
    assert!(log.contains(&format!("Deleted,{}", root.join("f\\xff").display())));
}
