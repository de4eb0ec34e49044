use sizetree::aggregate::aggregate;
use sizetree::control::{CancellationToken, ScanContext};
use sizetree::data::{ItemKind, ScanReport};
use sizetree::explorer::{ExpandOutcome, Explorer};
use sizetree::filter::{Exclusions, FileFilter, FilterOptions};
use sizetree::scan::scan_children;
use sizetree::session::{ScanConfig, ScanEvent, ScanRequest, ScanSession};
use sizetree::thread_pool::build_worker_pool;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Builds the reference tree:
///
/// R/
/// ├── a.txt   (10 bytes)
/// ├── b.bin   (20 bytes)
/// └── C/
///     ├── c.txt (5 bytes)
///     └── D/    (empty)
fn reference_tree() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path();
    fs::create_dir_all(root.join("C/D")).expect("Failed to create C/D");
    fs::write(root.join("a.txt"), vec![0u8; 10]).expect("Failed to write a.txt");
    fs::write(root.join("b.bin"), vec![0u8; 20]).expect("Failed to write b.bin");
    fs::write(root.join("C/c.txt"), vec![0u8; 5]).expect("Failed to write c.txt");
    dir
}

fn config() -> ScanConfig {
    ScanConfig {
        workers: 4,
        ..ScanConfig::default()
    }
}

fn scan(root: &Path, filter: FilterOptions) -> ScanReport {
    ScanSession::start(ScanRequest::new(root).with_filter(filter), &config())
        .wait()
        .expect("scan failed")
}

fn listing(report: &ScanReport) -> Vec<(String, u64, ItemKind)> {
    report
        .items
        .iter()
        .map(|item| (item.label.clone(), item.size, item.kind))
        .collect()
}

#[test]
fn test_scan_lists_immediate_children_sorted_by_size() {
    let tree = reference_tree();
    let report = scan(tree.path(), FilterOptions::default());

    assert_eq!(
        listing(&report),
        vec![
            ("b.bin".to_string(), 20, ItemKind::File),
            ("a.txt".to_string(), 10, ItemKind::File),
            ("C".to_string(), 5, ItemKind::Directory),
        ]
    );
    assert_eq!(report.total_size(), 35);
    assert!(!report.cancelled);
    for item in report.items.iter() {
        assert_eq!(item.path, tree.path().join(&item.label));
    }
}

#[test]
fn test_min_size_at_top_level_only() {
    let tree = reference_tree();
    let report = scan(tree.path(), FilterOptions::min_size(15, false));

    assert_eq!(
        listing(&report),
        vec![
            ("b.bin".to_string(), 20, ItemKind::File),
            ("C".to_string(), 5, ItemKind::Directory),
        ]
    );
}

#[test]
fn test_min_size_applied_to_subfolders() {
    let tree = reference_tree();
    let report = scan(tree.path(), FilterOptions::min_size(15, true));

    assert_eq!(
        listing(&report),
        vec![
            ("b.bin".to_string(), 20, ItemKind::File),
            ("C".to_string(), 0, ItemKind::Directory),
        ]
    );

    let mut hide = FilterOptions::min_size(15, true);
    hide.hide_empty_dirs = true;
    let report = scan(tree.path(), hide);
    assert_eq!(listing(&report), vec![("b.bin".to_string(), 20, ItemKind::File)]);
}

#[test]
fn test_predicate_and_exclusions() {
    let tree = reference_tree();
    let root = tree.path();
    fs::write(root.join("C/debug.log"), vec![0u8; 100]).unwrap();
    fs::create_dir(root.join("node_modules")).unwrap();
    fs::write(root.join("node_modules/pkg.js"), vec![0u8; 50]).unwrap();

    let filter = FilterOptions {
        apply_to_subfolders: true,
        predicate: Some(FileFilter::new(|path: &Path, _size| {
            path.extension().is_none_or(|ext| ext != "log")
        })),
        exclusions: Some(Exclusions::from_patterns(&["node_modules".to_string()]).unwrap()),
        ..FilterOptions::default()
    };
    let report = scan(root, filter);

    assert_eq!(
        listing(&report),
        vec![
            ("b.bin".to_string(), 20, ItemKind::File),
            ("a.txt".to_string(), 10, ItemKind::File),
            ("C".to_string(), 5, ItemKind::Directory),
        ]
    );
}

#[test]
fn test_scan_is_idempotent() {
    let tree = reference_tree();
    let first = scan(tree.path(), FilterOptions::default());
    let second = scan(tree.path(), FilterOptions::default());
    assert_eq!(listing(&first), listing(&second));
}

#[test]
fn test_directory_size_equals_sum_of_files_beneath() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    for (i, sub) in ["x", "x/y", "x/y/z", "w", "w/v"].iter().enumerate() {
        let folder = root.join(sub);
        fs::create_dir_all(&folder).unwrap();
        for j in 0..3 {
            let size = (i + 1) * 100 + j * 7;
            fs::write(folder.join(format!("f{}.dat", j)), vec![1u8; size]).unwrap();
        }
    }

    let report = scan(root, FilterOptions::default());
    for item in report.items.iter().filter(|item| item.is_dir()) {
        let expected: u64 = WalkDir::new(&item.path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.metadata().unwrap().len())
            .sum();
        assert_eq!(item.size, expected, "total for {}", item.label);
    }
    assert_eq!(report.items.len(), 2);
}

#[test]
fn test_missing_root_ends_with_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let result = ScanSession::start(ScanRequest::new(&missing), &config()).wait();
    assert!(result.is_err());

    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    let err = ScanSession::start(ScanRequest::new(&file), &config())
        .wait()
        .unwrap_err();
    assert!(err.to_string().contains("not a directory"));
}

#[test]
fn test_cancelled_scan_returns_subset_with_bounded_sizes() {
    let tree = reference_tree();
    let root = tree.path();
    let full = scan(root, FilterOptions::default());

    let token = CancellationToken::new();
    token.cancel();
    let ctx = Arc::new(ScanContext::new().with_cancel(token));
    let pool = build_worker_pool(2).unwrap();
    let partial = scan_children(root, &ctx, &pool).unwrap();

    for item in &partial {
        let reference = full
            .items
            .iter()
            .find(|candidate| candidate.path == item.path)
            .expect("partial item missing from full scan");
        assert!(item.size <= reference.size);
    }
    assert_eq!(aggregate(&root.join("C"), &ctx), 0);
}

#[test]
fn test_root_session_reports_progress_before_done() {
    let tree = reference_tree();
    let mut session = ScanSession::start(
        ScanRequest::new(tree.path()).with_progress(true),
        &config(),
    );

    let mut progress = 0;
    let mut done = None;
    while !session.is_finished() {
        match session.next_timeout(Duration::from_secs(10)) {
            Some(ScanEvent::Progress(path)) => {
                assert!(path.starts_with(tree.path()));
                assert!(done.is_none());
                progress += 1;
            }
            Some(ScanEvent::Done(report)) => done = Some(report),
            Some(ScanEvent::Error(reason)) => panic!("scan failed: {}", reason),
            None => {}
        }
    }
    assert!(progress >= 1);
    assert_eq!(done.unwrap().items.len(), 3);
}

#[cfg(unix)]
#[test]
fn test_unreadable_subfolder_counts_as_zero() {
    use std::os::unix::fs::PermissionsExt;

    let tree = reference_tree();
    let locked = tree.path().join("C/D");
    fs::write(locked.join("secret.bin"), vec![0u8; 64]).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still read the folder; nothing to check then.
    let enforced = fs::read_dir(&locked).is_err();
    let report = scan(tree.path(), FilterOptions::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    if enforced {
        let c = report.items.iter().find(|item| item.label == "C").unwrap();
        assert_eq!(c.size, 5);
        assert!(report.skipped >= 1);
    }
    assert_eq!(report.items.len(), 3);
}

#[test]
fn test_explorer_drills_into_real_folders() {
    let tree = reference_tree();
    let mut explorer = Explorer::with_config(config())
        .with_poll_interval(Duration::from_millis(5));
    explorer.scan_root(tree.path(), FilterOptions::default()).unwrap();
    assert!(explorer.run_until_idle(&mut (), Duration::from_secs(10)));

    let c = explorer.child_key("C").expect("C listed");
    assert_eq!(explorer.expand_node(&c).unwrap(), ExpandOutcome::Started);
    assert!(explorer.run_until_idle(&mut (), Duration::from_secs(10)));

    let view = explorer.active_view().unwrap();
    let labels: Vec<(&str, u64)> = view
        .items
        .iter()
        .map(|item| (item.label.as_str(), item.size))
        .collect();
    assert_eq!(labels, vec![("c.txt", 5), ("D", 0)]);

    explorer.collapse_node(&c).unwrap();
    assert_eq!(explorer.expand_node(&c).unwrap(), ExpandOutcome::Cached);
}
