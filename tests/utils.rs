use sizetree::cli::SortKey;
use sizetree::data::{ItemKind, ItemSize};
use sizetree::filter::{Exclusions, build_exclude_matcher, expand_exclude_patterns};
use sizetree::utils::{parse_size, sort_items};
use std::path::{Path, PathBuf};

fn file(path: &str, size: u64) -> ItemSize {
    ItemSize::new(PathBuf::from(path), size, ItemKind::File)
}

#[test]
fn test_sort_items() {
    let items = vec![
        file("/home/user/b.txt", 1024),
        file("/home/user/a.txt", 2048),
        file("/home/user/c.txt", 512),
        file("/home/user/d.txt", 1024),
    ];

    // Test sorting by name
    let mut name_sorted = items.clone();
    sort_items(&mut name_sorted, SortKey::Name);
    let labels: Vec<&str> = name_sorted.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["a.txt", "b.txt", "c.txt", "d.txt"]);

    // Test sorting by size (largest first, ties by name)
    let mut size_sorted = items;
    sort_items(&mut size_sorted, SortKey::Size);
    let labels: Vec<&str> = size_sorted.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["a.txt", "b.txt", "d.txt", "c.txt"]);
}

#[test]
fn test_parse_size_matches_binary_units() {
    assert_eq!(parse_size("10MB").unwrap(), 10 * 1024 * 1024);
    assert_eq!(parse_size("10 mib").unwrap(), 10 * 1024 * 1024);
    assert_eq!(parse_size("0.5K").unwrap(), 512);
}

#[test]
fn test_expand_exclude_patterns() {
    let patterns = vec![
        "node_modules".to_string(),
        "*.log".to_string(),
        "temp/".to_string(),
    ];

    let expanded = expand_exclude_patterns(&patterns);

    // Should expand "node_modules" to multiple patterns
    assert!(expanded.contains(&"**/node_modules".to_string()));
    assert!(expanded.contains(&"**/node_modules/**".to_string()));

    // Should keep "*.log" as-is (contains glob)
    assert!(expanded.contains(&"*.log".to_string()));

    // Should keep "temp/" as-is (ends with slash)
    assert!(expanded.contains(&"temp/".to_string()));
}

#[test]
fn test_build_exclude_matcher_invalid_pattern() {
    let patterns = vec!["[invalid".to_string()];
    assert!(build_exclude_matcher(&patterns).is_err());
    assert!(Exclusions::from_patterns(&patterns).is_err());
}

#[test]
fn test_exclusions_match_names_and_globs() {
    let exclusions =
        Exclusions::from_patterns(&["node_modules".to_string(), "*.log".to_string()]).unwrap();

    assert!(exclusions.is_excluded(Path::new("/work/app/node_modules")));
    assert!(exclusions.is_excluded(Path::new("/work/app/node_modules/pkg/index.js")));
    assert!(exclusions.is_excluded(Path::new("/work/debug.log")));
    assert!(!exclusions.is_excluded(Path::new("/work/src/main.rs")));
}
