use crate::support::{dataset_record, file_record};
use metacat::Catalog;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn records() -> Vec<Value> {
    vec![
        dataset_record("D", "V", "a", json!({"name": "A", "keywords": ["x"]})),
        file_record("D", "V", "data/raw/s1.csv"),
        dataset_record(
            "D",
            "V",
            "b",
            json!({"name": "B", "keywords": ["y"], "subdatasets": [
                {"dataset_id": "S", "dataset_version": "1", "dataset_path": "data/sub"}
            ]}),
        ),
        file_record("D", "V", "data/raw/s2.csv"),
        file_record("D", "V", "top.txt"),
    ]
}

/// Relative path -> parsed JSON for every file under `root`
fn snapshot(root: &Path) -> BTreeMap<String, Value> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_string_lossy().into_owned();
            let value = serde_json::from_str(&std::fs::read_to_string(e.path()).unwrap()).unwrap();
            (rel, value)
        })
        .collect()
}

#[test]
fn replaying_the_same_records_reproduces_the_store() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    for dir in [&first, &second] {
        let catalog = Catalog::create(dir.path(), None, false).unwrap();
        let report = catalog.add(records(), None);
        assert!(report.is_success());
    }
    let left = snapshot(first.path());
    assert!(!left.is_empty());
    assert_eq!(left, snapshot(second.path()));
}

#[test]
fn applying_a_batch_twice_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let catalog = Catalog::create(temp.path(), None, false).unwrap();
    catalog.add(records(), None);
    let once = snapshot(temp.path());
    catalog.add(records(), None);
    assert_eq!(snapshot(temp.path()), once);
}

#[test]
fn one_batch_equals_one_record_per_batch() {
    let batched = TempDir::new().unwrap();
    let single = TempDir::new().unwrap();
    Catalog::create(batched.path(), None, false)
        .unwrap()
        .add(records(), None);
    let catalog = Catalog::create(single.path(), None, false).unwrap();
    for record in records() {
        catalog.add([record], None);
    }
    assert_eq!(snapshot(batched.path()), snapshot(single.path()));
}
