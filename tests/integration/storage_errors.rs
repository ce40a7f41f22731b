use crate::support::{dataset_record, file_record, new_catalog};
use metacat::tree::address;
use metacat::{CatalogError, NodeKind, StorageError};
use serde_json::json;
use std::fs;

#[test]
fn corrupt_node_file_fails_only_its_record() {
    let (_temp, catalog) = new_catalog();
    catalog.add([dataset_record("D", "V", "core", json!({"name": "x"}))], None);
    let location = address("D", "V", None).location(&catalog.metadata_path());
    fs::write(&location, "{\"type\": ").unwrap();

    let report = catalog.add(
        [
            file_record("D", "V", "a.txt"),
            dataset_record("E", "W", "core", json!({"name": "fine"})),
        ],
        None,
    );
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.records[0].result,
        Err(CatalogError::Storage(StorageError::Read { .. }))
    ));
    assert!(report.records[1].is_ok());

    // the corrupt file is left as it was
    assert_eq!(fs::read_to_string(&location).unwrap(), "{\"type\": ");
    assert!(matches!(
        catalog.get_record("D", "V", NodeKind::Dataset, None),
        Err(CatalogError::Storage(StorageError::Read { .. }))
    ));
}

#[test]
fn corrupt_home_pointer_is_a_read_error() {
    let (_temp, catalog) = new_catalog();
    fs::write(catalog.metadata_path().join("super.json"), "[]").unwrap();
    assert!(matches!(
        catalog.get_home(),
        Err(CatalogError::Storage(StorageError::Read { .. }))
    ));
}

#[test]
fn unwritable_node_fails_every_record_that_touched_it() {
    let (_temp, catalog) = new_catalog();
    // a directory where the node file should go
    let location = address("D", "V", None).location(&catalog.metadata_path());
    fs::create_dir_all(&location).unwrap();

    let report = catalog.add(
        [
            dataset_record("D", "V", "core", json!({"name": "x"})),
            dataset_record("E", "W", "core", json!({"name": "fine"})),
            file_record("D", "V", "a.txt"),
        ],
        None,
    );
    assert_eq!(report.failed(), 2);
    assert!(matches!(
        &report.records[0].result,
        Err(CatalogError::NotPersisted { node, .. }) if node.dataset_id == "D"
    ));
    assert!(report.records[1].is_ok());
    assert!(!report.records[2].is_ok());
    assert_eq!(report.nodes_written, 1);
    assert_eq!(report.persist_failures.len(), 1);
    assert!(matches!(
        report.persist_failures[0].error,
        StorageError::Write { .. }
    ));
    assert!(!report.is_success());
}
