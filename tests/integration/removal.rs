use crate::support::{dataset_record, file_record, new_catalog};
use metacat::{NodeKind, RemoveOutcome};
use serde_json::json;

#[test]
fn removing_last_version_removes_dataset_directory() {
    let (_temp, catalog) = new_catalog();
    catalog.add(
        [dataset_record("D", "V", "core", json!({"name": "x"})), file_record("D", "V", "a/b.txt")],
        None,
    );

    let outcome = catalog.remove_record("D", "V").unwrap();
    assert_eq!(
        outcome,
        RemoveOutcome::Removed {
            dataset_dir_removed: true
        }
    );
    assert!(catalog
        .get_record("D", "V", NodeKind::Dataset, None)
        .unwrap()
        .is_none());
    assert!(!catalog.metadata_path().join("D").exists());
}

#[test]
fn removing_one_version_keeps_the_others() {
    let (_temp, catalog) = new_catalog();
    catalog.add(
        [
            dataset_record("D", "V1", "core", json!({"name": "one"})),
            dataset_record("D", "V2", "core", json!({"name": "two"})),
        ],
        None,
    );

    let outcome = catalog.remove_record("D", "V1").unwrap();
    assert_eq!(
        outcome,
        RemoveOutcome::Removed {
            dataset_dir_removed: false
        }
    );
    assert!(catalog.metadata_path().join("D").is_dir());
    assert!(catalog
        .get_record("D", "V1", NodeKind::Dataset, None)
        .unwrap()
        .is_none());
    assert!(catalog
        .get_record("D", "V2", NodeKind::Dataset, None)
        .unwrap()
        .is_some());
    assert_eq!(
        catalog.dataset_versions().unwrap(),
        vec![("D".to_string(), "V2".to_string())]
    );
}

#[test]
fn removing_missing_version_signals_not_found() {
    let (_temp, catalog) = new_catalog();
    assert_eq!(catalog.remove_record("D", "V").unwrap(), RemoveOutcome::NotFound);
    assert!(catalog.remove_record("..", "V").is_err());
}
