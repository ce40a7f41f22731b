use crate::support::{dataset_record, file_record, new_catalog, node};
use metacat::tree::address;
use metacat::{CatalogRecord, NodeKind};
use serde_json::json;

#[test]
fn nested_file_produces_dataset_and_directory_chain() {
    let (_temp, catalog) = new_catalog();
    let report = catalog.add([file_record("D", "V", "a/b/c.txt")], None);
    assert!(report.is_success());
    assert_eq!(report.nodes_written, 3);

    let dataset = node(&catalog, "D", "V", NodeKind::Dataset, None);
    assert_eq!(dataset.children.len(), 1);
    assert_eq!(dataset.children[0].kind, NodeKind::Directory);
    assert_eq!(dataset.children[0].name, "a");

    let a = node(&catalog, "D", "V", NodeKind::Directory, Some("a"));
    assert_eq!(a.children.len(), 1);
    assert_eq!(a.children[0].name, "b");
    assert_eq!(a.children[0].extra["path"], json!("a/b"));

    let ab = node(&catalog, "D", "V", NodeKind::Directory, Some("a/b"));
    assert_eq!(ab.children.len(), 1);
    assert_eq!(ab.children[0].kind, NodeKind::File);
    assert_eq!(ab.children[0].name, "c.txt");

    // no directory node for the file itself
    assert!(catalog
        .get_record("D", "V", NodeKind::Directory, Some("a/b/c.txt"))
        .unwrap()
        .is_none());
}

#[test]
fn node_files_live_at_their_content_address() {
    let (_temp, catalog) = new_catalog();
    catalog.add([file_record("D", "V", "a/b/c.txt")], None);

    let metadata = catalog.metadata_path();
    for path in [None, Some("a"), Some("a/b")] {
        let addr = address("D", "V", path);
        let location = addr.location(&metadata);
        assert!(location.is_file(), "missing node file for {:?}", path);
        assert!(location.starts_with(metadata.join("D").join("V").join(&addr.digest[..3])));
    }

    let stored: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(address("D", "V", Some("a/b")).location(&metadata)).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["type"], json!("directory"));
    assert_eq!(stored["name"], json!("b"));
    assert_eq!(stored["path"], json!("a/b"));
    assert!(stored.get("config").is_none());
}

#[test]
fn file_records_are_returned_from_their_parent() {
    let (_temp, catalog) = new_catalog();
    catalog.add(
        [file_record("D", "V", "README.md"), file_record("D", "V", "code/main.py")],
        None,
    );

    let top = catalog
        .get_record("D", "V", NodeKind::File, Some("README.md"))
        .unwrap();
    match top {
        Some(CatalogRecord::File(child)) => {
            assert_eq!(child.name, "README.md");
            assert_eq!(child.extra["contentbytesize"], json!(1024));
        }
        other => panic!("unexpected {:?}", other),
    }

    let nested = catalog
        .get_record("D", "V", NodeKind::File, Some("/code/main.py"))
        .unwrap();
    assert!(matches!(nested, Some(CatalogRecord::File(ref c)) if c.name == "main.py"));

    assert!(catalog
        .get_record("D", "V", NodeKind::File, Some("code/other.py"))
        .unwrap()
        .is_none());
    assert!(catalog.get_record("D", "V", NodeKind::File, None).is_err());
}

#[test]
fn records_across_batches_accumulate_children() {
    let (_temp, catalog) = new_catalog();
    catalog.add([file_record("D", "V", "a/one.txt")], None);
    catalog.add([file_record("D", "V", "a/two.txt")], None);

    let a = node(&catalog, "D", "V", NodeKind::Directory, Some("a"));
    let names: Vec<_> = a.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["one.txt", "two.txt"]);
}

#[test]
fn subdatasets_are_linked_through_directories() {
    let (_temp, catalog) = new_catalog();
    let report = catalog.add(
        [dataset_record(
            "D",
            "V",
            "core",
            json!({
                "name": "Parent",
                "subdatasets": [
                    {"dataset_id": "S1", "dataset_version": "v1", "dataset_path": "child"},
                    {"dataset_id": "S2", "dataset_version": "v2", "dataset_path": "derivatives/fmriprep"}
                ]
            }),
        )],
        None,
    );
    assert!(report.is_success());

    let dataset = node(&catalog, "D", "V", NodeKind::Dataset, None);
    assert_eq!(dataset.attributes["name"], json!("Parent"));
    let child = dataset
        .children
        .iter()
        .find(|c| c.kind == NodeKind::Dataset)
        .unwrap();
    assert_eq!(child.name, "child");
    assert_eq!(child.extra["dataset_id"], json!("S1"));

    let derivatives = node(&catalog, "D", "V", NodeKind::Directory, Some("derivatives"));
    assert_eq!(derivatives.children[0].kind, NodeKind::Dataset);
    assert_eq!(derivatives.children[0].name, "fmriprep");
    assert_eq!(derivatives.children[0].extra["dataset_version"], json!("v2"));

    // subdatasets themselves are not created
    assert!(catalog
        .get_record("S2", "v2", NodeKind::Dataset, None)
        .unwrap()
        .is_none());
}

#[test]
fn datasets_sharing_a_long_name_are_stored_separately() {
    let (_temp, catalog) = new_catalog();
    // both long names are "a-b-c"
    let report = catalog.add(
        [
            dataset_record("a-b", "c", "core", json!({"name": "first"})),
            dataset_record("a", "b-c", "core", json!({"name": "second"})),
        ],
        None,
    );
    assert!(report.is_success());
    assert_eq!(report.nodes_written, 2);

    let first = node(&catalog, "a-b", "c", NodeKind::Dataset, None);
    assert_eq!(first.attributes["name"], json!("first"));
    let second = node(&catalog, "a", "b-c", NodeKind::Dataset, None);
    assert_eq!(second.attributes["name"], json!("second"));
}

#[test]
fn parent_segments_in_file_paths_are_rejected() {
    let (_temp, catalog) = new_catalog();
    let report = catalog.add(
        [file_record("D", "V", "../x/f.txt"), file_record("D", "V", "x/f.txt")],
        None,
    );
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.records[0].result,
        Err(metacat::CatalogError::Record(metacat::RecordError::InvalidField { field: "path", .. }))
    ));
    assert!(catalog
        .get_record("D", "V", NodeKind::Directory, Some(".."))
        .unwrap()
        .is_none());
    assert!(catalog
        .get_record("D", "V", NodeKind::Directory, Some("x"))
        .unwrap()
        .is_some());
}
