use metacat::{Catalog, CatalogRecord, Node, NodeKind};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

pub fn new_catalog() -> (TempDir, Catalog) {
    let temp = TempDir::new().unwrap();
    let catalog = Catalog::create(&temp.path().join("catalog"), None, false).unwrap();
    (temp, catalog)
}

pub fn sources(name: &str) -> Value {
    json!({
        "key_source_map": {},
        "sources": [{
            "source_name": name,
            "source_version": "0.1.0",
            "source_time": 1643901350.0,
            "agent_name": "Test Agent",
            "agent_email": "agent@example.com"
        }]
    })
}

pub fn dataset_record(id: &str, version: &str, source: &str, fields: Value) -> Value {
    let mut record = json!({
        "type": "dataset",
        "dataset_id": id,
        "dataset_version": version,
        "metadata_sources": sources(source)
    });
    for (key, value) in fields.as_object().unwrap() {
        record[key] = value.clone();
    }
    record
}

pub fn file_record(id: &str, version: &str, path: &str) -> Value {
    json!({
        "type": "file",
        "dataset_id": id,
        "dataset_version": version,
        "path": path,
        "contentbytesize": 1024,
        "url": format!("https://example.com/{}", path),
        "metadata_sources": sources("core")
    })
}

pub fn node(catalog: &Catalog, id: &str, version: &str, kind: NodeKind, path: Option<&str>) -> Node {
    match catalog.get_record(id, version, kind, path).unwrap() {
        Some(CatalogRecord::Node(node)) => node,
        other => panic!("expected a node for {} {}@{} {:?}, got {:?}", kind, id, version, path, other),
    }
}

pub fn write_config(dir: &Path, name: &str, value: Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}
