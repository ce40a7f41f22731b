use crate::support::{dataset_record, file_record, new_catalog, node, write_config};
use metacat::{Catalog, CatalogConfig, ConfigSource, NodeKind, Settings};
use serde_json::json;
use tempfile::TempDir;

fn name_from(source: &str) -> serde_json::Value {
    json!({"property_sources": {"dataset": {"name": {"rule": "single", "source": source}}}})
}

#[test]
fn explicit_dataset_config_is_persisted_and_then_wins() {
    let (temp, catalog) = new_catalog();
    let first = write_config(temp.path(), "first.json", name_from("trusted"));
    let second = temp.path().join("second.yaml");
    std::fs::write(
        &second,
        "property_sources:\n  dataset:\n    name:\n      rule: single\n      source: other\n",
    )
    .unwrap();

    catalog.add(
        [dataset_record("D", "V", "trusted", json!({"name": "Trusted"}))],
        Some(&first),
    );
    let persisted = catalog.metadata_path().join("D").join("V").join("config.json");
    assert!(persisted.is_file());

    // the persisted config keeps ruling even when another one is supplied
    catalog.add(
        [dataset_record("D", "V", "other", json!({"name": "Other"}))],
        Some(&second),
    );
    let dataset = node(&catalog, "D", "V", NodeKind::Dataset, None);
    assert_eq!(dataset.attributes["name"], json!("Trusted"));

    let resolved = catalog.dataset_config("D", "V").unwrap().unwrap();
    assert_eq!(resolved.source, ConfigSource::Dataset);
    assert_eq!(resolved.config, CatalogConfig::load(&persisted).unwrap());
}

#[test]
fn catalog_default_config_is_not_copied_per_dataset() {
    let (_temp, catalog) = new_catalog();
    catalog.add(
        [dataset_record("D", "V", "core", json!({"name": "x"})), file_record("D", "V", "f.txt")],
        None,
    );
    assert!(!catalog
        .metadata_path()
        .join("D")
        .join("V")
        .join("config.json")
        .exists());

    let resolved = catalog.dataset_config("D", "V").unwrap().unwrap();
    assert_eq!(resolved.source, ConfigSource::Catalog);
    assert_eq!(resolved.config.catalog_name.as_deref(), Some("DataCat"));
    assert!(catalog.dataset_config("missing", "V").unwrap().is_none());
}

#[test]
fn create_keeps_existing_config_unless_forced() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("catalog");
    let custom = write_config(temp.path(), "custom.json", json!({"catalog_name": "Custom"}));

    let catalog = Catalog::create(&root, Some(&custom), false).unwrap();
    assert_eq!(catalog.config().catalog_name.as_deref(), Some("Custom"));

    let reopened = Catalog::create(&root, None, false).unwrap();
    assert_eq!(reopened.config().catalog_name.as_deref(), Some("Custom"));

    let forced = Catalog::create(&root, None, true).unwrap();
    assert_eq!(forced.config().catalog_name.as_deref(), Some("DataCat"));

    let opened = Catalog::open(&root).unwrap();
    assert_eq!(opened.config(), forced.config());
}

#[test]
fn open_requires_an_existing_catalog() {
    let temp = TempDir::new().unwrap();
    assert!(Catalog::open(&temp.path().join("nowhere")).is_err());
}

#[test]
fn from_settings_creates_then_opens() {
    let temp = TempDir::new().unwrap();
    let custom = write_config(temp.path(), "custom.json", json!({"catalog_name": "FromSettings"}));
    let mut settings = Settings::default();
    assert!(Catalog::from_settings(&settings).is_err());

    settings.catalog.root = Some(temp.path().join("catalog"));
    settings.catalog.default_config = Some(custom);
    let created = Catalog::from_settings(&settings).unwrap();
    assert_eq!(created.config().catalog_name.as_deref(), Some("FromSettings"));
    assert!(created.metadata_path().is_dir());

    let opened = Catalog::from_settings(&settings).unwrap();
    assert_eq!(opened.config(), created.config());
}
