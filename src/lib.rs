//! Metacat: multi-source metadata catalog
//!
//! Ingests canonical metadata records for datasets, directories and files,
//! merges records from different sources field by field under configurable
//! policies, and stores the result as content-addressed JSON nodes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod provenance;
pub mod store;
pub mod tree;
pub mod types;

pub use catalog::{Catalog, CatalogRecord, HomePointer, RemoveOutcome, SetHomeOutcome};
pub use config::{CatalogConfig, ConfigSource, ResolvedConfig, Settings, SettingsLoader};
pub use error::{CatalogError, RecordError, StorageError};
pub use ingest::{BatchReport, CanonicalRecord, RecordOutcome};
pub use tree::{ChildRef, Node, NodeAddress};
pub use types::{NodeIdentity, NodeKind};
