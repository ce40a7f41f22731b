//! Record ingestion
//!
//! Canonical records are parsed, decomposed into nodes through one shared
//! batch cache, and flushed once at the end of the batch.

pub mod cache;
pub mod decomposer;
pub mod record;

pub use cache::{NodeCache, PersistFailure};
pub use decomposer::Decomposer;
pub use record::{CanonicalRecord, RecordKind, SubdatasetRef};

use crate::error::CatalogError;
use crate::store::NodeStore;
use crate::types::NodeIdentity;
use serde_json::Value;
use std::borrow::Borrow;
use std::path::Path;
use tracing::{info, warn};

/// Result for one input record
#[derive(Debug)]
pub struct RecordOutcome {
    /// Position in the input batch
    pub index: usize,
    pub result: Result<(), CatalogError>,
}

impl RecordOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<RecordOutcome>,
    pub nodes_written: usize,
    pub persist_failures: Vec<PersistFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }

    /// Every record decomposed and every node written
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.persist_failures.is_empty()
    }
}

/// Decompose and persist a batch of records.
///
/// A record that cannot be parsed or loaded is reported and skipped; the rest
/// of the batch carries on. A record whose nodes fail to write at flush time
/// is reported as failed with [`CatalogError::NotPersisted`].
pub fn ingest_batch<S, I>(store: &S, records: I, dataset_config: Option<&Path>) -> BatchReport
where
    S: NodeStore + ?Sized,
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    let mut decomposer = Decomposer::new(store, dataset_config);
    let mut report = BatchReport::default();
    let mut touched: Vec<Vec<NodeIdentity>> = Vec::new();

    for (index, value) in records.into_iter().enumerate() {
        let result = CanonicalRecord::from_value(value.borrow())
            .map_err(CatalogError::from)
            .and_then(|record| decomposer.process(&record));
        let result = match result {
            Ok(identities) => {
                touched.push(identities);
                Ok(())
            }
            Err(e) => {
                warn!(index, error = %e, "Skipping metadata record");
                touched.push(Vec::new());
                Err(e)
            }
        };
        report.records.push(RecordOutcome { index, result });
    }

    let (written, failures) = decomposer.finish();
    for failure in &failures {
        warn!(node = %failure.identity, error = %failure.error, "Failed to persist node");
    }
    for (outcome, identities) in report.records.iter_mut().zip(&touched) {
        if outcome.result.is_err() {
            continue;
        }
        if let Some(failure) = failures.iter().find(|f| identities.contains(&f.identity)) {
            outcome.result = Err(CatalogError::NotPersisted {
                node: failure.identity.clone(),
                message: failure.error.to_string(),
            });
        }
    }
    report.nodes_written = written;
    report.persist_failures = failures;
    info!(
        records = report.records.len(),
        failed = report.failed(),
        nodes_written = report.nodes_written,
        "Processed metadata batch"
    );
    report
}
