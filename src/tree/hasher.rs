//! Content addressing for catalog nodes
//!
//! A node's address is derived from its identity alone:
//! `long_name = dataset_id-dataset_version[-path]`, `digest = md5(long_name)`,
//! stored at `{dataset_id}/{dataset_version}/{digest[..3]}/{digest[3..]}.json`
//! relative to the catalog's metadata directory.

use crate::types::{Digest, NodeIdentity};
use md5::{Digest as _, Md5};
use std::path::{Path, PathBuf};

/// Number of leading digest characters used as the shard directory
pub const SHARD_PREFIX_LEN: usize = 3;

/// Digest plus storage path relative to the metadata root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub digest: Digest,
    pub relative_path: PathBuf,
}

impl NodeAddress {
    /// Absolute location of the node file under `metadata_root`
    pub fn location(&self, metadata_root: &Path) -> PathBuf {
        metadata_root.join(&self.relative_path)
    }
}

/// Concatenate dataset id, version and (non-empty) path
pub fn long_name(dataset_id: &str, dataset_version: &str, path: Option<&str>) -> String {
    let mut name = format!("{}-{}", dataset_id, dataset_version);
    if let Some(path) = path.filter(|p| !p.is_empty()) {
        name.push('-');
        name.push_str(path);
    }
    name
}

/// Lowercase hex MD5 of a string
pub fn md5_hex(text: &str) -> Digest {
    hex::encode(Md5::digest(text.as_bytes()))
}

/// Derive the content address for an identity tuple.
pub fn address(dataset_id: &str, dataset_version: &str, path: Option<&str>) -> NodeAddress {
    let digest = md5_hex(&long_name(dataset_id, dataset_version, path));
    let (left, right) = digest.split_at(SHARD_PREFIX_LEN);
    let relative_path = PathBuf::from(dataset_id)
        .join(dataset_version)
        .join(left)
        .join(format!("{}.json", right));
    NodeAddress {
        digest,
        relative_path,
    }
}

/// Address of a node identity
pub fn address_of(identity: &NodeIdentity) -> NodeAddress {
    address(
        &identity.dataset_id,
        &identity.dataset_version,
        identity.path.as_deref(),
    )
}
