//! Bibliographic record persisted as `meta.json`.

use serde::{Deserialize, Serialize};

/// Metadata resolved from a candidate ISBN.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// The ISBN string the lookup service matched on.
    pub isbn: String,
    pub title: String,
    pub authors: Vec<String>,
    pub thumbnail_url: String,
}
