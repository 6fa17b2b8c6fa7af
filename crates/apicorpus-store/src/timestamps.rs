//! Per-document timestamps taken from filesystem metadata.

use std::fs;
use std::time::SystemTime;

use time::OffsetDateTime;

use apicorpus_core::index::{TimestampSource, Timestamps};
use apicorpus_core::CorpusResult;

use crate::fs::Store;

/// Uses the file creation time for `added` when the platform reports one,
/// otherwise the modification time. `updated` is the modification time.
pub struct FsTimestamps<'a> {
    store: &'a Store,
}

impl<'a> FsTimestamps<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl TimestampSource for FsTimestamps<'_> {
    fn timestamps(&self, location: &str) -> CorpusResult<Timestamps> {
        let meta = fs::metadata(self.store.resolve(location)?)?;
        let modified: SystemTime = meta.modified()?;
        let created = meta.created().unwrap_or(modified);
        Ok(Timestamps {
            added: OffsetDateTime::from(created.min(modified)),
            updated: OffsetDateTime::from(modified),
        })
    }
}
