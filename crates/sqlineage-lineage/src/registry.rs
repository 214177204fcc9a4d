//! Lineage registry: declared provenance keyed by `table.field`

use sqlineage_core::{lineage_key, LineageRecord};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory store of lineage declarations
///
/// Re-declaring a key replaces the previous record wholesale. Records are
/// never edited in place and only leave the registry through [`clear`].
///
/// [`clear`]: LineageRegistry::clear
#[derive(Debug, Clone, Default)]
pub struct LineageRegistry {
    records: HashMap<String, LineageRecord>,
}

impl LineageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing any previous record for the same target
    ///
    /// Returns the replaced record.
    pub fn declare(&mut self, record: LineageRecord) -> Option<LineageRecord> {
        let key = record.key();
        tracing::debug!(key = %key, sources = record.source_tables.len(), "declaring lineage");
        self.records.insert(key, record)
    }

    /// Exact-match lookup
    pub fn lookup(&self, table: &str, field: &str) -> Option<&LineageRecord> {
        self.records.get(&lineage_key(table, field))
    }

    /// Snapshot of every record, sorted by key
    pub fn list_all(&self) -> BTreeMap<String, LineageRecord> {
        self.records
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect()
    }

    /// Remove every record
    pub fn clear(&mut self) {
        tracing::debug!(removed = self.records.len(), "clearing lineage registry");
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Cloneable, thread-safe handle to a [`LineageRegistry`]
///
/// Declarations and clears take the write lock; lookups and analysis take
/// the read lock. A poisoned lock is recovered, since every registry
/// operation leaves the map consistent.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<LineageRegistry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing registry
    pub fn from_registry(registry: LineageRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LineageRegistry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LineageRegistry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn declare(&self, record: LineageRecord) -> Option<LineageRecord> {
        self.write().declare(record)
    }

    /// Lookup returning an owned copy of the record
    pub fn lookup(&self, table: &str, field: &str) -> Option<LineageRecord> {
        self.read().lookup(table, field).cloned()
    }

    pub fn list_all(&self) -> BTreeMap<String, LineageRecord> {
        self.read().list_all()
    }

    /// Clear the registry, returning how many records were removed
    pub fn clear(&self) -> usize {
        let mut registry = self.write();
        let removed = registry.len();
        registry.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Run a closure against the registry under the read lock
    pub fn with_registry<R>(&self, f: impl FnOnce(&LineageRegistry) -> R) -> R {
        f(&self.read())
    }
}
