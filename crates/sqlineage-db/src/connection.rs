//! Connection cache keyed by database path

use crate::error::DbResult;
use rusqlite::Connection;
use sqlineage_core::DatabaseConfig;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Opens each database once and hands out the cached connection
///
/// Access is serialized through a single mutex; there is no pooling.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    connections: Mutex<HashMap<PathBuf, Connection>>,
    config: DatabaseConfig,
}

impl ConnectionManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Connection>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the connection for `path`, opening it on first use
    pub fn with_connection<T>(
        &self,
        path: impl AsRef<Path>,
        f: impl FnOnce(&mut Connection) -> DbResult<T>,
    ) -> DbResult<T> {
        let path = path.as_ref();
        let mut connections = self.lock();

        let conn = match connections.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.open(path)?),
        };

        f(conn)
    }

    fn open(&self, path: &Path) -> DbResult<Connection> {
        if self.config.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;

        tracing::info!(path = %path.display(), "opened database");
        Ok(conn)
    }

    /// Close and forget the connection for `path`
    ///
    /// Returns whether a connection was open.
    pub fn close(&self, path: impl AsRef<Path>) -> bool {
        let removed = self.lock().remove(path.as_ref());
        if removed.is_some() {
            tracing::debug!(path = %path.as_ref().display(), "closed database");
        }
        removed.is_some()
    }

    /// Close every cached connection
    pub fn close_all(&self) {
        let mut connections = self.lock();
        tracing::debug!(count = connections.len(), "closing all databases");
        connections.clear();
    }

    /// Paths with an open connection
    pub fn open_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}
