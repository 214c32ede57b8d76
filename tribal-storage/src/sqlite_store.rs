//! `SqliteStore` — owns the connection pool and implements `VectorStore`,
//! `Bm25Store`, and `GraphStore` against the same database file, mirroring
//! the single-engine-many-traits shape used elsewhere in this stack.

use std::path::Path;

use rusqlite::Connection;

use tribal_core::errors::StorageError;

use crate::pool::ConnectionPool;
use crate::schema;

pub struct SqliteStore {
    pub(crate) pool: ConnectionPool,
    /// File-backed: reads go through the read pool, never contending with
    /// the writer. In-memory: the read pool is a set of isolated databases
    /// invisible to the writer's changes, so reads route through the
    /// writer instead.
    pub(crate) use_read_pool: bool,
}

impl SqliteStore {
    pub fn open(path: &Path, read_pool_size: usize) -> Result<Self, StorageError> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        let store = Self {
            pool,
            use_read_pool: true,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let pool = ConnectionPool::open_in_memory(1)?;
        let store = Self {
            pool,
            use_read_pool: false,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StorageError> {
        self.pool.writer.with_conn(schema::initialize)
    }

    pub(crate) fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn(f)
        }
    }

    pub(crate) fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.pool.writer.with_conn(f)
    }
}
