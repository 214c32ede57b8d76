//! Single write connection behind a blocking mutex. Writes are serialized;
//! there is never write contention to resolve.

use std::path::Path;

use rusqlite::Connection;
use std::sync::Mutex;

use tribal_core::errors::StorageError;

use super::pragmas::apply_pragmas;
use crate::sqlite_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(sqlite_err)?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        apply_pragmas(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and run a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| StorageError::Sqlite {
                message: format!("write connection lock poisoned: {e}"),
            })?;
        f(&guard)
    }
}
