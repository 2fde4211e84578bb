/*!
 * Shared SQLite handle.
 *
 * All statements run on tokio's blocking pool behind one mutex, so the
 * extraction jobs and pollers never block the runtime and never see a
 * half-written transaction.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};

use super::schema;

const IN_MEMORY: &str = ":memory:";

/// Cloneable handle to one SQLite connection
#[derive(Clone)]
pub struct DatabaseConnection {
    path: PathBuf,
    inner: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open `subvocab/subvocab.db` under the user's data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the database file, creating parent directories
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening database at: {:?}", path);
        let conn = Connection::open(&path).with_context(|| format!("Failed to open database: {:?}", path))?;
        Self::from_connection(conn, path)
    }

    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::from_connection(conn, PathBuf::from(IN_MEMORY))
    }

    fn from_connection(conn: Connection, path: PathBuf) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            path,
            inner: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join("subvocab").join("subvocab.db"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }

    /// Run `f` with the connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let conn = inner.lock();
            f(&conn)
        })
            .await
            .context("Database task panicked")?
    }

    /// Run `f` inside a transaction; an `Err` from `f` rolls everything back
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = inner.lock();
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            Ok(value)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Row counts per table and the size of the database file
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            tokio::fs::metadata(&self.path).await.map(|m| m.len()).unwrap_or(0)
        };

        self.execute_async(move |conn| {
            let count = |table: &str| -> Result<i64> {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?)
            };

            Ok(DatabaseStats {
                file_count: count("subtitle_files")?,
                vocabulary_count: count("vocabulary")?,
                cache_count: count("dictionary_cache")?,
                quiz_attempt_count: count("quiz_attempts")?,
                file_size_bytes,
            })
        })
        .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub file_count: i64,
    pub vocabulary_count: i64,
    /// Cached dictionary meanings
    pub cache_count: i64,
    pub quiz_attempt_count: i64,
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Files: {}, Vocabulary: {}, Cached meanings: {}, Quiz attempts: {}, Size: {} KB",
            self.file_count,
            self.vocabulary_count,
            self.cache_count,
            self.quiz_attempt_count,
            self.file_size_bytes / 1024
        )
    }
}
