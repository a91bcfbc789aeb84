// Key-value persistence backends for the collection store

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// String-valued key-value store. No transactions, no TTL.
pub trait Provider {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    entries: HashMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Provider for MemoryProvider {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// One JSON file per key
// ============================================================================

/// Stores each key as `<dir>/<key>.json`
pub struct FileProvider {
    base_path: PathBuf,
}

impl FileProvider {
    /// Open or create a provider rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)
            .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
        debug!(path = %base_path.display(), "FileProvider::open");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl Provider for FileProvider {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));
        let lock_path = self.base_path.join(format!("{}.lock", key));

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context("Failed to open lock file")?;

        // Acquire exclusive lock before writing
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut file = fs::File::create(&tmp_path)
            .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        // Lock is released when `lock` is dropped
        Ok(())
    }
}

// ============================================================================
// SQLite
// ============================================================================

/// Stores keys as rows of a single `kv` table
pub struct SqliteProvider {
    db: Connection,
}

impl SqliteProvider {
    /// Open or create `<dir>/dashstore.db`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref();
        fs::create_dir_all(base_path).context("Failed to create data directory")?;

        let db_path = base_path.join("dashstore.db");
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;
        Self::with_connection(db)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::with_connection(db)
    }

    fn with_connection(db: Connection) -> Result<Self> {
        debug!("Creating database schema");
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { db })
    }

    pub fn db(&self) -> &Connection {
        &self.db
    }
}

impl Provider for SqliteProvider {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}
