use crate::core::storage::{SlotStore, StorageError};
use libsql::{Builder, Connection};
use tokio::runtime::Runtime;

// ═══════════════════════════════════════════════════════════════
// Database: async key/value slots over libsql (SQLite or Turso).
// ═══════════════════════════════════════════════════════════════

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Connect to a local SQLite file (async).
    pub async fn local(path: &str) -> Result<Self, StorageError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self { conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Connect to a remote Turso database (async).
    pub async fn turso(url: &str, token: &str) -> Result<Self, StorageError> {
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let storage = Self { conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS kv_slots (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn load_slot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM kv_slots WHERE key = ?1",
                libsql::params![key.to_string()],
            )
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        match rows
            .next()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?
        {
            Some(row) => {
                let value = row
                    .get::<String>(0)
                    .map_err(|e| StorageError::Database(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn save_slot(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO kv_slots (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                libsql::params![key.to_string(), value.to_string()],
            )
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
// SqlSlot: sync wrapper for the cart store.  Owns a tokio Runtime,
// so it must be built and dropped outside any async context.
// ═══════════════════════════════════════════════════════════════

pub struct SqlSlot {
    db: Database,
    rt: Runtime,
}

impl SqlSlot {
    pub fn local(path: &str) -> Result<Self, StorageError> {
        let rt = Runtime::new().map_err(|e| StorageError::Database(e.to_string()))?;
        let db = rt.block_on(Database::local(path))?;
        Ok(Self { db, rt })
    }

    pub fn turso(url: &str, token: &str) -> Result<Self, StorageError> {
        let rt = Runtime::new().map_err(|e| StorageError::Database(e.to_string()))?;
        let db = rt.block_on(Database::turso(url, token))?;
        Ok(Self { db, rt })
    }
}

impl SlotStore for SqlSlot {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.rt.block_on(self.db.load_slot(key))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.rt.block_on(self.db.save_slot(key, value))
    }
}
