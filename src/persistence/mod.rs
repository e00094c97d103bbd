//! SQLite persistence for the reconnect flag.
//!
//! A single `walletConnected` boolean survives restarts. It is only a hint
//! used to attempt auto-reconnect on startup, never a source of truth for
//! session validity.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const WALLET_CONNECTED_KEY: &str = "walletConnected";

/// SQLite-backed store for session flags.
pub struct FlagStore {
    conn: Mutex<Connection>,
}

impl FlagStore {
    /// Open (or create) the flag database at the given path.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
        }

        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        info!("Flag store initialized at {:?}", db_path.as_ref());
        Ok(store)
    }

    /// In-memory store for tests and side-effect-free demo runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        self.lock_conn()
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS session_flags (
                    key TEXT PRIMARY KEY,
                    value INTEGER NOT NULL
                );
                "#,
            )
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Whether a previous run recorded a connected wallet. Absent means false.
    pub fn wallet_connected(&self) -> Result<bool> {
        let value: Option<i64> = self
            .lock_conn()
            .query_row(
                "SELECT value FROM session_flags WHERE key = ?1",
                params![WALLET_CONNECTED_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read walletConnected flag")?;

        Ok(value.map(|v| v != 0).unwrap_or(false))
    }

    /// Record whether the wallet is connected.
    pub fn set_wallet_connected(&self, connected: bool) -> Result<()> {
        self.lock_conn()
            .execute(
                "INSERT OR REPLACE INTO session_flags (key, value) VALUES (?1, ?2)",
                params![WALLET_CONNECTED_KEY, connected as i64],
            )
            .context("Failed to write walletConnected flag")?;

        debug!(connected, "walletConnected flag updated");
        Ok(())
    }

    /// Remove the flag entirely (disconnect path). Safe when already absent.
    pub fn clear_wallet_connected(&self) -> Result<()> {
        self.lock_conn()
            .execute(
                "DELETE FROM session_flags WHERE key = ?1",
                params![WALLET_CONNECTED_KEY],
            )
            .context("Failed to clear walletConnected flag")?;

        debug!("walletConnected flag cleared");
        Ok(())
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("flag store lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_absent_reads_false() {
        let store = FlagStore::in_memory().unwrap();
        assert!(!store.wallet_connected().unwrap());
    }

    #[test]
    fn test_flag_roundtrip() {
        let store = FlagStore::in_memory().unwrap();

        store.set_wallet_connected(true).unwrap();
        assert!(store.wallet_connected().unwrap());

        store.set_wallet_connected(false).unwrap();
        assert!(!store.wallet_connected().unwrap());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = FlagStore::in_memory().unwrap();

        store.set_wallet_connected(true).unwrap();
        store.clear_wallet_connected().unwrap();
        store.clear_wallet_connected().unwrap();

        assert!(!store.wallet_connected().unwrap());
    }
}
