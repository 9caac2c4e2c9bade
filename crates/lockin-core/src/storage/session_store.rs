//! SQLite-backed key/value store for the logged-in session.
//!
//! Holds two well-known entries:
//! - `user_id`: the canonical id of the logged-in user
//! - `user`: the user's profile record as JSON

use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::debug;

use super::data_dir;
use crate::error::{Result, StorageError};
use crate::remote::records::{self, RecordKind};

pub const USER_ID_KEY: &str = "user_id";
pub const USER_KEY: &str = "user";

/// Persisted key/value store.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open the store at `~/.config/lockin/session.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("session.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for tests and throwaway hosts).
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    /// Get a value from the store.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value, replacing any previous one.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    // ── Logged-in user ───────────────────────────────────────────────

    /// Remember a freshly logged-in user. The record is normalized so its
    /// `id` field holds the canonical identifier.
    ///
    /// # Errors
    /// Returns a validation error if the record carries no user id.
    pub fn save_login(&self, user: &Value) -> Result<Value> {
        let user = records::normalize(RecordKind::User, user.clone())?;
        let id = records::resolve_id(RecordKind::User, &user)
            .ok_or_else(|| records::missing_identifier(RecordKind::User))?;
        self.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.set(USER_ID_KEY, &id.to_string())?;
        debug!(user_id = %id, "session saved");
        Ok(user)
    }

    pub fn current_user_id(&self) -> Result<Option<String>> {
        self.get(USER_ID_KEY)
    }

    pub fn current_user(&self) -> Result<Option<Value>> {
        match self.get(USER_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Forget the logged-in user.
    pub fn logout(&self) -> Result<()> {
        self.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kv_roundtrip() {
        let store = SessionStore::open_memory().unwrap();
        assert!(store.get("theme").unwrap().is_none());
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));
        store.remove("theme").unwrap();
        assert!(store.get("theme").unwrap().is_none());
    }

    #[test]
    fn login_stores_normalized_user() {
        let store = SessionStore::open_memory().unwrap();
        let saved = store
            .save_login(&json!({ "user_id": 42, "username": "ana" }))
            .unwrap();
        assert_eq!(saved["id"], 42);

        assert_eq!(store.current_user_id().unwrap().as_deref(), Some("42"));
        let user = store.current_user().unwrap().unwrap();
        assert_eq!(user["username"], "ana");
        assert_eq!(user["id"], 42);
    }

    #[test]
    fn login_without_id_is_rejected() {
        let store = SessionStore::open_memory().unwrap();
        assert!(store.save_login(&json!({ "username": "ghost" })).is_err());
        assert!(store.current_user_id().unwrap().is_none());
    }

    #[test]
    fn logout_clears_everything() {
        let store = SessionStore::open_memory().unwrap();
        store.save_login(&json!({ "id": "u-7" })).unwrap();
        store.set("draft", "hello").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["draft", "user", "user_id"]);

        store.logout().unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert!(store.current_user().unwrap().is_none());
    }
}
