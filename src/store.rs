use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::internal_error::InternalResult;

pub type DBConnection = Arc<Mutex<Connection>>;

pub const OBJECTIVES_KEY: &str = "study-objectives";
pub const WEEKLY_TASKS_KEY: &str = "weekly-tasks";
pub const DAILY_TASKS_KEY: &str = "daily-tasks";
pub const SESSIONS_KEY: &str = "pomodoro-sessions";
pub const COLOR_OUTPUT_KEY: &str = "color-output";

/// Keyed text-blob storage. One serialized collection per key.
pub trait StorageBackend {
    fn read(&self, key: &str) -> InternalResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> InternalResult<()>;
    fn remove(&mut self, key: &str) -> InternalResult<()>;
}

pub struct SqliteBackend {
    connection: DBConnection,
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<Path>) -> InternalResult<SqliteBackend> {
        let connection = Connection::open(path)?;
        SqliteBackend::with_connection(Arc::new(Mutex::new(connection)))
    }

    pub fn with_connection(connection: DBConnection) -> InternalResult<SqliteBackend> {
        connection.lock()?.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT)",
            params![],
        )?;

        Ok(SqliteBackend { connection })
    }
}

impl StorageBackend for SqliteBackend {
    fn read(&self, key: &str) -> InternalResult<Option<String>> {
        let connection = self.connection.lock()?;
        let mut statement = connection.prepare("SELECT value FROM kv WHERE key = (?1)")?;
        let mut rows = statement.query(params![key])?;

        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> InternalResult<()> {
        self.connection.lock()?.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> InternalResult<()> {
        self.connection
            .lock()?
            .execute("DELETE FROM kv WHERE key = (?1)", params![key])?;

        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> InternalResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> InternalResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> InternalResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

type ChangeListener = Box<dyn Fn(&str)>;

/// Typed access over a backend. Reads fall back to a caller-supplied
/// default when the stored value is absent or unreadable; writes
/// serialize to JSON and notify subscribers with the changed key.
pub struct Store {
    backend: Box<dyn StorageBackend>,
    listeners: Vec<ChangeListener>,
}

impl Store {
    pub fn new(backend: Box<dyn StorageBackend>) -> Store {
        Store {
            backend,
            listeners: vec![],
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let text = match self.backend.read(key) {
            Ok(Some(text)) => text,
            Ok(None) => return default,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value, using default");
                return default;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored value unreadable, using default");
                default
            }
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> InternalResult<()> {
        let text = serde_json::to_string(value)?;
        self.backend.write(key, &text)?;

        for listener in self.listeners.iter() {
            listener(key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn memory_store() -> Store {
        Store::new(Box::new(MemoryBackend::default()))
    }

    #[test]
    fn missing_key_falls_back_to_default() {
        let store = memory_store();
        let value: Vec<String> = store.get("nothing-here", vec!["fallback".to_string()]);

        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let mut backend = MemoryBackend::default();
        backend.write("weekly-tasks", "{not json").unwrap();
        let store = Store::new(Box::new(backend));

        let value: Vec<u32> = store.get("weekly-tasks", vec![7]);

        assert_eq!(value, vec![7]);
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut store = memory_store();
        store.set("numbers", &vec![1u32, 2, 3]).unwrap();

        let value: Vec<u32> = store.get("numbers", vec![]);

        assert_eq!(value, vec![1, 2, 3]);
    }

    #[test]
    fn subscribers_see_every_write() {
        let mut store = memory_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |key| sink.borrow_mut().push(key.to_string()));

        store.set("a", &1u32).unwrap();
        store.set("b", &2u32).unwrap();

        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn sqlite_backend_persists_across_instances() {
        let connection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));

        let mut first = SqliteBackend::with_connection(connection.clone()).unwrap();
        first.write("study-objectives", "[\"x\"]").unwrap();
        first.write("study-objectives", "[\"y\"]").unwrap();

        let second = SqliteBackend::with_connection(connection).unwrap();
        assert_eq!(
            second.read("study-objectives").unwrap(),
            Some("[\"y\"]".to_string())
        );
        assert_eq!(second.read("weekly-tasks").unwrap(), None);
    }

    #[test]
    fn sqlite_backend_remove_deletes_key() {
        let connection = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        let mut backend = SqliteBackend::with_connection(connection).unwrap();

        backend.write("color-output", "true").unwrap();
        backend.remove("color-output").unwrap();

        assert_eq!(backend.read("color-output").unwrap(), None);
    }
}
