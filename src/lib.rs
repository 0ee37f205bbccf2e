pub mod channels;
pub mod chat_commands;
pub mod config;
pub mod handler;
pub mod runtime;
pub mod tracker;
pub mod web;

pub use channels::telegram;
pub use chatpulse_app::logging;
pub use chatpulse_channels::channel;
pub use chatpulse_channels::channel_adapter;
pub use chatpulse_core::error;
pub use chatpulse_core::text;
pub use chatpulse_storage::db;
pub use chatpulse_storage::report;

#[cfg(test)]
pub mod test_support {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

    use crate::db::{Database, DATABASE_FILE_NAME};

    pub fn env_lock() -> MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A file-backed store whose counter table was dropped behind its back,
    /// so every query on it fails.
    pub fn broken_db() -> (Arc<Database>, PathBuf) {
        let dir = std::env::temp_dir().join(format!("chatpulse_broken_{}", uuid::Uuid::new_v4()));
        let db = Database::new(&dir.to_string_lossy()).unwrap();
        let other = rusqlite::Connection::open(dir.join(DATABASE_FILE_NAME)).unwrap();
        other.execute_batch("DROP TABLE engagement;").unwrap();
        drop(other);
        (Arc::new(db), dir)
    }
}
