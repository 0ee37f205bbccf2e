use rusqlite::OptionalExtension;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chatpulse_core::error::ChatPulseError;

pub const DATABASE_FILE_NAME: &str = "engagement.db";

const SCHEMA_VERSION_CURRENT: i64 = 1;

/// Process-wide counter store. One long-lived connection, serialized by a mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

/// Run a storage closure on the blocking pool so async handlers suspend
/// instead of stalling the dispatcher.
pub async fn call_blocking<T, F>(db: Arc<Database>, f: F) -> Result<T, ChatPulseError>
where
    T: Send + 'static,
    F: FnOnce(&Database) -> Result<T, ChatPulseError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(db.as_ref()))
        .await
        .map_err(|e| ChatPulseError::TaskJoin(format!("DB task join error: {e}")))?
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementRecord {
    pub chat_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub message_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTotal {
    pub chat_id: i64,
    pub total_messages: i64,
    pub distinct_users: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTotal {
    pub user_name: String,
    pub message_count: i64,
}

impl Database {
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn new(data_dir: &str) -> Result<Self, ChatPulseError> {
        std::fs::create_dir_all(data_dir)?;
        let db_path = Path::new(data_dir).join(DATABASE_FILE_NAME);

        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, ChatPulseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ChatPulseError> {
        let db = Database {
            conn: Mutex::new(conn),
        };
        db.ensure_schema()?;
        Ok(db)
    }

    /// Create the counter table if it is missing. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> Result<(), ChatPulseError> {
        let conn = self.lock_conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS engagement (
                chat_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                user_name TEXT NOT NULL,
                message_count INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (chat_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS db_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        if read_schema_version(&conn)? < SCHEMA_VERSION_CURRENT {
            conn.execute(
                "INSERT INTO db_meta(key, value) VALUES('schema_version', ?1)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![SCHEMA_VERSION_CURRENT.to_string()],
            )?;
        }
        Ok(())
    }

    pub fn schema_version(&self) -> Result<i64, ChatPulseError> {
        let conn = self.lock_conn();
        read_schema_version(&conn)
    }

    /// Add one message to the (chat, user) counter and return the new count.
    /// The first call for a pair stores `user_name`; later calls keep it.
    pub fn increment_count(
        &self,
        chat_id: i64,
        user_id: i64,
        user_name: &str,
    ) -> Result<i64, ChatPulseError> {
        let conn = self.lock_conn();
        let count = conn.query_row(
            "INSERT INTO engagement (chat_id, user_id, user_name, message_count)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(chat_id, user_id)
             DO UPDATE SET message_count = message_count + 1
             RETURNING message_count",
            params![chat_id, user_id, user_name],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Per-chat sums, ordered by chat id.
    pub fn chat_totals(&self) -> Result<Vec<ChatTotal>, ChatPulseError> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT chat_id, SUM(message_count), COUNT(*)
             FROM engagement
             GROUP BY chat_id
             ORDER BY chat_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ChatTotal {
                chat_id: row.get(0)?,
                total_messages: row.get(1)?,
                distinct_users: row.get(2)?,
            })
        })?;
        let mut totals = Vec::new();
        for row in rows {
            totals.push(row?);
        }
        Ok(totals)
    }

    /// Users of one chat by descending count; equal counts keep first-seen order.
    pub fn user_totals(&self, chat_id: i64) -> Result<Vec<UserTotal>, ChatPulseError> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare(
            "SELECT user_name, message_count
             FROM engagement
             WHERE chat_id = ?1
             ORDER BY message_count DESC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![chat_id], |row| {
            Ok(UserTotal {
                user_name: row.get(0)?,
                message_count: row.get(1)?,
            })
        })?;
        let mut totals = Vec::new();
        for row in rows {
            totals.push(row?);
        }
        Ok(totals)
    }

    pub fn get_record(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Option<EngagementRecord>, ChatPulseError> {
        let conn = self.lock_conn();
        let record = conn
            .query_row(
                "SELECT chat_id, user_id, user_name, message_count
                 FROM engagement
                 WHERE chat_id = ?1 AND user_id = ?2",
                params![chat_id, user_id],
                |row| {
                    Ok(EngagementRecord {
                        chat_id: row.get(0)?,
                        user_id: row.get(1)?,
                        user_name: row.get(2)?,
                        message_count: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

fn read_schema_version(conn: &Connection) -> Result<i64, ChatPulseError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM db_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.and_then(|s| s.parse::<i64>().ok()).unwrap_or(0))
}
