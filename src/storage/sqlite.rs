/// SQLite implementation of the storage interfaces
///
/// One database file backs the document store (habits, completions), the
/// account table for local auth, and the key-value table used for the
/// insight cache and the persisted session.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, ToSql};

use crate::domain::{
    Completion, CompletionId, CompletionQuery, Habit, HabitId, NewCompletion, NewHabit, UserId,
};
use crate::storage::{migrations, HabitStore, KeyValueStore, StorageError, UserRecord, UserStore};

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so the store can be shared across
/// tasks. The guard is never held across an await point.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring the schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Private in-memory database, mostly for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        migrations::initialize_database(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("connection mutex poisoned".to_string()))
    }

    fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: HabitId(row.get(0)?),
            name: row.get(1)?,
            category: row.get(2)?,
            user_id: UserId(row.get(3)?),
            created_at: row.get(4)?,
        })
    }

    fn row_to_completion(row: &Row<'_>) -> rusqlite::Result<Completion> {
        Ok(Completion {
            id: CompletionId(row.get(0)?),
            habit_id: HabitId(row.get(1)?),
            user_id: UserId(row.get(2)?),
            date: row.get::<_, NaiveDate>(3)?,
            completed: row.get(4)?,
        })
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
        Ok(UserRecord {
            id: UserId(row.get(0)?),
            email: row.get(1)?,
            password_hash: row.get(2)?,
            salt: row.get(3)?,
            created_at: row.get::<_, DateTime<Utc>>(4)?,
        })
    }
}

#[async_trait]
impl HabitStore for SqliteStorage {
    async fn insert_habit(&self, habit: NewHabit) -> Result<Habit, StorageError> {
        let habit = habit.into_habit(HabitId::generate());

        self.conn()?.execute(
            "INSERT INTO habits (id, name, category, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                habit.id.as_str(),
                habit.name,
                habit.category,
                habit.user_id.as_str(),
                habit.created_at
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(habit)
    }

    async fn habits_for_user(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, category, user_id, created_at
             FROM habits WHERE user_id = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let habits = stmt
            .query_map(params![user_id.as_str()], Self::row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    async fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self
            .conn()?
            .execute("DELETE FROM habits WHERE id = ?1", params![habit_id.as_str()])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    async fn insert_completion(
        &self,
        completion: NewCompletion,
    ) -> Result<Completion, StorageError> {
        let completion = completion.into_completion(CompletionId::generate());

        self.conn()?.execute(
            "INSERT INTO completions (id, habit_id, user_id, date, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                completion.id.as_str(),
                completion.habit_id.as_str(),
                completion.user_id.as_str(),
                completion.date,
                completion.completed,
                Utc::now()
            ],
        )?;

        tracing::debug!(
            "Created completion: {} for habit {} on {}",
            completion.id,
            completion.habit_id,
            completion.date
        );
        Ok(completion)
    }

    async fn query_completions(
        &self,
        query: &CompletionQuery,
    ) -> Result<Vec<Completion>, StorageError> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(user_id) = &query.user_id {
            clauses.push("user_id = ?");
            values.push(Box::new(user_id.0.clone()));
        }
        if let Some(habit_id) = &query.habit_id {
            clauses.push("habit_id = ?");
            values.push(Box::new(habit_id.0.clone()));
        }
        if let Some(date) = query.date {
            clauses.push("date = ?");
            values.push(Box::new(date));
        }

        let mut sql = "SELECT id, habit_id, user_id, date, completed FROM completions".to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let completions = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_completion)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(completions)
    }

    async fn delete_completion(&self, completion_id: &CompletionId) -> Result<(), StorageError> {
        let rows_affected = self.conn()?.execute(
            "DELETE FROM completions WHERE id = ?1",
            params![completion_id.as_str()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::CompletionNotFound {
                completion_id: completion_id.to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn()?
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn()?
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn insert_user(&self, user: &UserRecord) -> Result<bool, StorageError> {
        let result = self.conn()?.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.as_str(),
                user.email,
                user.password_hash,
                user.salt,
                user.created_at
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Ok(false)
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let user = self
            .conn()?
            .query_row(
                "SELECT id, email, password_hash, salt, created_at FROM users WHERE email = ?1",
                params![email],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }
}
