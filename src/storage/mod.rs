/// Storage layer for persisting habit data
///
/// This module defines the document-store and key-value interfaces the rest
/// of the crate depends on, with a SQLite implementation for real use and an
/// in-memory one for tests and embedding.

pub mod sqlite;
pub mod migrations;
pub mod memory;

// Re-export the main storage types
pub use sqlite::*;
pub use memory::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use crate::domain::{
    Completion, CompletionId, CompletionQuery, Habit, HabitId, NewCompletion, NewHabit, UserId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Completion not found: {completion_id}")]
    CompletionNotFound { completion_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Document store for habits and completions
///
/// Appends assign the record id. Queries filter on equality only.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// Append a new habit and return it with its assigned id
    async fn insert_habit(&self, habit: NewHabit) -> Result<Habit, StorageError>;

    /// All habits owned by a user, oldest first
    async fn habits_for_user(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError>;

    /// Delete a habit by id
    async fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// Append a new completion and return it with its assigned id
    async fn insert_completion(&self, completion: NewCompletion)
        -> Result<Completion, StorageError>;

    /// Completions matching every filter in the query
    async fn query_completions(
        &self,
        query: &CompletionQuery,
    ) -> Result<Vec<Completion>, StorageError>;

    /// Delete a completion by id
    async fn delete_completion(&self, completion_id: &CompletionId) -> Result<(), StorageError>;
}

/// Local persistent string key-value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// A registered account as stored by the local identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Account storage used by the local identity provider
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; returns `Ok(false)` if the email is already taken
    async fn insert_user(&self, user: &UserRecord) -> Result<bool, StorageError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError>;
}
