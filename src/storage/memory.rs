/// In-memory implementation of the storage interfaces
///
/// Behaves like the SQLite store but keeps everything in process. It can be
/// switched into an unavailable mode to exercise connectivity failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{
    Completion, CompletionId, CompletionQuery, Habit, HabitId, NewCompletion, NewHabit, UserId,
};
use crate::storage::{HabitStore, KeyValueStore, StorageError, UserRecord, UserStore};

#[derive(Default)]
struct State {
    habits: Vec<Habit>,
    completions: Vec<Completion>,
    users: Vec<UserRecord>,
    values: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("store unavailable".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| StorageError::Connection("state mutex poisoned".to_string()))
    }
}

#[async_trait]
impl HabitStore for MemoryStorage {
    async fn insert_habit(&self, habit: NewHabit) -> Result<Habit, StorageError> {
        let habit = habit.into_habit(HabitId::generate());
        self.state()?.habits.push(habit.clone());
        Ok(habit)
    }

    async fn habits_for_user(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
        Ok(self
            .state()?
            .habits
            .iter()
            .filter(|h| h.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let before = state.habits.len();
        state.habits.retain(|h| h.id != *habit_id);
        if state.habits.len() == before {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }
        Ok(())
    }

    async fn insert_completion(
        &self,
        completion: NewCompletion,
    ) -> Result<Completion, StorageError> {
        let completion = completion.into_completion(CompletionId::generate());
        self.state()?.completions.push(completion.clone());
        Ok(completion)
    }

    async fn query_completions(
        &self,
        query: &CompletionQuery,
    ) -> Result<Vec<Completion>, StorageError> {
        let mut matching: Vec<Completion> = self
            .state()?
            .completions
            .iter()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        // Newest first, ties keep insertion order reversed like the SQLite store
        matching.reverse();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(matching)
    }

    async fn delete_completion(&self, completion_id: &CompletionId) -> Result<(), StorageError> {
        let mut state = self.state()?;
        let before = state.completions.len();
        state.completions.retain(|c| c.id != *completion_id);
        if state.completions.len() == before {
            return Err(StorageError::CompletionNotFound {
                completion_id: completion_id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.state()?.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.state()?.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.state()?.values.remove(key);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn insert_user(&self, user: &UserRecord) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        if state.users.iter().any(|u| u.email == user.email) {
            return Ok(false);
        }
        state.users.push(user.clone());
        Ok(true)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self.state()?.users.iter().find(|u| u.email == email).cloned())
    }
}
