/// Habit operations for the signed-in user
///
/// Wraps the document store with the identity provider and a clock. Every
/// operation is scoped to the current user.

use std::sync::Arc;

use thiserror::Error;

use crate::analytics::{stats_overview, StatsOverview};
use crate::auth::AuthProvider;
use crate::clock::Clock;
use crate::domain::{
    Completion, CompletionQuery, DomainError, Habit, HabitId, NewCompletion, NewHabit, UserId,
};
use crate::storage::{HabitStore, StorageError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("You need to be signed in")]
    AuthRequired,

    #[error("Habit not found: {0}")]
    HabitNotFound(HabitId),

    #[error("Habit store unavailable: {0}")]
    StoreUnavailable(#[from] StorageError),

    #[error("Invalid input: {0}")]
    Domain(#[from] DomainError),
}

pub struct HabitService {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn HabitStore>,
    clock: Arc<dyn Clock>,
}

impl HabitService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn HabitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { auth, store, clock }
    }

    fn require_user(&self) -> Result<UserId, ServiceError> {
        self.auth.current_user().ok_or(ServiceError::AuthRequired)
    }

    /// Find one of the current user's habits
    async fn owned_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<Habit, ServiceError> {
        self.store
            .habits_for_user(user_id)
            .await?
            .into_iter()
            .find(|h| h.id == *habit_id)
            .ok_or_else(|| ServiceError::HabitNotFound(habit_id.clone()))
    }

    pub async fn create_habit(&self, name: &str, category: &str) -> Result<Habit, ServiceError> {
        let user_id = self.require_user()?;
        let draft = NewHabit::new(name, category, user_id, self.clock.now())?;
        let habit = self.store.insert_habit(draft).await?;
        tracing::info!("Created habit '{}' ({})", habit.name, habit.id);
        Ok(habit)
    }

    pub async fn habits(&self) -> Result<Vec<Habit>, ServiceError> {
        let user_id = self.require_user()?;
        Ok(self.store.habits_for_user(&user_id).await?)
    }

    /// Delete a habit and every completion recorded for it
    pub async fn delete_habit(&self, habit_id: &HabitId) -> Result<(), ServiceError> {
        let user_id = self.require_user()?;
        self.owned_habit(&user_id, habit_id).await?;

        self.store.delete_habit(habit_id).await?;

        let completions = self
            .store
            .query_completions(&CompletionQuery::for_user(user_id).habit(habit_id.clone()))
            .await?;
        for completion in &completions {
            self.store.delete_completion(&completion.id).await?;
        }

        tracing::info!("Deleted habit {} and {} completions", habit_id, completions.len());
        Ok(())
    }

    /// Mark a habit done for today
    ///
    /// Returns the existing record if the habit was already completed today.
    pub async fn complete_habit(&self, habit_id: &HabitId) -> Result<Completion, ServiceError> {
        let user_id = self.require_user()?;
        self.owned_habit(&user_id, habit_id).await?;

        let today = self.clock.today();
        let query = CompletionQuery::for_user(user_id.clone())
            .habit(habit_id.clone())
            .on(today);
        if let Some(existing) = self.store.query_completions(&query).await?.into_iter().next() {
            tracing::debug!("Habit {} already completed on {}", habit_id, today);
            return Ok(existing);
        }

        let completion = self
            .store
            .insert_completion(NewCompletion::new(habit_id.clone(), user_id, today))
            .await?;
        tracing::info!("Completed habit {} on {}", habit_id, today);
        Ok(completion)
    }

    pub async fn completions(&self) -> Result<Vec<Completion>, ServiceError> {
        let user_id = self.require_user()?;
        Ok(self
            .store
            .query_completions(&CompletionQuery::for_user(user_id))
            .await?)
    }

    /// False when nobody is signed in
    pub async fn is_completed_today(&self, habit_id: &HabitId) -> Result<bool, ServiceError> {
        let Some(user_id) = self.auth.current_user() else {
            return Ok(false);
        };

        let query = CompletionQuery::for_user(user_id)
            .habit(habit_id.clone())
            .on(self.clock.today());
        Ok(!self.store.query_completions(&query).await?.is_empty())
    }

    pub async fn stats(&self) -> Result<StatsOverview, ServiceError> {
        let habits = self.habits().await?;
        let completions = self.completions().await?;
        Ok(stats_overview(&habits, &completions, self.clock.as_ref()))
    }
}
