/// Habit entity and related functionality
///
/// A habit is created once and never edited; the only mutation is deletion.
/// Validation happens on the `NewHabit` draft before it reaches the store.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, HabitId, UserId};

const MAX_NAME_LEN: usize = 100;
const MAX_CATEGORY_LEN: usize = 50;

/// A habit the user wants to perform every day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Store-assigned identifier
    pub id: HabitId,
    /// Display name (e.g., "Morning Run")
    pub name: String,
    /// Free-form category label (e.g., "Health")
    pub category: String,
    /// Owner of this habit
    pub user_id: UserId,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

/// A validated habit that has not been stored yet
///
/// The store assigns the id when the draft is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHabit {
    pub name: String,
    pub category: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl NewHabit {
    /// Create a new habit draft with validation
    ///
    /// Name and category are trimmed before being checked and stored.
    pub fn new(
        name: &str,
        category: &str,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        let category = category.trim();

        Self::validate_name(name)?;
        Self::validate_category(category)?;

        Ok(Self {
            name: name.to_string(),
            category: category.to_string(),
            user_id,
            created_at,
        })
    }

    /// Attach the store-assigned id
    pub fn into_habit(self, id: HabitId) -> Habit {
        Habit {
            id,
            name: self.name,
            category: self.category,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name cannot be longer than {} characters",
                MAX_NAME_LEN
            )));
        }

        Ok(())
    }

    fn validate_category(category: &str) -> Result<(), DomainError> {
        if category.is_empty() {
            return Err(DomainError::InvalidCategory(
                "Category cannot be empty".to_string()
            ));
        }

        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(DomainError::InvalidCategory(format!(
                "Category cannot be longer than {} characters",
                MAX_CATEGORY_LEN
            )));
        }

        Ok(())
    }
}
