/// Completion records for tracking when a habit was performed
///
/// A completion marks one civil day on which a habit was done. Absence of a
/// record for a date means the habit was not done that day.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::domain::{CompletionId, HabitId, UserId};

/// A record of completing a habit on a specific day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Store-assigned identifier
    pub id: CompletionId,
    /// Which habit this completion is for
    pub habit_id: HabitId,
    /// Owner of the habit
    pub user_id: UserId,
    /// The day the habit was performed
    pub date: NaiveDate,
    /// Always true for stored records
    pub completed: bool,
}

/// A completion that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompletion {
    pub habit_id: HabitId,
    pub user_id: UserId,
    pub date: NaiveDate,
}

impl NewCompletion {
    pub fn new(habit_id: HabitId, user_id: UserId, date: NaiveDate) -> Self {
        Self { habit_id, user_id, date }
    }

    /// Attach the store-assigned id
    pub fn into_completion(self, id: CompletionId) -> Completion {
        Completion {
            id,
            habit_id: self.habit_id,
            user_id: self.user_id,
            date: self.date,
            completed: true,
        }
    }
}

/// Equality filters for querying completions
///
/// Every field left as `None` matches all records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionQuery {
    pub user_id: Option<UserId>,
    pub habit_id: Option<HabitId>,
    pub date: Option<NaiveDate>,
}

impl CompletionQuery {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn for_habit(habit_id: HabitId) -> Self {
        Self {
            habit_id: Some(habit_id),
            ..Self::default()
        }
    }

    pub fn habit(mut self, habit_id: HabitId) -> Self {
        self.habit_id = Some(habit_id);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Check whether a record satisfies every filter
    pub fn matches(&self, completion: &Completion) -> bool {
        self.user_id.as_ref().map_or(true, |u| *u == completion.user_id)
            && self.habit_id.as_ref().map_or(true, |h| *h == completion.habit_id)
            && self.date.map_or(true, |d| d == completion.date)
    }
}
