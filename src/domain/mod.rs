/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, Completion) and the pure
/// streak calculation that everything else derives statistics from.

pub mod habit;
pub mod completion;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use completion::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}
