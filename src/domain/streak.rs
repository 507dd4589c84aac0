/// Streak calculation from completion history
///
/// A streak is the number of consecutive calendar days, walking backward
/// from today, on which a habit has at least one completion. Several records
/// on the same day count once.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use crate::domain::Completion;

/// Calculate the current streak ending at `today`
///
/// Dates are reduced to a distinct set and walked most recent first. Each
/// date must sit exactly `streak` days before today to extend the run, so a
/// habit that has not been completed today has a streak of 0 even if it was
/// completed yesterday. Records dated after `today` are ignored.
pub fn calculate_streak(completions: &[Completion], today: NaiveDate) -> u32 {
    if completions.is_empty() {
        return 0;
    }

    let dates: BTreeSet<NaiveDate> = completions
        .iter()
        .map(|c| c.date)
        .filter(|d| *d <= today)
        .collect();

    let mut streak = 0;
    for date in dates.iter().rev() {
        let elapsed = (today - *date).num_days();
        if elapsed == i64::from(streak) {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

/// Calculate the longest run of consecutive days up to and including `today`
pub fn calculate_longest_streak(completions: &[Completion], today: NaiveDate) -> u32 {
    let dates: BTreeSet<NaiveDate> = completions
        .iter()
        .map(|c| c.date)
        .filter(|d| *d <= today)
        .collect();

    let mut longest = 0;
    let mut current = 0;
    let mut last_date: Option<NaiveDate> = None;

    for date in dates {
        current = match last_date {
            Some(last) if (date - last).num_days() == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        last_date = Some(date);
    }

    longest
}
