/// Daily progress and per-habit statistics
///
/// These back the statistics view: how much of today is done, and each
/// habit's current streak, best streak and completion rate.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::clock::Clock;
use crate::domain::{calculate_longest_streak, calculate_streak, Completion, Habit, HabitId};

/// How much of today's habit list has been completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyProgress {
    pub completed_today: usize,
    pub total_habits: usize,
    /// Rounded percentage, 0 when there are no habits
    pub percentage: u32,
}

/// Statistics for a single habit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStat {
    pub habit_id: HabitId,
    pub name: String,
    pub category: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Share of days since creation with a completion, 0-100
    pub completion_rate: u32,
    pub completed_today: bool,
}

/// Everything the statistics view shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsOverview {
    pub progress: DailyProgress,
    pub habits: Vec<HabitStat>,
}

/// Completions belonging to one habit
pub fn completions_for_habit(habit_id: &HabitId, completions: &[Completion]) -> Vec<Completion> {
    completions
        .iter()
        .filter(|c| c.habit_id == *habit_id)
        .cloned()
        .collect()
}

/// Rounded `part / whole` percentage; 0 when `whole` is 0
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Count how many of the given habits have a completion dated `today`
///
/// Each habit counts once no matter how many records it has for the day.
pub fn completed_today_count(habits: &[Habit], completions: &[Completion], today: NaiveDate) -> usize {
    let known: HashSet<&HabitId> = habits.iter().map(|h| &h.id).collect();
    completions
        .iter()
        .filter(|c| c.date == today && known.contains(&c.habit_id))
        .map(|c| &c.habit_id)
        .collect::<HashSet<_>>()
        .len()
}

pub fn daily_progress(habits: &[Habit], completions: &[Completion], today: NaiveDate) -> DailyProgress {
    let completed_today = completed_today_count(habits, completions, today);
    DailyProgress {
        completed_today,
        total_habits: habits.len(),
        percentage: percentage(completed_today, habits.len()),
    }
}

/// Completion rate since the local creation date, inclusive of both ends
fn completion_rate(created: NaiveDate, completions: &[Completion], today: NaiveDate) -> u32 {
    let days = ((today - created).num_days() + 1).max(1);

    let done: BTreeSet<NaiveDate> = completions
        .iter()
        .map(|c| c.date)
        .filter(|d| *d >= created && *d <= today)
        .collect();

    percentage(done.len(), days as usize).min(100)
}

/// Build statistics for each habit, in input order
///
/// Creation instants are converted to local dates with the same clock that
/// supplies `today`, matching how completion dates are recorded.
pub fn habit_stats(habits: &[Habit], completions: &[Completion], clock: &dyn Clock) -> Vec<HabitStat> {
    let today = clock.today();
    habits
        .iter()
        .map(|habit| {
            let own = completions_for_habit(&habit.id, completions);
            let created = clock.local_date(habit.created_at);
            HabitStat {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                category: habit.category.clone(),
                current_streak: calculate_streak(&own, today),
                longest_streak: calculate_longest_streak(&own, today),
                completion_rate: completion_rate(created, &own, today),
                completed_today: own.iter().any(|c| c.date == today),
            }
        })
        .collect()
}

pub fn stats_overview(habits: &[Habit], completions: &[Completion], clock: &dyn Clock) -> StatsOverview {
    StatsOverview {
        progress: daily_progress(habits, completions, clock.today()),
        habits: habit_stats(habits, completions, clock),
    }
}
