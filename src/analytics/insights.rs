/// Motivational insight generation
///
/// Insights are derived from today's progress and each habit's streak. The
/// text either comes from the external text generator or, when that is not
/// configured or fails, from a fixed set of rules. Results are cached in a
/// single slot keyed by a fingerprint of the statistics.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::analytics::cache::InsightCache;
use crate::analytics::stats::{completed_today_count, completions_for_habit, percentage};
use crate::clock::Clock;
use crate::domain::{calculate_streak, Completion, Habit};
use crate::llm::TextGenerator;
use crate::storage::{KeyValueStore, StorageError};

/// Shown when the user has no habits yet
pub const WELCOME_MESSAGE: &str = "🌱 Welcome! Start by creating your first habit. \
Pick something simple you can do every day. Small steps lead to big changes!";

/// A habit's display name with its current streak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitStreak {
    pub habit_name: String,
    pub streak: u32,
}

/// Statistics an insight is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightData {
    pub today: NaiveDate,
    pub total_habits: usize,
    pub completed_today: usize,
    /// One entry per habit, in input order
    pub streaks: Vec<HabitStreak>,
    /// Highest streak, first habit wins ties
    pub strongest: Option<HabitStreak>,
    /// Lowest streak, first habit wins ties
    pub weakest: Option<HabitStreak>,
}

impl InsightData {
    pub fn percentage(&self) -> u32 {
        percentage(self.completed_today, self.total_habits)
    }

    pub fn best_streak(&self) -> u32 {
        self.streaks.iter().map(|s| s.streak).max().unwrap_or(0)
    }

    /// Deterministic digest of habit count, today's count and the ordered
    /// streak list
    ///
    /// Keys are serialized in sorted order, so equal inputs always produce
    /// the same string.
    pub fn fingerprint(&self) -> String {
        let streaks = self
            .streaks
            .iter()
            .map(|s| s.streak.to_string())
            .collect::<Vec<_>>()
            .join(",");

        serde_json::json!({
            "habitCount": self.total_habits,
            "completedToday": self.completed_today,
            "streaks": streaks,
        })
        .to_string()
    }
}

/// Shape the statistics for insight generation
pub fn prepare_insight_data(
    habits: &[Habit],
    completions: &[Completion],
    today: NaiveDate,
) -> InsightData {
    let streaks: Vec<HabitStreak> = habits
        .iter()
        .map(|habit| HabitStreak {
            habit_name: habit.name.clone(),
            streak: calculate_streak(&completions_for_habit(&habit.id, completions), today),
        })
        .collect();

    // First habit wins ties at both ends
    let strongest = streaks
        .iter()
        .fold(None::<&HabitStreak>, |best, s| match best {
            Some(b) if b.streak >= s.streak => Some(b),
            _ => Some(s),
        })
        .cloned();
    let weakest = streaks
        .iter()
        .fold(None::<&HabitStreak>, |worst, s| match worst {
            Some(w) if w.streak <= s.streak => Some(w),
            _ => Some(s),
        })
        .cloned();

    InsightData {
        today,
        total_habits: habits.len(),
        completed_today: completed_today_count(habits, completions, today),
        streaks,
        strongest,
        weakest,
    }
}

/// Deterministic fallback narrative
///
/// Emits at most one line per category: today's progress, best streak,
/// a tip for the weakest habit, and encouragement for tracking several.
pub fn rule_based_insights(data: &InsightData) -> String {
    if data.total_habits == 0 {
        return WELCOME_MESSAGE.to_string();
    }

    let percentage = data.percentage();
    let best_streak = data.best_streak();
    let strongest = data.strongest.as_ref().map_or("", |s| s.habit_name.as_str());

    let mut lines = Vec::new();

    let progress = match percentage {
        100..=u32::MAX => "🎉 Fantastic! You've completed all your habits today!".to_string(),
        75..=99 => format!("✨ Great job! {}% completed today.", percentage),
        50..=74 => format!(
            "💪 You're halfway there! {} of {} habits completed.",
            data.completed_today, data.total_habits
        ),
        1..=49 => format!(
            "🌟 You've started the day! {} habits completed, keep going!",
            data.completed_today
        ),
        0 => "⏰ No habits completed yet today. Take the first step now!".to_string(),
    };
    lines.push(progress);

    if best_streak >= 7 {
        lines.push(format!(
            "🔥 Impressive! Your longest streak is {} days for {}.",
            best_streak, strongest
        ));
    } else if best_streak >= 3 {
        lines.push(format!(
            "📈 Your {} habit is on a {}-day streak. Almost a week!",
            strongest, best_streak
        ));
    }

    if let Some(weakest) = &data.weakest {
        if weakest.streak == 0 {
            lines.push(format!(
                "💡 Tip: Start with {} today to build momentum!",
                weakest.habit_name
            ));
        } else if weakest.streak < 3 {
            lines.push(format!(
                "🎯 {} needs a little extra focus. Small steps every day!",
                weakest.habit_name
            ));
        }
    }

    if data.streaks.len() >= 3 {
        lines.push("🌈 You're juggling several habits, and that takes discipline. Keep it up!".to_string());
    }

    lines.join("\n\n")
}

/// Prompt sent to the text generator
pub fn build_prompt(data: &InsightData) -> String {
    let streak_lines = data
        .streaks
        .iter()
        .map(|s| format!("- {}: {} days in a row", s.habit_name, s.streak))
        .collect::<Vec<_>>()
        .join("\n");
    let strongest = data.strongest.as_ref().map_or("None", |s| s.habit_name.as_str());
    let weakest = data.weakest.as_ref().map_or("None", |s| s.habit_name.as_str());

    format!(
        r#"You are a motivating coach who helps people build better habits. Analyze the data below and give personal, encouraging insights.

DATA:
- Number of habits: {total}
- Completed today: {done} of {total}
- Strongest habit: {strongest}
- Weakest habit: {weakest}

STREAKS:
{streak_lines}

Give 3-4 short, specific insights and tips:
1. Encouragement about what is going well
2. A concrete tip for improvement
3. A motivating call to action

Be friendly and personal. Keep it short (max 150 words)."#,
        total = data.total_habits,
        done = data.completed_today,
    )
}

/// Produces insight text, consulting the cache first
///
/// Generation never fails: every error ends in the rule-based narrative.
pub struct InsightGenerator {
    cache: InsightCache,
    provider: Option<Arc<dyn TextGenerator>>,
    clock: Arc<dyn Clock>,
}

impl InsightGenerator {
    /// Rule-based only until a provider is attached
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: InsightCache::new(store),
            provider: None,
            clock,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn TextGenerator>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate(&self, habits: &[Habit], completions: &[Completion]) -> String {
        let data = prepare_insight_data(habits, completions, self.clock.today());

        if data.total_habits == 0 {
            return WELCOME_MESSAGE.to_string();
        }

        let fingerprint = data.fingerprint();
        tracing::debug!(
            total_habits = data.total_habits,
            completed_today = data.completed_today,
            has_provider = self.has_provider(),
            "Generating insights"
        );

        if let Some(cached) = self.cache.lookup(&fingerprint, self.clock.now()).await {
            tracing::debug!("Using cached insight");
            return cached;
        }

        let text = match &self.provider {
            Some(provider) => match provider.generate(&build_prompt(&data)).await {
                Ok(text) => {
                    tracing::info!("Insight generated, {} chars", text.len());
                    text
                }
                Err(e) => {
                    match e.hint() {
                        Some(hint) => tracing::warn!("Insight generation failed ({}): {}", hint, e),
                        None => tracing::warn!("Insight generation failed: {}", e),
                    }
                    rule_based_insights(&data)
                }
            },
            None => {
                tracing::debug!("No text provider configured, using rule-based insights");
                rule_based_insights(&data)
            }
        };

        if let Err(e) = self.cache.store(&text, &fingerprint, self.clock.now()).await {
            tracing::warn!("Failed to cache insight: {}", e);
        }

        text
    }

    /// Drop the cached insight so the next call recomputes
    pub async fn clear_cache(&self) -> Result<(), StorageError> {
        self.cache.clear().await?;
        tracing::debug!("Insight cache cleared");
        Ok(())
    }
}
