/// Analytics for generating statistics and insights
///
/// This module derives daily progress and per-habit statistics from the
/// completion log, and turns them into motivational insight text.

pub mod cache;
pub mod insights;
pub mod stats;

pub use cache::{CachedInsight, InsightCache, CACHE_KEY, CACHE_TTL_HOURS};
pub use insights::{
    build_prompt, prepare_insight_data, rule_based_insights, HabitStreak, InsightData,
    InsightGenerator, WELCOME_MESSAGE,
};
pub use stats::{daily_progress, habit_stats, stats_overview, DailyProgress, HabitStat, StatsOverview};
