/// Insight data, fingerprint and rule-based narrative scenarios
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habit_tracker::analytics::*;
use habit_tracker::*;
use std::sync::Arc;

#[cfg(test)]
mod insight_scenario_tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date")
    }

    fn habit(id: &str, name: &str) -> Habit {
        Habit {
            id: HabitId::from(id),
            name: name.to_string(),
            category: "Health".to_string(),
            user_id: UserId::from("u1"),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        }
    }

    /// Completions for `habit_id` covering the last `days` days including today
    fn run(habit_id: &str, days: i64) -> Vec<Completion> {
        (0..days)
            .map(|d| {
                NewCompletion::new(HabitId::from(habit_id), UserId::from("u1"), today() - Duration::days(d))
                    .into_completion(CompletionId::generate())
            })
            .collect()
    }

    fn five_and_one() -> (Vec<Habit>, Vec<Completion>) {
        let habits = vec![habit("run", "Running"), habit("read", "Reading")];
        let mut completions = run("run", 5);
        completions.extend(run("read", 1));
        (habits, completions)
    }

    #[test]
    fn test_zero_habits_is_welcome_message() {
        let data = prepare_insight_data(&[], &[], today());
        assert_eq!(rule_based_insights(&data), WELCOME_MESSAGE);
    }

    #[test]
    fn test_two_habits_with_streaks_five_and_one() {
        let (habits, completions) = five_and_one();
        let data = prepare_insight_data(&habits, &completions, today());

        assert_eq!(data.percentage(), 100);
        assert_eq!(data.best_streak(), 5);

        let text = rule_based_insights(&data);
        assert!(text.contains("completed all your habits today"));
        assert!(!text.contains("longest streak is"));
        assert!(text.contains("Your Running habit is on a 5-day streak"));
        assert!(text.contains("Reading needs a little extra focus"));
        assert!(!text.contains("juggling"));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let (habits, completions) = five_and_one();
        let a = prepare_insight_data(&habits, &completions, today());
        let b = prepare_insight_data(&habits, &completions, today());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_one_streak() {
        let (habits, mut completions) = five_and_one();
        let before = prepare_insight_data(&habits, &completions, today()).fingerprint();

        completions.extend(run("read", 2));
        let after = prepare_insight_data(&habits, &completions, today()).fingerprint();
        assert_ne!(before, after);
    }

    #[test]
    fn test_strongest_and_weakest_ties_pick_first() {
        let habits = vec![habit("a", "Alpha"), habit("b", "Beta"), habit("c", "Gamma")];
        let mut completions = run("a", 2);
        completions.extend(run("b", 2));
        completions.extend(run("c", 2));

        let data = prepare_insight_data(&habits, &completions, today());
        assert_eq!(data.strongest.map(|s| s.habit_name), Some("Alpha".to_string()));
        assert_eq!(data.weakest.map(|s| s.habit_name), Some("Alpha".to_string()));
    }

    #[tokio::test]
    async fn test_cache_round_trip_and_expiry() {
        let store = Arc::new(MemoryStorage::new());
        let cache = InsightCache::new(store);
        let written = Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap();

        cache.store("keep going", "F", written).await.expect("store");
        assert_eq!(cache.lookup("F", written + Duration::minutes(5)).await.as_deref(), Some("keep going"));
        assert_eq!(cache.lookup("G", written).await, None);

        cache.store("keep going", "F", written).await.expect("store");
        assert_eq!(cache.lookup("F", written + Duration::hours(25)).await, None);

        cache.store("keep going", "F", written).await.expect("store");
        cache.clear().await.expect("clear");
        assert_eq!(cache.lookup("F", written).await, None);
    }

    #[tokio::test]
    async fn test_generator_without_provider_caches_rule_text() {
        let store = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::at_date(today()));
        let generator = InsightGenerator::new(store.clone(), clock);
        let (habits, completions) = five_and_one();

        let text = generator.generate(&habits, &completions).await;
        let expected = rule_based_insights(&prepare_insight_data(&habits, &completions, today()));
        assert_eq!(text, expected);

        let raw = store.get(CACHE_KEY).await.expect("read").expect("cached");
        let entry: CachedInsight = serde_json::from_str(&raw).expect("record");
        assert_eq!(entry.text, expected);
    }

    #[tokio::test]
    async fn test_generator_with_no_habits_skips_cache() {
        let store = Arc::new(MemoryStorage::new());
        let generator = InsightGenerator::new(store.clone(), Arc::new(FixedClock::at_date(today())));

        assert_eq!(generator.generate(&[], &[]).await, WELCOME_MESSAGE);
        assert_eq!(store.get(CACHE_KEY).await.expect("read"), None);
    }
}
