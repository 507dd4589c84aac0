/// Streak properties over arbitrary completion lists
use chrono::{Duration, NaiveDate};
use habit_tracker::*;

#[cfg(test)]
mod streak_property_tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date")
    }

    fn completion(days_ago: i64) -> Completion {
        NewCompletion::new(HabitId::from("h1"), UserId::from("u1"), today() - Duration::days(days_ago))
            .into_completion(CompletionId::generate())
    }

    fn run_of(k: i64) -> Vec<Completion> {
        (0..k).map(completion).collect()
    }

    #[test]
    fn test_no_completion_today_is_zero() {
        let lists = vec![
            vec![],
            vec![completion(1)],
            vec![completion(1), completion(2), completion(3)],
            vec![completion(5), completion(1), completion(30)],
        ];

        for list in lists {
            assert_eq!(calculate_streak(&list, today()), 0);
        }
    }

    #[test]
    fn test_consecutive_days_count_k() {
        for k in 1..=40 {
            let mut list = run_of(k);
            assert_eq!(calculate_streak(&list, today()), k as u32, "ascending run of {k}");

            list.reverse();
            assert_eq!(calculate_streak(&list, today()), k as u32, "descending run of {k}");
        }
    }

    #[test]
    fn test_interleaved_order_is_irrelevant() {
        let list: Vec<Completion> = [3, 0, 4, 1, 2].into_iter().map(completion).collect();
        assert_eq!(calculate_streak(&list, today()), 5);
    }

    #[test]
    fn test_duplicate_date_does_not_change_result() {
        for k in 1..=10 {
            let base = run_of(k);
            for dup in 0..k {
                let mut list = base.clone();
                list.push(completion(dup));
                assert_eq!(
                    calculate_streak(&list, today()),
                    calculate_streak(&base, today()),
                    "duplicate of day {dup} in run of {k}"
                );
            }
        }
    }

    #[test]
    fn test_gap_stops_the_streak() {
        let list = vec![completion(0), completion(1), completion(3), completion(4)];
        assert_eq!(calculate_streak(&list, today()), 2);
        assert_eq!(calculate_longest_streak(&list, today()), 2);
    }

    #[test]
    fn test_streak_crosses_month_boundary() {
        // 2024-02-29 back to 2024-01-25
        assert_eq!(calculate_streak(&run_of(36), today()), 36);
    }
}
