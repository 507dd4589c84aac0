/// End-to-end flows over a SQLite database file
use chrono::{Duration, NaiveDate};
use habit_tracker::*;
use std::sync::Arc;
use tempfile::TempDir;

#[cfg(test)]
mod app_flow_tests {
    use super::*;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date")
    }

    async fn open_app(dir: &TempDir, clock: Arc<FixedClock>) -> HabitTracker {
        let storage = Arc::new(
            SqliteStorage::new(dir.path().join("habits.db")).expect("Failed to open database"),
        );
        HabitTracker::with_store(storage, clock, None)
            .await
            .expect("Failed to assemble app")
    }

    #[tokio::test]
    async fn test_track_habits_over_several_days() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let clock = Arc::new(FixedClock::at_date(start_date()));
        let app = open_app(&dir, clock.clone()).await;

        app.auth()
            .register("ada@example.com", "secret1")
            .await
            .expect("Failed to register");

        let run = app.service().create_habit("Morning Run", "Health").await.expect("create");
        let read = app.service().create_habit("Read", "Learning").await.expect("create");

        for _ in 0..4 {
            app.service().complete_habit(&run.id).await.expect("complete");
            clock.advance(Duration::days(1));
        }
        app.service().complete_habit(&run.id).await.expect("complete");
        app.service().complete_habit(&read.id).await.expect("complete");

        let stats = app.service().stats().await.expect("stats");
        assert_eq!(stats.progress.completed_today, 2);
        assert_eq!(stats.progress.percentage, 100);
        assert_eq!(stats.habits[0].current_streak, 5);
        assert_eq!(stats.habits[0].completion_rate, 100);
        assert_eq!(stats.habits[1].current_streak, 1);
        assert_eq!(stats.habits[1].completion_rate, 20);

        let text = app.insights().await.expect("insights");
        assert!(text.contains("completed all your habits today"));
        assert!(text.contains("Morning Run habit is on a 5-day streak"));
    }

    #[tokio::test]
    async fn test_session_and_data_survive_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let clock = Arc::new(FixedClock::at_date(start_date()));

        let habit_id = {
            let app = open_app(&dir, clock.clone()).await;
            app.auth().register("ada@example.com", "secret1").await.expect("register");
            let habit = app.service().create_habit("Stretch", "Health").await.expect("create");
            app.service().complete_habit(&habit.id).await.expect("complete");
            habit.id
        };

        let app = open_app(&dir, clock).await;
        assert!(app.auth().current_user().is_some());
        assert!(app.service().is_completed_today(&habit_id).await.expect("query"));

        app.auth().sign_out().await.expect("sign out");
        let app = HabitTracker::open(dir.path().join("habits.db"), &GenerationConfig::default())
            .await
            .expect("Failed to reopen");
        assert_eq!(app.auth().current_user(), None);
        assert!(matches!(
            app.insights().await,
            Err(AppError::Service(ServiceError::AuthRequired))
        ));
    }

    #[tokio::test]
    async fn test_delete_habit_cascades_in_sqlite() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let clock = Arc::new(FixedClock::at_date(start_date()));
        let app = open_app(&dir, clock.clone()).await;
        app.auth().register("ada@example.com", "secret1").await.expect("register");

        let habit = app.service().create_habit("Meditate", "Mind").await.expect("create");
        app.service().complete_habit(&habit.id).await.expect("complete");
        clock.advance(Duration::days(1));
        app.service().complete_habit(&habit.id).await.expect("complete");
        assert_eq!(app.service().completions().await.expect("list").len(), 2);

        app.service().delete_habit(&habit.id).await.expect("delete");
        assert!(app.service().habits().await.expect("list").is_empty());
        assert!(app.service().completions().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let app = open_app(&dir, Arc::new(FixedClock::at_date(start_date()))).await;

        app.auth().register("ada@example.com", "secret1").await.expect("register");
        app.auth().sign_out().await.expect("sign out");

        assert!(matches!(
            app.auth().sign_in("ada@example.com", "secret2").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(app.auth().sign_in("ada@example.com", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_new_user_gets_welcome_message() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let app = open_app(&dir, Arc::new(FixedClock::at_date(start_date()))).await;
        app.auth().register("ada@example.com", "secret1").await.expect("register");

        let text = app.insights().await.expect("insights");
        assert_eq!(text, habit_tracker::analytics::WELCOME_MESSAGE);
    }

    #[test]
    fn test_database_dir_is_created() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("nested").join("deeper").join("habits.db");

        ensure_database_dir(&db_path).expect("Failed to create directory");
        assert!(dir.path().join("nested").join("deeper").is_dir());
    }

    #[test]
    fn test_database_dir_under_a_file_is_io_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").expect("Failed to write file");

        let result = ensure_database_dir(&blocker.join("sub").join("habits.db"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
