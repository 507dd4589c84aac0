/// Insight generation against a mocked text provider
use chrono::{Duration, NaiveDate};
use habit_tracker::analytics::{prepare_insight_data, rule_based_insights};
use habit_tracker::*;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[cfg(test)]
mod insight_provider_tests {
    use super::*;

    struct Fixture {
        app: HabitTracker,
        clock: Arc<FixedClock>,
    }

    async fn setup(server: &MockServer) -> Fixture {
        let config = GenerationConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            ..GenerationConfig::default()
        };
        let client = AnthropicClient::new(&config).expect("Failed to build client");

        let clock = Arc::new(FixedClock::at_date(
            NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date"),
        ));
        let app = HabitTracker::with_store(
            Arc::new(MemoryStorage::new()),
            clock.clone(),
            Some(Arc::new(client)),
        )
        .await
        .expect("Failed to assemble app");

        app.auth().register("ada@example.com", "secret1").await.expect("register");
        Fixture { app, clock }
    }

    fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{"type": "text", "text": text}]
        }))
    }

    #[tokio::test]
    async fn test_rate_limited_provider_falls_back_to_rules() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "type": "error",
                "error": {"type": "rate_limit_error", "message": "Too many requests"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        let habit = fx.app.service().create_habit("Run", "Health").await.expect("create");
        fx.app.service().complete_habit(&habit.id).await.expect("complete");

        let text = fx.app.insights().await.expect("insights");

        let habits = fx.app.service().habits().await.expect("habits");
        let completions = fx.app.service().completions().await.expect("completions");
        let expected = rule_based_insights(&prepare_insight_data(&habits, &completions, fx.clock.today()));
        assert_eq!(text, expected);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(text_response("You are doing great."))
            .expect(1)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        fx.app.service().create_habit("Run", "Health").await.expect("create");

        assert_eq!(fx.app.insights().await.expect("first"), "You are doing great.");
        fx.clock.advance(Duration::hours(1));
        assert_eq!(fx.app.insights().await.expect("second"), "You are doing great.");
    }

    #[tokio::test]
    async fn test_changed_statistics_miss_the_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(text_response("Fresh insight."))
            .expect(2)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        let habit = fx.app.service().create_habit("Run", "Health").await.expect("create");
        fx.app.insights().await.expect("first");

        fx.app.service().complete_habit(&habit.id).await.expect("complete");
        fx.app.insights().await.expect("second");
    }

    #[tokio::test]
    async fn test_entry_older_than_a_day_is_regenerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(text_response("Fresh insight."))
            .expect(2)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        // No completions, so the statistics stay the same across days
        fx.app.service().create_habit("Run", "Health").await.expect("create");
        fx.app.insights().await.expect("first");

        fx.clock.advance(Duration::hours(24) + Duration::minutes(1));
        fx.app.insights().await.expect("second");
    }

    #[tokio::test]
    async fn test_refresh_clears_cached_insight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(text_response("Fresh insight."))
            .expect(2)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        fx.app.service().create_habit("Run", "Health").await.expect("create");
        fx.app.insights().await.expect("first");

        fx.app.refresh_insights().await.expect("refresh");
        fx.app.insights().await.expect("second");
    }

    #[tokio::test]
    async fn test_fallback_text_is_cached_too() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        fx.app.service().create_habit("Run", "Health").await.expect("create");

        let first = fx.app.insights().await.expect("first");
        let second = fx.app.insights().await.expect("second");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_next_user_does_not_see_previous_insight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(text_response("Keep your Running streak alive."))
            .expect(2)
            .mount(&server)
            .await;

        let fx = setup(&server).await;
        fx.app.service().create_habit("Running", "Health").await.expect("create");
        fx.app.insights().await.expect("first user");

        fx.app.auth().sign_out().await.expect("sign out");
        fx.app.auth().register("bob@example.com", "secret2").await.expect("register");
        // Same counts and streaks as the first user
        fx.app.service().create_habit("Piano", "Music").await.expect("create");
        fx.app.insights().await.expect("second user");
    }
}
