/// Unit tests exercising the public API of the habit tracker library
mod insight_tests;
mod streak_tests;
