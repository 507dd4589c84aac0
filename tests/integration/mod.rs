/// Integration tests covering the assembled application
mod app_flow;
mod insight_provider;
