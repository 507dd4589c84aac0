/// Public library interface for the habit tracker
///
/// This module wires storage, identity, the habit service and the insight
/// generator together, and exports the types other applications and tests
/// build on.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub mod analytics;
pub mod auth;
pub mod clock;
pub mod config;
pub mod domain;
pub mod llm;
pub mod service;
pub mod storage;

// Re-export public modules and types
pub use analytics::{InsightGenerator, StatsOverview};
pub use auth::{AuthError, AuthProvider, LocalAuth};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::GenerationConfig;
pub use domain::*;
pub use llm::{AnthropicClient, GenerationError, TextGenerator, API_VERSION};
pub use service::{HabitService, ServiceError};
pub use storage::{
    HabitStore, KeyValueStore, MemoryStorage, SqliteStorage, StorageError, UserStore,
};

/// Errors surfaced by the application entry points
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Storage(#[from] StorageError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the directory a database file lives in if it is missing
pub fn ensure_database_dir(db_path: &Path) -> Result<(), AppError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// The assembled application
///
/// Owns one store that backs habits, accounts, the session and the insight
/// cache.
pub struct HabitTracker {
    auth: Arc<LocalAuth>,
    service: HabitService,
    insights: InsightGenerator,
}

impl HabitTracker {
    /// Open the SQLite database at `db_path` and attach the text provider if
    /// one is configured
    pub async fn open(db_path: PathBuf, config: &GenerationConfig) -> Result<Self, AppError> {
        tracing::info!("Opening habit tracker database: {:?}", db_path);
        let storage = Arc::new(SqliteStorage::new(db_path)?);

        let provider: Option<Arc<dyn TextGenerator>> = if config.is_configured() {
            match AnthropicClient::new(config) {
                Ok(client) => {
                    tracing::info!("Text provider enabled, model {}", client.model());
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::warn!("Text provider disabled: {}", e);
                    None
                }
            }
        } else {
            tracing::warn!("No API key configured, insights will be rule-based");
            None
        };

        Self::with_store(storage, Arc::new(SystemClock), provider).await
    }

    /// Assemble the application over any store that implements every
    /// storage interface
    pub async fn with_store<S>(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        provider: Option<Arc<dyn TextGenerator>>,
    ) -> Result<Self, AppError>
    where
        S: HabitStore + KeyValueStore + UserStore + 'static,
    {
        let auth = Arc::new(LocalAuth::restore(store.clone(), store.clone()).await?);
        let service = HabitService::new(auth.clone(), store.clone(), clock.clone());

        let mut insights = InsightGenerator::new(store, clock);
        if let Some(provider) = provider {
            insights = insights.with_provider(provider);
        }

        Ok(Self {
            auth,
            service,
            insights,
        })
    }

    pub fn auth(&self) -> &dyn AuthProvider {
        self.auth.as_ref()
    }

    pub fn service(&self) -> &HabitService {
        &self.service
    }

    /// Insight text for the current user
    ///
    /// Only loading the user's data can fail; generation itself always
    /// produces text.
    pub async fn insights(&self) -> Result<String, AppError> {
        let habits = self.service.habits().await?;
        let completions = self.service.completions().await?;
        Ok(self.insights.generate(&habits, &completions).await)
    }

    /// Forget the cached insight so the next request recomputes it
    pub async fn refresh_insights(&self) -> Result<(), AppError> {
        self.insights.clear_cache().await?;
        Ok(())
    }
}
