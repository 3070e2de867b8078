//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by the insights
//! refresh. All external services use trait abstractions to enable testing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::Config;
use crate::domains::insights::models::{IndustryInsight, IndustryInsights, UpdateStamp};
use crate::domains::insights::InsightRefresher;
use crate::kernel::{ai::GeminiAI, BaseAI, BaseInsightStore, InsightUpdate};

// =============================================================================
// Postgres Insight Store (implements BaseInsightStore trait)
// =============================================================================

/// Wrapper around the connection pool that implements BaseInsightStore trait
#[derive(Clone)]
pub struct PgInsightStore(pub PgPool);

impl PgInsightStore {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }
}

#[async_trait]
impl BaseInsightStore for PgInsightStore {
    async fn list_industries(&self) -> Result<Vec<String>> {
        IndustryInsight::list_industries(&self.0)
            .await
            .context("Failed to list industries")
    }

    async fn update_insights(
        &self,
        industry: &str,
        insights: &IndustryInsights,
        stamp: UpdateStamp,
    ) -> Result<()> {
        IndustryInsight::update_insights(industry, insights, stamp, &self.0)
            .await
            .with_context(|| format!("Failed to update {} insights", industry))?;
        Ok(())
    }

    async fn update_many(&self, updates: &[InsightUpdate]) -> Result<()> {
        let mut tx = self
            .0
            .begin()
            .await
            .context("Failed to begin insights transaction")?;

        for update in updates {
            IndustryInsight::update_insights(
                &update.industry,
                &update.insights,
                update.stamp,
                &mut *tx,
            )
            .await
            .with_context(|| format!("Failed to update {} insights", update.industry))?;
        }

        tx.commit()
            .await
            .context("Failed to commit insights transaction")?;

        tracing::debug!(count = updates.len(), "Committed insights batch");
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// AI client for insight generation
    pub ai: Arc<dyn BaseAI>,
    pub insight_store: Arc<dyn BaseInsightStore>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        ai: Arc<dyn BaseAI>,
        insight_store: Arc<dyn BaseInsightStore>,
    ) -> Self {
        Self {
            db_pool,
            ai,
            insight_store,
        }
    }

    /// Production wiring: Gemini for the model, Postgres for storage
    pub fn from_config(config: &Config, db_pool: PgPool) -> Self {
        let ai = GeminiAI::from_config(
            &config.gemini_api_key,
            &config.gemini_model,
            config.gemini_base_url.as_deref(),
        );

        Self::new(
            db_pool.clone(),
            Arc::new(ai),
            Arc::new(PgInsightStore::new(db_pool)),
        )
    }

    /// Refresher over these dependencies with the configured policies
    pub fn insight_refresher(&self, config: &Config) -> InsightRefresher {
        InsightRefresher::new(self.ai.clone(), self.insight_store.clone())
            .with_failure_policy(config.failure_policy)
            .with_retry_policy(config.retry_policy)
    }
}
