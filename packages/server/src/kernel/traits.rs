// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (prompting for insights, normalizing them) lives in domains/insights.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseInsightStore)

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domains::insights::models::{IndustryInsights, UpdateStamp};

// =============================================================================
// AI Trait (Infrastructure - Generic LLM capabilities)
// =============================================================================

/// The model answered, but with no usable text (no candidate, no parts, blocked prompt).
///
/// Implementations of [`BaseAI`] return this inside the `anyhow::Error` so callers
/// can tell a malformed answer apart from a failed request.
#[derive(Debug, Error)]
#[error("model returned no text: {0}")]
pub struct EmptyCompletion(pub String);

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Complete a prompt with an LLM (returns raw text response)
    async fn complete(&self, prompt: &str) -> Result<String>;
}

// =============================================================================
// Insight Store Trait (Infrastructure - persistence of industry insights)
// =============================================================================

/// No storage record exists for the industry being written.
///
/// Returned inside the `anyhow::Error` by [`BaseInsightStore`] writes. Retrying
/// cannot fix it.
#[derive(Debug, Error)]
#[error("No industry insight record for '{0}'")]
pub struct MissingRecord(pub String);

/// One pending write: industry key, its new insights, and the refresh timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct InsightUpdate {
    pub industry: String,
    pub insights: IndustryInsights,
    pub stamp: UpdateStamp,
}

#[async_trait]
pub trait BaseInsightStore: Send + Sync {
    /// Distinct industry keys present in storage
    async fn list_industries(&self) -> Result<Vec<String>>;

    /// Overwrite one industry's insight fields and timestamps.
    /// Fails with [`MissingRecord`] if no record exists for the industry.
    async fn update_insights(
        &self,
        industry: &str,
        insights: &IndustryInsights,
        stamp: UpdateStamp,
    ) -> Result<()>;

    /// Apply every update or none of them
    async fn update_many(&self, updates: &[InsightUpdate]) -> Result<()>;
}
