//! Weekly industry insight refresh.
//!
//! For every industry in storage: prompt the model, clean and parse its JSON,
//! normalize the enum fields, and overwrite the industry's record with fresh
//! timestamps.
//!
//! ```text
//! run_insights_refresh()
//!     └─► list_industries()
//!             └─► For each industry → build_prompt → BaseAI::complete → parse_insights
//!                     └─► BaseInsightStore::update_many (AbortBatch)
//!                         or update_insights per industry (ContinueOnError)
//! ```

use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::{build_prompt, parse_insights};
use crate::domains::insights::error::{InsightsError, Result};
use crate::domains::insights::models::{IndustryInsights, UpdateStamp};
use crate::kernel::{
    with_retry, with_retry_if, BaseAI, BaseInsightStore, EmptyCompletion, InsightUpdate,
    RetryPolicy,
};

/// Generic failure surfaced to the scheduler when a run does not fully succeed
pub const REFRESH_FAILED: &str = "Failed to generate or update industry insights";

/// What a failing industry does to the rest of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; nothing is written unless every industry succeeds
    #[default]
    AbortBatch,
    /// Record the failure, keep going, and write every industry that succeeded
    ContinueOnError,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "abort_batch" => Ok(FailurePolicy::AbortBatch),
            "continue" | "continue_on_error" => Ok(FailurePolicy::ContinueOnError),
            other => Err(anyhow!("unknown failure policy: {}", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::AbortBatch => f.write_str("abort"),
            FailurePolicy::ContinueOnError => f.write_str("continue"),
        }
    }
}

/// An industry that could not be refreshed
#[derive(Debug)]
pub struct IndustryFailure {
    pub industry: String,
    pub error: InsightsError,
}

/// Outcome of one refresh run
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub updated: Vec<String>,
    pub failed: Vec<IndustryFailure>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.updated.len() + self.failed.len()
    }
}

/// Refreshes industry insights with explicitly injected model and storage clients
#[derive(Clone)]
pub struct InsightRefresher {
    ai: Arc<dyn BaseAI>,
    store: Arc<dyn BaseInsightStore>,
    failure_policy: FailurePolicy,
    retry_policy: RetryPolicy,
}

impl InsightRefresher {
    pub fn new(ai: Arc<dyn BaseAI>, store: Arc<dyn BaseInsightStore>) -> Self {
        Self {
            ai,
            store,
            failure_policy: FailurePolicy::default(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Ask the model for one industry's insights and normalize them.
    ///
    /// Only the model call is retried; a response that fails to parse is not.
    pub async fn generate_insights(&self, industry: &str) -> Result<IndustryInsights> {
        let prompt = build_prompt(industry);
        let ai = &self.ai;
        let prompt = prompt.as_str();
        let started = Instant::now();

        let text = with_retry_if(
            &self.retry_policy,
            "model call",
            move || async move { ai.complete(prompt).await.map_err(model_error) },
            InsightsError::is_transient,
        )
        .await?;

        debug!(
            industry = %industry,
            duration_ms = started.elapsed().as_millis() as u64,
            response_len = text.len(),
            "Model responded"
        );

        parse_insights(&text)
    }

    /// Generate and persist one industry's insights.
    pub async fn refresh_industry(&self, industry: &str) -> Result<IndustryInsights> {
        let insights = self.generate_insights(industry).await?;
        let stamp = UpdateStamp::now();
        let store = &self.store;
        let payload = &insights;

        with_retry_if(
            &self.retry_policy,
            "storage write",
            move || async move {
                store
                    .update_insights(industry, payload, stamp)
                    .await
                    .map_err(InsightsError::storage)
            },
            InsightsError::is_transient,
        )
        .await?;

        info!(
            industry = %industry,
            demand_level = %insights.demand_level,
            market_outlook = %insights.market_outlook,
            next_update = %stamp.next_update,
            "Industry insights updated"
        );

        Ok(insights)
    }

    /// Refresh every industry in storage according to the failure policy.
    ///
    /// Under [`FailurePolicy::AbortBatch`] the first error is returned and no
    /// record is written. Under [`FailurePolicy::ContinueOnError`] errors are
    /// collected in the report.
    pub async fn refresh_all(&self) -> Result<RefreshReport> {
        info!(policy = %self.failure_policy, "Running industry insights refresh");

        let store = &self.store;
        let industries = with_retry(&self.retry_policy, "list industries", move || async move {
            store.list_industries().await.map_err(InsightsError::storage)
        })
        .await?;

        if industries.is_empty() {
            info!("No industries to refresh");
            return Ok(RefreshReport::default());
        }

        info!("Found {} industries to refresh", industries.len());

        let report = match self.failure_policy {
            FailurePolicy::AbortBatch => self.refresh_batch(industries).await?,
            FailurePolicy::ContinueOnError => self.refresh_each(industries).await,
        };

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Industry insights refresh complete"
        );

        Ok(report)
    }

    async fn refresh_batch(&self, industries: Vec<String>) -> Result<RefreshReport> {
        let total = industries.len();
        let mut generated = Vec::with_capacity(total);

        for (idx, industry) in industries.into_iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, total),
                industry = %industry,
                "Generating industry insights"
            );

            let insights = self.generate_insights(&industry).await.map_err(|e| {
                warn!(industry = %industry, error = %e, "Aborting insights batch");
                e
            })?;
            generated.push((industry, insights));
        }

        let stamp = UpdateStamp::now();
        let updates: Vec<InsightUpdate> = generated
            .into_iter()
            .map(|(industry, insights)| InsightUpdate {
                industry,
                insights,
                stamp,
            })
            .collect();
        let store = &self.store;
        let batch = updates.as_slice();

        with_retry_if(
            &self.retry_policy,
            "storage batch write",
            move || async move { store.update_many(batch).await.map_err(InsightsError::storage) },
            InsightsError::is_transient,
        )
        .await?;

        Ok(RefreshReport {
            updated: updates.into_iter().map(|u| u.industry).collect(),
            failed: Vec::new(),
        })
    }

    async fn refresh_each(&self, industries: Vec<String>) -> RefreshReport {
        let total = industries.len();
        let mut report = RefreshReport::default();

        for (idx, industry) in industries.into_iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, total),
                industry = %industry,
                "Refreshing industry insights"
            );

            match self.refresh_industry(&industry).await {
                Ok(_) => report.updated.push(industry),
                Err(e) => {
                    warn!(industry = %industry, error = %e, "Industry insights refresh failed, continuing");
                    report.failed.push(IndustryFailure { industry, error: e });
                }
            }
        }

        report
    }
}

fn model_error(err: anyhow::Error) -> InsightsError {
    match err.downcast_ref::<EmptyCompletion>() {
        Some(EmptyCompletion(reason)) => InsightsError::ResponseShape(reason.clone()),
        None => InsightsError::ModelCall(format!("{:#}", err)),
    }
}

/// Scheduled entry point: run a refresh and collapse any failure into one error.
///
/// This is the only place a failed run is logged at error level, once, with its
/// full cause chain. The returned error reads [`REFRESH_FAILED`].
pub async fn run_insights_refresh(refresher: &InsightRefresher) -> anyhow::Result<RefreshReport> {
    let err = match refresher.refresh_all().await {
        Ok(report) if report.is_success() => return Ok(report),
        Ok(report) => {
            let failures: Vec<String> = report
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.industry, f.error))
                .collect();
            anyhow!(
                "{} of {} industries failed ({})",
                report.failed.len(),
                report.total(),
                failures.join("; ")
            )
        }
        Err(e) => anyhow::Error::new(e),
    }
    .context(REFRESH_FAILED);

    error!("{:#}", err);
    Err(err)
}
