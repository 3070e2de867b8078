// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into InsightRefresher for tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::{BaseAI, BaseInsightStore, EmptyCompletion, InsightUpdate, MissingRecord};
use crate::domains::insights::models::{IndustryInsights, UpdateStamp};

// =============================================================================
// Mock AI (Generic LLM capabilities)
// =============================================================================

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
    Empty(String),
}

pub struct MockAI {
    responses: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a text response to the queue
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.push(MockReply::Text(response.into()));
        self
    }

    /// Queue a failed model call
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Error(message.into()));
        self
    }

    /// Queue a response that carries no text
    pub fn with_empty_response(self, reason: impl Into<String>) -> Self {
        self.push(MockReply::Empty(reason.into()));
        self
    }

    fn push(&self, reply: MockReply) {
        self.responses.lock().unwrap().push(reply);
    }

    /// Get all prompts that were sent to the AI
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Check if a prompt containing the given text was sent
    pub fn was_called_with(&self, text: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.contains(text))
    }

    /// Get the number of times the AI was called
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn complete(&self, prompt: &str) -> Result<String> {
        // Record the call
        self.calls.lock().unwrap().push(prompt.to_string());

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return default mock response
            return Ok("Mock AI response".to_string());
        }

        match responses.remove(0) {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(message) => bail!("{}", message),
            MockReply::Empty(reason) => Err(EmptyCompletion(reason).into()),
        }
    }
}

// =============================================================================
// Mock Insight Store
// =============================================================================

/// In-memory insight store keyed by industry
pub struct MockInsightStore {
    records: Arc<Mutex<BTreeMap<String, Option<InsightUpdate>>>>,
    write_count: Arc<Mutex<usize>>,
    failures_remaining: Arc<Mutex<u32>>,
}

impl MockInsightStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
            write_count: Arc::new(Mutex::new(0)),
            failures_remaining: Arc::new(Mutex::new(0)),
        }
    }

    /// Seed industry rows (with no insights yet)
    pub fn with_industries(self, industries: &[&str]) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            for industry in industries {
                records.insert(industry.to_string(), None);
            }
        }
        self
    }

    /// Fail the next `count` write calls
    pub fn with_failing_writes(self, count: u32) -> Self {
        *self.failures_remaining.lock().unwrap() = count;
        self
    }

    pub fn write_count(&self) -> usize {
        *self.write_count.lock().unwrap()
    }

    /// Latest stored update for an industry
    pub fn stored(&self, industry: &str) -> Option<InsightUpdate> {
        self.records
            .lock()
            .unwrap()
            .get(industry)
            .cloned()
            .flatten()
    }

    fn take_injected_failure(&self) -> bool {
        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for MockInsightStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseInsightStore for MockInsightStore {
    async fn list_industries(&self) -> Result<Vec<String>> {
        Ok(self.records.lock().unwrap().keys().cloned().collect())
    }

    async fn update_insights(
        &self,
        industry: &str,
        insights: &IndustryInsights,
        stamp: UpdateStamp,
    ) -> Result<()> {
        self.update_many(&[InsightUpdate {
            industry: industry.to_string(),
            insights: insights.clone(),
            stamp,
        }])
        .await
    }

    async fn update_many(&self, updates: &[InsightUpdate]) -> Result<()> {
        if self.take_injected_failure() {
            bail!("connection reset by peer");
        }

        let mut records = self.records.lock().unwrap();
        if let Some(missing) = updates.iter().find(|u| !records.contains_key(&u.industry)) {
            return Err(MissingRecord(missing.industry.clone()).into());
        }

        let mut write_count = self.write_count.lock().unwrap();
        for update in updates {
            records.insert(update.industry.clone(), Some(update.clone()));
            *write_count += 1;
        }

        Ok(())
    }
}
