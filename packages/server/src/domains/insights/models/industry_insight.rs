use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::kernel::MissingRecord;

/// Days between a refresh and the next scheduled one
pub const UPDATE_INTERVAL_DAYS: i64 = 7;

// ============================================================================
// Enums
// ============================================================================

/// Qualitative hiring demand. Stored upper-cased in the `demand_level` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "demand_level", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "HIGH",
            DemandLevel::Medium => "MEDIUM",
            DemandLevel::Low => "LOW",
        }
    }
}

impl FromStr for DemandLevel {
    type Err = anyhow::Error;

    /// Case-insensitive: "high", "High" and "HIGH" all parse.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Ok(DemandLevel::High),
            "MEDIUM" => Ok(DemandLevel::Medium),
            "LOW" => Ok(DemandLevel::Low),
            other => Err(anyhow!("unknown demand level: {}", other)),
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative market direction. Stored upper-cased in the `market_outlook` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "market_outlook", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketOutlook {
    Positive,
    Neutral,
    Negative,
}

impl MarketOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketOutlook::Positive => "POSITIVE",
            MarketOutlook::Neutral => "NEUTRAL",
            MarketOutlook::Negative => "NEGATIVE",
        }
    }
}

impl FromStr for MarketOutlook {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "POSITIVE" => Ok(MarketOutlook::Positive),
            "NEUTRAL" => Ok(MarketOutlook::Neutral),
            "NEGATIVE" => Ok(MarketOutlook::Negative),
            other => Err(anyhow!("unknown market outlook: {}", other)),
        }
    }
}

impl fmt::Display for MarketOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Generated insight payload
// ============================================================================

/// Salary band for one role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub location: String,
}

/// Normalized insight fields produced for one industry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsights {
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

/// Refresh timestamps written alongside the insight fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStamp {
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl UpdateStamp {
    /// `next_update` is exactly [`UPDATE_INTERVAL_DAYS`] after `last_updated`.
    ///
    /// Truncated to microseconds so the pair survives a Postgres round trip unchanged.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let last_updated = now.trunc_subsecs(6);
        Self {
            last_updated,
            next_update: last_updated + Duration::days(UPDATE_INTERVAL_DAYS),
        }
    }

    pub fn now() -> Self {
        Self::starting_at(Utc::now())
    }
}

// ============================================================================
// Model
// ============================================================================

/// Industry insight model - SQL persistence layer
///
/// Keyed by `industry`. Rows are seeded elsewhere; this service only updates them.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct IndustryInsight {
    pub id: Uuid,
    pub industry: String,

    pub salary_ranges: Json<Vec<SalaryRange>>,
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,

    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl IndustryInsight {
    /// Distinct industry keys, ordered by name
    pub async fn list_industries(pool: &PgPool) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT industry FROM industry_insights ORDER BY industry",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Find insight record by industry key
    pub async fn find_by_industry(industry: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM industry_insights WHERE industry = $1")
            .bind(industry)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Overwrite the insight fields and refresh timestamps for one industry.
    ///
    /// Accepts a pool or a transaction. Fails with [`MissingRecord`] if no row
    /// exists for `industry`.
    pub async fn update_insights<'e, E>(
        industry: &str,
        insights: &IndustryInsights,
        stamp: UpdateStamp,
        executor: E,
    ) -> Result<Self>
    where
        E: PgExecutor<'e>,
    {
        let updated = sqlx::query_as::<_, Self>(
            "UPDATE industry_insights
             SET salary_ranges = $2,
                 growth_rate = $3,
                 demand_level = $4,
                 top_skills = $5,
                 market_outlook = $6,
                 key_trends = $7,
                 recommended_skills = $8,
                 last_updated = $9,
                 next_update = $10
             WHERE industry = $1
             RETURNING *",
        )
        .bind(industry)
        .bind(Json(&insights.salary_ranges))
        .bind(insights.growth_rate)
        .bind(insights.demand_level)
        .bind(&insights.top_skills)
        .bind(insights.market_outlook)
        .bind(&insights.key_trends)
        .bind(&insights.recommended_skills)
        .bind(stamp.last_updated)
        .bind(stamp.next_update)
        .fetch_optional(executor)
        .await?;

        match updated {
            Some(row) => Ok(row),
            None => Err(MissingRecord(industry.to_string()).into()),
        }
    }

    /// Insight fields of this row as a payload
    pub fn insights(&self) -> IndustryInsights {
        IndustryInsights {
            salary_ranges: self.salary_ranges.0.clone(),
            growth_rate: self.growth_rate,
            demand_level: self.demand_level,
            top_skills: self.top_skills.clone(),
            market_outlook: self.market_outlook,
            key_trends: self.key_trends.clone(),
            recommended_skills: self.recommended_skills.clone(),
        }
    }
}
