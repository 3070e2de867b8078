//! Test fixtures for creating test data.
//!
//! Industry rows are normally seeded outside this service, so tests insert
//! them directly with column defaults for the insight fields.

use anyhow::Result;
use insights_core::domains::insights::models::IndustryInsight;
use sqlx::PgPool;

/// Insert an industry row with default (empty) insights
pub async fn seed_industry(pool: &PgPool, industry: &str) -> Result<IndustryInsight> {
    let row = sqlx::query_as::<_, IndustryInsight>(
        "INSERT INTO industry_insights (industry) VALUES ($1) RETURNING *",
    )
    .bind(industry)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Model response for an industry, optionally wrapped in markdown fences
pub fn model_response(demand_level: &str, market_outlook: &str, fenced: bool) -> String {
    let json = format!(
        r#"{{
  "salaryRanges": [
    {{"role": "Software Engineer", "min": 90000, "max": 160000, "median": 120000, "location": "US"}},
    {{"role": "Senior Software Engineer", "min": 130000, "max": 210000, "median": 165000, "location": "US"}},
    {{"role": "Data Engineer", "min": 95000, "max": 170000, "median": 128000, "location": "US"}},
    {{"role": "Site Reliability Engineer", "min": 110000, "max": 185000, "median": 142000, "location": "US"}},
    {{"role": "Engineering Manager", "min": 150000, "max": 250000, "median": 190000, "location": "US"}}
  ],
  "growthRate": 8.5,
  "demandLevel": "{}",
  "topSkills": ["Rust", "Cloud", "Distributed Systems", "SQL", "Security"],
  "marketOutlook": "{}",
  "keyTrends": ["AI tooling", "Platform engineering", "Remote work", "Memory safety", "Observability"],
  "recommendedSkills": ["Rust", "Kubernetes", "LLM integration", "Postgres", "Testing"]
}}"#,
        demand_level, market_outlook
    );

    if fenced {
        format!("```json\n{}\n```", json)
    } else {
        json
    }
}
