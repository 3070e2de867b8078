//! Turn raw model text into normalized [`IndustryInsights`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::domains::insights::error::{InsightsError, Result};
use crate::domains::insights::models::{
    DemandLevel, IndustryInsights, MarketOutlook, SalaryRange,
};

lazy_static! {
    // Opening or closing markdown fence, with optional `json` tag and trailing newline
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:json)?\n?").unwrap();
}

/// Insights exactly as the model returned them, before enum normalization
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInsights {
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: f64,
    #[serde(default)]
    pub demand_level: Option<Value>,
    pub top_skills: Vec<String>,
    #[serde(default)]
    pub market_outlook: Option<Value>,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

/// Strip every markdown code fence from the response and trim whitespace.
pub fn clean_response(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Clean, parse and normalize a model response.
pub fn parse_insights(text: &str) -> Result<IndustryInsights> {
    let cleaned = clean_response(text);
    let raw: RawInsights = serde_json::from_str(&cleaned)?;
    normalize(raw)
}

/// Upper-case `demandLevel` and `marketOutlook` into their schema enums.
pub fn normalize(raw: RawInsights) -> Result<IndustryInsights> {
    let demand_level: DemandLevel = parse_enum_field("demandLevel", raw.demand_level)?;
    let market_outlook: MarketOutlook = parse_enum_field("marketOutlook", raw.market_outlook)?;

    Ok(IndustryInsights {
        salary_ranges: raw.salary_ranges,
        growth_rate: raw.growth_rate,
        demand_level,
        top_skills: raw.top_skills,
        market_outlook,
        key_trends: raw.key_trends,
        recommended_skills: raw.recommended_skills,
    })
}

fn parse_enum_field<T>(field: &'static str, value: Option<Value>) -> Result<T>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    let normalization = |reason: String| InsightsError::Normalization { field, reason };

    match value {
        None | Some(Value::Null) => Err(normalization("missing".to_string())),
        Some(Value::String(text)) => text
            .parse()
            .map_err(|e: anyhow::Error| normalization(e.to_string())),
        Some(other) => Err(normalization(format!("expected a string, got {}", other))),
    }
}
