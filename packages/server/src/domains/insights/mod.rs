pub mod activities;
pub mod error;
pub mod models;

// Re-export activities
pub use activities::{
    build_prompt, clean_response, parse_insights, run_insights_refresh, FailurePolicy,
    InsightRefresher, RefreshReport,
};

// Re-export errors
pub use error::InsightsError;

// Re-export models
pub use models::{
    DemandLevel, IndustryInsight, IndustryInsights, MarketOutlook, SalaryRange, UpdateStamp,
};
