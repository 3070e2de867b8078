//! Insights domain activities - entry-point business logic
//!
//! Called from the scheduler. Activities take injected clients and return
//! final models/results.

pub mod parse;
pub mod prompt;
pub mod refresh;

pub use parse::{clean_response, normalize, parse_insights, RawInsights};
pub use prompt::build_prompt;
pub use refresh::{
    run_insights_refresh, FailurePolicy, IndustryFailure, InsightRefresher, RefreshReport,
    REFRESH_FAILED,
};
